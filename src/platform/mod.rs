//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard codes to game actions)
//! - Storage (LocalStorage on web, no-op natively)

pub mod input;
pub mod storage;
