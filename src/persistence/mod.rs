//! Level-unlock persistence
//!
//! Progress lives in a small REST service that stores one record per level.
//! The game talks to it fire-and-forget: a failed call is logged and the
//! menu falls back to a conservative view, but the game loop never waits.

pub mod api;

pub use api::{ApiClient, ApiError, ApiRequest, Method};
