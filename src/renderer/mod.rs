//! WebGPU rendering module
//!
//! The scene is flat-colored triangles built on the CPU each frame.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderError, RenderState, Viewport};
