//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const PLAYER: [f32; 4] = [0.9, 0.1, 0.1, 1.0];
    pub const ENEMY: [f32; 4] = [1.0, 0.55, 0.0, 1.0];
    pub const SPIKE: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
    pub const GOAL: [f32; 4] = [1.0, 0.84, 0.0, 1.0];
    pub const GROUND: [f32; 4] = [0.18, 0.55, 0.34, 1.0];
    pub const SOLID: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
    pub const PLATFORM: [f32; 4] = [0.55, 0.35, 0.17, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.53, 0.81, 0.92, 1.0];
}

/// Parse a `#rrggbb` or `#rgb` color hint into RGBA
pub fn parse_hex_color(hint: &str) -> Option<[f32; 4]> {
    let hex = hint.strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>| {
        let digits = hex.get(range)?;
        let digits = if digits.len() == 1 {
            digits.repeat(2)
        } else {
            digits.to_string()
        };
        u8::from_str_radix(&digits, 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };
    match hex.len() {
        6 => Some([channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0]),
        3 => Some([channel(0..1)?, channel(1..2)?, channel(2..3)?, 1.0]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_hex_color("#fff"), Some([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(parse_hex_color("ff0000"), None);
        assert_eq!(parse_hex_color("#ggg000"), None);
        assert_eq!(parse_hex_color("green"), None);
    }
}
