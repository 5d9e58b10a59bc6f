//! Level data: static surfaces, enemies, spikes, goal and tutorial text
//!
//! Levels are plain JSON documents validated before a session is built.
//! Optional collections default to empty so a level never needs to mention
//! features it does not use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rect::Rect;
use crate::consts::{LAST_LEVEL, TUTORIAL_LEVEL};

/// Built-in level documents, indexed by level number
const BUILTIN_LEVELS: [&str; 4] = [
    include_str!("../../levels/level0.json"),
    include_str!("../../levels/level1.json"),
    include_str!("../../levels/level2.json"),
    include_str!("../../levels/level3.json"),
];

/// How a surface blocks the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Blocks on all four sides
    Ground,
    /// Blocks on all four sides
    Solid,
    /// One-way: only a downward landing onto its top is blocked
    Platform,
}

/// A static surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    #[serde(flatten)]
    pub rect: Rect,
    #[serde(rename = "type")]
    pub kind: SurfaceKind,
    /// CSS-style color hint for the renderer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Surface {
    pub fn new(rect: Rect, kind: SurfaceKind) -> Self {
        Self {
            rect,
            kind,
            color: None,
        }
    }
}

/// Horizontal alignment of tutorial text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Text drawn in world space (tutorial hints)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorialText {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub align: TextAlign,
}

/// Errors raised while loading a level
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("level has no surfaces")]
    NoSurfaces,

    #[error("base dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: f32, height: f32 },

    #[error("{collection}[{index}] is not a well-formed rectangle")]
    MalformedRect {
        collection: &'static str,
        index: usize,
    },

    #[error("no built-in level {0}")]
    UnknownLevel(u32),
}

/// Static description of one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    #[serde(default)]
    pub name: String,
    /// Logical world width (drives camera size and render scale)
    pub base_width: f32,
    /// Logical world height; the void starts below it
    pub base_height: f32,
    pub surfaces: Vec<Surface>,
    #[serde(default)]
    pub enemies: Vec<Rect>,
    #[serde(default)]
    pub spikes: Vec<Rect>,
    #[serde(default)]
    pub goal: Option<Rect>,
    #[serde(default)]
    pub tutorial_texts: Vec<TutorialText>,
}

impl LevelData {
    /// Parse and validate a level document
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        let level: LevelData = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Load one of the levels shipped with the game
    pub fn builtin(number: u32) -> Result<Self, LevelError> {
        let json = BUILTIN_LEVELS
            .get(number as usize)
            .ok_or(LevelError::UnknownLevel(number))?;
        Self::from_json_str(json)
    }

    /// Range of level numbers that have built-in data
    pub fn builtin_range() -> std::ops::RangeInclusive<u32> {
        TUTORIAL_LEVEL..=LAST_LEVEL
    }

    /// Check the preconditions the simulation relies on
    pub fn validate(&self) -> Result<(), LevelError> {
        if !(self.base_width > 0.0 && self.base_height > 0.0) {
            return Err(LevelError::InvalidDimensions {
                width: self.base_width,
                height: self.base_height,
            });
        }
        if self.surfaces.is_empty() {
            return Err(LevelError::NoSurfaces);
        }

        let rects = self
            .surfaces
            .iter()
            .enumerate()
            .map(|(i, s)| ("surfaces", i, &s.rect))
            .chain(self.enemies.iter().enumerate().map(|(i, r)| ("enemies", i, r)))
            .chain(self.spikes.iter().enumerate().map(|(i, r)| ("spikes", i, r)))
            .chain(self.goal.iter().map(|r| ("goal", 0, r)));

        for (collection, index, rect) in rects {
            if !rect.is_well_formed() {
                return Err(LevelError::MalformedRect { collection, index });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "base_width": 800,
        "base_height": 500,
        "surfaces": [
            {"x": 0, "y": 450, "width": 800, "height": 50, "type": "ground"}
        ]
    }"#;

    #[test]
    fn test_optional_collections_default_empty() {
        let level = LevelData::from_json_str(MINIMAL).unwrap();
        assert_eq!(level.surfaces.len(), 1);
        assert_eq!(level.surfaces[0].kind, SurfaceKind::Ground);
        assert!(level.enemies.is_empty());
        assert!(level.spikes.is_empty());
        assert!(level.goal.is_none());
        assert!(level.tutorial_texts.is_empty());
    }

    #[test]
    fn test_surface_kinds_parse() {
        let json = r#"{
            "base_width": 800, "base_height": 500,
            "surfaces": [
                {"x": 0, "y": 450, "width": 100, "height": 50, "type": "ground", "color": "green"},
                {"x": 100, "y": 300, "width": 100, "height": 60, "type": "solid"},
                {"x": 200, "y": 317, "width": 120, "height": 15, "type": "platform"}
            ]
        }"#;
        let level = LevelData::from_json_str(json).unwrap();
        let kinds: Vec<_> = level.surfaces.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SurfaceKind::Ground, SurfaceKind::Solid, SurfaceKind::Platform]
        );
        assert_eq!(level.surfaces[0].color.as_deref(), Some("green"));
    }

    #[test]
    fn test_missing_surfaces_rejected() {
        let json = r#"{"base_width": 800, "base_height": 500, "surfaces": []}"#;
        assert!(matches!(
            LevelData::from_json_str(json),
            Err(LevelError::NoSurfaces)
        ));
    }

    #[test]
    fn test_bad_dimensions_rejected() {
        let json = r#"{"base_width": 0, "base_height": 500, "surfaces": []}"#;
        assert!(matches!(
            LevelData::from_json_str(json),
            Err(LevelError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_malformed_enemy_reports_index() {
        let json = r#"{
            "base_width": 800, "base_height": 500,
            "surfaces": [{"x": 0, "y": 450, "width": 800, "height": 50, "type": "ground"}],
            "enemies": [
                {"x": 10, "y": 10, "width": 40, "height": 40},
                {"x": 10, "y": 10, "width": -4, "height": 40}
            ]
        }"#;
        match LevelData::from_json_str(json) {
            Err(LevelError::MalformedRect { collection, index }) => {
                assert_eq!(collection, "enemies");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            LevelData::from_json_str("{"),
            Err(LevelError::Parse(_))
        ));
    }

    #[test]
    fn test_builtin_levels_load() {
        for n in LevelData::builtin_range() {
            let level = LevelData::builtin(n).unwrap_or_else(|e| panic!("level {n}: {e}"));
            assert!(!level.surfaces.is_empty());
        }
        assert!(matches!(
            LevelData::builtin(LAST_LEVEL + 1),
            Err(LevelError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_playable_levels_have_goals() {
        for n in 1..=LAST_LEVEL {
            assert!(LevelData::builtin(n).unwrap().goal.is_some(), "level {n}");
        }
    }
}
