//! Configuration for tactiboard: colors, scale-dependent sizes and persisted defaults

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{ArrowStyle, ZoneStyle};

/// Shared constants consumed by geometry, managers and the simulation
pub mod constants {
    /// Tracking data frame rate (frames per second)
    pub const FPS: f64 = 25.0;
    /// Player outer radius when scale = 1.0
    pub const PLAYER_OUTER_RADIUS_BASE: f64 = 1.6;

    /// Arrowhead base length before width scaling
    pub const ANNOTATION_ARROW_HEAD_LENGTH: f64 = 2.0;
    /// Arrowhead wing angle from the reversed shaft direction, in degrees
    pub const ANNOTATION_ARROW_HEAD_ANGLE: f64 = 30.0;
    /// Default user-facing arrow width
    pub const ANNOTATION_ARROW_BASE_WIDTH: f64 = 1.0;
    /// Allowed user-facing arrow widths
    pub const ANNOTATION_ARROW_WIDTH_RANGE: (f64, f64) =
        (ANNOTATION_ARROW_BASE_WIDTH, ANNOTATION_ARROW_BASE_WIDTH * 10.0);

    /// Zigzag spatial period in scene units
    pub const ZIGZAG_PERIOD: f64 = 2.0;
    /// Zigzag lateral amplitude in scene units
    pub const ZIGZAG_AMPLITUDE: f64 = 0.6;

    /// Future trajectories keep one frame out of this many
    pub const TRAJECTORY_SAMPLE_RATE: usize = 5;

    /// Interior angle given to new cones
    pub const DEFAULT_CONE_SPREAD_DEG: f64 = 60.0;
    /// Border width given to new zones
    pub const DEFAULT_ZONE_WIDTH: f64 = 1.0;
    /// Fill alpha given to new zones (0 = transparent)
    pub const DEFAULT_ZONE_ALPHA: u8 = 0;
}

/// Serializable color representation for config storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl ShapeColor {
    pub const BLACK: ShapeColor = ShapeColor {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Ball orange (#FFA500)
    pub const BALL: ShapeColor = ShapeColor {
        r: 1.0,
        g: 0.647,
        b: 0.0,
        a: 1.0,
    };

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 && digits.len() != 8 {
            return None;
        }
        let channel = |i: usize| -> Option<f32> {
            let byte = u8::from_str_radix(digits.get(i..i + 2)?, 16).ok()?;
            Some(byte as f32 / 255.0)
        };
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 1.0 },
        })
    }

    /// Same color with a different alpha (0.0-1.0)
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }
}

/// Scale-dependent visual sizes, passed explicitly to whoever needs them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    scale: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl ScaleConfig {
    pub const MIN_SCALE: f64 = 0.5;
    pub const MAX_SCALE: f64 = 2.0;

    pub fn new(scale: f64) -> Self {
        Self {
            scale: scale.clamp(Self::MIN_SCALE, Self::MAX_SCALE),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn player_outer_radius(&self) -> f64 {
        constants::PLAYER_OUTER_RADIUS_BASE * self.scale
    }

    pub fn player_inner_radius(&self) -> f64 {
        0.75 * self.player_outer_radius()
    }

    pub fn ball_radius(&self) -> f64 {
        7.0 / 16.0 * self.player_outer_radius()
    }

    /// Radius within which a click snaps to a tracked player
    pub fn tactical_arrow_detection_radius(&self) -> f64 {
        self.player_outer_radius()
    }

    pub fn trajectory_player_line_width(&self) -> f64 {
        3.0 / 16.0 * self.player_outer_radius()
    }

    pub fn trajectory_ball_line_width(&self) -> f64 {
        5.0 / 16.0 * self.player_outer_radius()
    }
}

/// User defaults persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TactiboardConfig {
    /// Color for new arrows
    pub arrow_color: ShapeColor,
    /// User-facing width for new arrows
    pub arrow_width: f64,
    /// Line style for new arrows (decides the simulated action)
    pub arrow_style: ArrowStyle,
    /// Color for new zones
    pub zone_color: ShapeColor,
    /// Border width for new zones
    pub zone_width: f64,
    /// Border style for new zones
    pub zone_style: ZoneStyle,
    /// Fill alpha for new zones (0-255)
    pub zone_fill_alpha: u8,
    /// Interior angle for new cones
    pub cone_spread_deg: f64,
    /// Length of the simulation window in seconds
    pub simulation_interval_seconds: f64,
    /// Whether trajectories fade with temporal distance
    pub trajectory_fading: bool,
    /// UI scale driving player and trajectory sizes
    pub scale: f64,
}

impl Default for TactiboardConfig {
    fn default() -> Self {
        Self {
            arrow_color: ShapeColor::BLACK,
            arrow_width: constants::ANNOTATION_ARROW_BASE_WIDTH,
            arrow_style: ArrowStyle::Solid,
            zone_color: ShapeColor::BLACK,
            zone_width: constants::DEFAULT_ZONE_WIDTH,
            zone_style: ZoneStyle::Solid,
            zone_fill_alpha: constants::DEFAULT_ZONE_ALPHA,
            cone_spread_deg: constants::DEFAULT_CONE_SPREAD_DEG,
            simulation_interval_seconds: 10.0,
            trajectory_fading: true,
            scale: 1.0,
        }
    }
}

impl TactiboardConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "tactiboard";

    /// Default location of the settings file
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("No config directory on this platform")?;
        Ok(dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(err) => {
                log::warn!("Could not locate config file: {:?}", err);
                return Self::default();
            }
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) {
        let result = Self::default_path().and_then(|path| self.save_to(&path));
        if let Err(err) = result {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn scale_config(&self) -> ScaleConfig {
        ScaleConfig::new(self.scale)
    }

    /// Arrow width clamped to the allowed range
    pub fn clamped_arrow_width(&self) -> f64 {
        let (min, max) = constants::ANNOTATION_ARROW_WIDTH_RANGE;
        self.arrow_width.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let c = ShapeColor::from_hex("#FFA500").unwrap();
        assert_eq!(c.to_rgba_u8(), [255, 165, 0, 255]);
        let c = ShapeColor::from_hex("00000080").unwrap();
        assert_eq!(c.to_rgba_u8()[3], 128);
        assert!(ShapeColor::from_hex("#12345").is_none());
        assert!(ShapeColor::from_hex("#GG0000").is_none());
    }

    #[test]
    fn test_scale_is_clamped() {
        assert_eq!(ScaleConfig::new(5.0).scale(), 2.0);
        assert_eq!(ScaleConfig::new(0.1).scale(), 0.5);
        let s = ScaleConfig::new(1.0);
        assert!((s.player_outer_radius() - 1.6).abs() < 1e-12);
        assert!((s.ball_radius() - 0.7).abs() < 1e-12);
        assert!((s.player_inner_radius() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = TactiboardConfig {
            arrow_style: ArrowStyle::Zigzag,
            zone_fill_alpha: 80,
            scale: 1.5,
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        let loaded = TactiboardConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: TactiboardConfig = serde_json::from_str(r#"{"zone_fill_alpha": 12}"#).unwrap();
        assert_eq!(config.zone_fill_alpha, 12);
        assert_eq!(config.cone_spread_deg, constants::DEFAULT_CONE_SPREAD_DEG);
        assert_eq!(config.arrow_style, ArrowStyle::Solid);
    }

    #[test]
    fn test_load_from_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(TactiboardConfig::load_from(&path).is_err());
    }
}
