//! Tuning for the first-person controller and its RON loader.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Immutable tuning knobs, set when the controller is spawned.
///
/// Angles are in degrees, speeds in units per second, gravity in units per second squared
/// (negative pulls down).
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub jump_height: f32,
    pub gravity: f32,
    pub mouse_sensitivity: f32,
    pub max_look_angle: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            run_speed: 10.0,
            jump_height: 2.0,
            gravity: -9.81,
            mouse_sensitivity: 2.0,
            max_look_angle: 90.0,
        }
    }
}

impl ControllerConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(|source| ConfigError::Parse {
            origin: "<inline>".to_string(),
            source,
        })
    }

    /// Launch velocity that peaks at `jump_height` under constant `gravity`.
    ///
    /// A non-negative gravity (or negative height) yields no jump instead of NaN.
    pub fn jump_velocity(&self) -> f32 {
        (self.jump_height * -2.0 * self.gravity).max(0.0).sqrt()
    }

    /// Sensitivity used by look; zero or below disables look rather than inverting it.
    pub fn look_sensitivity(&self) -> f32 {
        self.mouse_sensitivity.max(0.0)
    }

    /// Pitch limit used by the look clamp, never negative.
    pub fn look_limit(&self) -> f32 {
        self.max_look_angle.max(0.0)
    }

    /// Collects every knob that is outside its meaningful range.
    /// Returns an empty list for a sane configuration.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (field, value) in [("walk_speed", self.walk_speed), ("run_speed", self.run_speed)] {
            if value < 0.0 {
                issues.push(ConfigIssue::NegativeSpeed { field, value });
            }
        }
        if self.jump_height < 0.0 {
            issues.push(ConfigIssue::NegativeJumpHeight(self.jump_height));
        }
        if self.gravity >= 0.0 {
            issues.push(ConfigIssue::NonNegativeGravity(self.gravity));
        }
        if self.mouse_sensitivity < 0.0 {
            issues.push(ConfigIssue::NegativeSensitivity(self.mouse_sensitivity));
        }
        if self.max_look_angle < 0.0 {
            issues.push(ConfigIssue::NegativeLookAngle(self.max_look_angle));
        }

        issues
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    #[error("{field} is negative ({value})")]
    NegativeSpeed { field: &'static str, value: f32 },
    #[error("jump_height is negative ({0}), jumping is disabled")]
    NegativeJumpHeight(f32),
    #[error("gravity must be negative to jump, got {0}")]
    NonNegativeGravity(f32),
    #[error("mouse_sensitivity is negative ({0}), look is disabled")]
    NegativeSensitivity(f32),
    #[error("max_look_angle is negative ({0}), pitch is pinned to level")]
    NegativeLookAngle(f32),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        source: ron::error::SpannedError,
    },
}

/// Loads a [`ControllerConfig`] from a RON file. Missing fields keep their defaults.
pub fn load_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let origin = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: origin.clone(),
        source,
    })?;

    ron::from_str(&contents).map_err(|source| ConfigError::Parse { origin, source })
}
