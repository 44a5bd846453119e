use serde::{Deserialize, Serialize};

use crate::{ConfigError, Grid, RotationSystem};

/// Immutable settings shared by every part of a session.
///
/// Grid dimensions live here rather than in any process-wide state; the
/// session hands them to the grid and to spawning explicitly.
///
/// # Example
///
/// ```
/// use stackfall_engine::SessionConfig;
///
/// let config: SessionConfig =
///     serde_json::from_str(r#"{ "height": 16, "rotation": "wall-kick" }"#).unwrap();
/// assert_eq!(config.height, 16);
/// assert_eq!(config.width, 12);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Visible rows.
    pub height: usize,
    pub width: usize,
    /// Hidden rows above the visible field; row 0 is the spawn row.
    pub buffer_rows: usize,
    /// Playing ticks per automatic downward move.
    pub gravity_interval: u32,
    pub rotation: RotationSystem,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            height: Self::DEFAULT_HEIGHT,
            width: Self::DEFAULT_WIDTH,
            buffer_rows: 2,
            gravity_interval: 1,
            rotation: RotationSystem::Fixed,
        }
    }
}

impl SessionConfig {
    pub const DEFAULT_HEIGHT: usize = 20;
    pub const DEFAULT_WIDTH: usize = 12;
    /// The widest envelope (I) must fit.
    pub const MIN_WIDTH: usize = 4;
    pub const MIN_HEIGHT: usize = 4;

    #[must_use]
    pub fn with_size(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < Self::MIN_WIDTH {
            return Err(ConfigError::WidthTooSmall {
                width: self.width,
                min: Self::MIN_WIDTH,
            });
        }
        if self.height < Self::MIN_HEIGHT {
            return Err(ConfigError::HeightTooSmall {
                height: self.height,
                min: Self::MIN_HEIGHT,
            });
        }
        if self.buffer_rows == 0 {
            return Err(ConfigError::NoBufferRows);
        }
        if self.gravity_interval == 0 {
            return Err(ConfigError::ZeroGravityInterval);
        }
        Ok(())
    }

    /// Fails unless `grid` has exactly the configured dimensions.
    pub(crate) fn check_grid(&self, grid: &Grid) -> Result<(), ConfigError> {
        if (grid.height(), grid.width(), grid.buffer_rows())
            == (self.height, self.width, self.buffer_rows)
        {
            return Ok(());
        }
        Err(ConfigError::GridMismatch {
            height: self.height,
            width: self.width,
            buffer_rows: self.buffer_rows,
            actual_height: grid.height(),
            actual_width: grid.width(),
            actual_buffer: grid.buffer_rows(),
        })
    }

    #[must_use]
    pub fn empty_grid(&self) -> Grid {
        Grid::new(self.height, self.width, self.buffer_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference_board() {
        let config = SessionConfig::default();
        assert_eq!((config.height, config.width), (20, 12));
        assert_eq!(config.rotation, RotationSystem::Fixed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let narrow = SessionConfig::with_size(20, 3);
        assert_eq!(
            narrow.validate(),
            Err(ConfigError::WidthTooSmall { width: 3, min: 4 })
        );

        let short = SessionConfig::with_size(2, 10);
        assert!(matches!(
            short.validate(),
            Err(ConfigError::HeightTooSmall { height: 2, .. })
        ));

        let no_buffer = SessionConfig {
            buffer_rows: 0,
            ..SessionConfig::default()
        };
        assert_eq!(no_buffer.validate(), Err(ConfigError::NoBufferRows));

        let frozen = SessionConfig {
            gravity_interval: 0,
            ..SessionConfig::default()
        };
        assert_eq!(frozen.validate(), Err(ConfigError::ZeroGravityInterval));
    }

    #[test]
    fn test_check_grid() {
        let config = SessionConfig::default();
        assert!(config.check_grid(&config.empty_grid()).is_ok());
        let err = config.check_grid(&Grid::new(20, 10, 2)).unwrap_err();
        assert!(err.to_string().contains("20x10"));
    }

    #[test]
    fn test_json_round_trip_and_unknown_fields() {
        let config = SessionConfig {
            gravity_interval: 3,
            rotation: RotationSystem::WallKick,
            ..SessionConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"wall-kick\""));
        let parsed: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        assert!(serde_json::from_str::<SessionConfig>(r#"{ "colour": 1 }"#).is_err());
    }
}
