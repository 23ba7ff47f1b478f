//! Tunable world parameters loaded from TOML.

use bulwark_core::CellBounds;
use bulwark_system_pathfinding::PathFinderConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading a world configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse world configuration")]
    Parse(#[from] toml::de::Error),
    /// The grid has no cells.
    #[error("grid must have at least one column and one row, got {columns}x{rows}")]
    EmptyGrid {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
}

/// Navigation knobs shared by every mob.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationTuning {
    /// Distance between samples when testing segments for obstructions.
    pub sample_step: f32,
    /// Maximum number of nodes a single search may expand.
    pub max_expansions: usize,
    /// Maximum number of smoothing passes over a found path.
    pub smoothing_passes: usize,
    /// Number of nearest candidates tried per objective kind before the
    /// next kind is considered.
    pub objective_candidates: usize,
    /// Optional bound on how far a route may wander from the mob.
    pub max_path_distance: Option<f32>,
}

impl Default for NavigationTuning {
    fn default() -> Self {
        Self {
            sample_step: 0.1,
            max_expansions: 4096,
            smoothing_passes: 8,
            objective_candidates: 3,
            max_path_distance: None,
        }
    }
}

/// Parameters of a simulated world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Gold the player starts with.
    pub starting_gold: f32,
    /// Lives each portal starts with.
    pub portal_lives: u32,
    /// Gold a player wall costs.
    pub wall_cost: f32,
    /// Health of walls.
    pub wall_health: f32,
    /// Height of walls.
    pub wall_height: f32,
    /// Share of the invested gold refunded when a tower is sold.
    pub sell_refund_ratio: f32,
    /// Distance from a portal's centre at which a mob breaches.
    pub portal_reach: f32,
    /// Stock a spawner needs to release a wave.
    pub spawner_threshold: f32,
    /// Stock a spawner starts with.
    pub spawner_reserve: f32,
    /// Stock a spawner gains per second.
    pub spawner_refill: f32,
    /// Radius around a spawner in which mobs appear.
    pub spawn_radius: f32,
    /// Navigation knobs.
    pub navigation: NavigationTuning,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            columns: 24,
            rows: 16,
            starting_gold: 200.0,
            portal_lives: 20,
            wall_cost: 10.0,
            wall_health: 60.0,
            wall_height: 1.0,
            sell_refund_ratio: 0.5,
            portal_reach: 0.0,
            spawner_threshold: 1.0,
            spawner_reserve: 0.0,
            spawner_refill: 0.1,
            spawn_radius: 1.5,
            navigation: NavigationTuning::default(),
        }
    }
}

impl WorldConfig {
    /// Parses a configuration, defaulting every missing field.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        if config.columns == 0 || config.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: config.columns,
                rows: config.rows,
            });
        }
        Ok(config)
    }

    /// Grid the simulation takes place on.
    #[must_use]
    pub const fn bounds(&self) -> CellBounds {
        CellBounds::new(self.columns, self.rows)
    }

    /// Path finder tuning derived from the navigation knobs.
    #[must_use]
    pub fn path_finder(&self) -> PathFinderConfig {
        PathFinderConfig {
            sample_step: self.navigation.sample_step,
            max_expansions: self.navigation.max_expansions,
            smoothing_passes: self.navigation.smoothing_passes,
            bounds: Some(self.bounds()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = WorldConfig::from_toml_str(
            r#"
            columns = 12
            starting_gold = 75.0

            [navigation]
            objective_candidates = 5
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.columns, 12);
        assert_eq!(config.rows, WorldConfig::default().rows);
        assert_eq!(config.starting_gold, 75.0);
        assert_eq!(config.navigation.objective_candidates, 5);
        assert_eq!(config.navigation.sample_step, 0.1);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let error = WorldConfig::from_toml_str("rows = 0").expect_err("empty grid");
        assert!(matches!(error, ConfigError::EmptyGrid { rows: 0, .. }));
    }

    #[test]
    fn malformed_document_reports_parse_error() {
        let error = WorldConfig::from_toml_str("columns = \"wide\"").expect_err("bad type");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn path_finder_is_bounded_by_the_grid() {
        let config = WorldConfig::default();
        assert_eq!(config.path_finder().bounds, Some(CellBounds::new(24, 16)));
    }
}
