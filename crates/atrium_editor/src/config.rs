//! Editor configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file is a valid
//! configuration.
//!
//! ```toml
//! [lot]
//! width = 12.0
//! depth = 8.0
//!
//! [history]
//! max_size = 50
//!
//! [tools]
//! default_tool = "select"
//! ```

use std::path::Path;

use atrium_ecs::EntityManagerConfig;
use atrium_event::EventBusConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::commands::CommandStack;
use crate::spatial::SpatialGrid;
use crate::tools::{FloorTool, WallTool, SELECT_TOOL_ID};
use crate::validation::LotBounds;

/// Errors from loading or checking a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Undo history length
    pub max_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: CommandStack::DEFAULT_MAX_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Nested emit limit before the bus drops an event
    pub max_emit_depth: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            max_emit_depth: EventBusConfig::default().max_emit_depth,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Broad-phase grid cell size in meters
    pub cell_size: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_size: SpatialGrid::DEFAULT_CELL_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitiesConfig {
    pub max_entities: Option<usize>,
    pub id_prefix: String,
}

impl Default for EntitiesConfig {
    fn default() -> Self {
        let defaults = EntityManagerConfig::default();
        Self {
            max_entities: defaults.max_entities,
            id_prefix: defaults.id_prefix,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Tool active after startup
    pub default_tool: String,
    pub wall_height: f32,
    pub wall_thickness: f32,
    /// Clicking this close to the first floor point closes the outline
    pub floor_close_distance: f32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            default_tool: SELECT_TOOL_ID.as_str().to_string(),
            wall_height: WallTool::DEFAULT_HEIGHT,
            wall_thickness: WallTool::DEFAULT_THICKNESS,
            floor_close_distance: FloorTool::DEFAULT_CLOSE_DISTANCE,
        }
    }
}

/// Complete editor configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub lot: LotBounds,
    pub history: HistoryConfig,
    pub events: EventsConfig,
    pub spatial: SpatialConfig,
    pub entities: EntitiesConfig,
    pub tools: ToolsConfig,
}

impl EditorConfig {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_toml_string()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Reject values the editor cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        fn positive(name: &str, value: f32) -> ConfigResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        }

        positive("lot.width", self.lot.width)?;
        positive("lot.depth", self.lot.depth)?;
        if !(self.lot.edge_margin >= 0.0) {
            return Err(ConfigError::Invalid("lot.edge_margin must not be negative".into()));
        }
        if self.history.max_size == 0 {
            return Err(ConfigError::Invalid("history.max_size must be at least 1".into()));
        }
        if self.events.max_emit_depth == 0 {
            return Err(ConfigError::Invalid("events.max_emit_depth must be at least 1".into()));
        }
        positive("spatial.cell_size", self.spatial.cell_size)?;
        if self.entities.max_entities == Some(0) {
            return Err(ConfigError::Invalid("entities.max_entities must be at least 1".into()));
        }
        if self.entities.id_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("entities.id_prefix must not be empty".into()));
        }
        if self.tools.default_tool.trim().is_empty() {
            return Err(ConfigError::Invalid("tools.default_tool must not be empty".into()));
        }
        positive("tools.wall_height", self.tools.wall_height)?;
        positive("tools.wall_thickness", self.tools.wall_thickness)?;
        if !(self.tools.floor_close_distance >= 0.0) {
            return Err(ConfigError::Invalid(
                "tools.floor_close_distance must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub fn bus_config(&self) -> EventBusConfig {
        EventBusConfig {
            max_emit_depth: self.events.max_emit_depth,
        }
    }

    pub fn entity_manager_config(&self) -> EntityManagerConfig {
        EntityManagerConfig {
            id_prefix: self.entities.id_prefix.clone(),
            max_entities: self.entities.max_entities,
        }
    }

    /// Log the effective settings
    pub fn log_summary(&self) {
        log::info!(
            "Lot {}m x {}m (edge margin {}m)",
            self.lot.width,
            self.lot.depth,
            self.lot.edge_margin
        );
        log::info!(
            "History {} | emit depth {} | grid cell {}m",
            self.history.max_size,
            self.events.max_emit_depth,
            self.spatial.cell_size
        );
        log::info!("Default tool: {}", self.tools.default_tool);
    }
}
