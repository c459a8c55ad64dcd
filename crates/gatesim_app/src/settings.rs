// SPDX-License-Identifier: MIT OR Apache-2.0
//! Simulator settings.
//!
//! Settings live in a RON file (`gatesim.ron` next to the circuit document by
//! default). Every field is optional; missing fields take their defaults.

use gatesim_graph::{PassBudget, PropagationConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name looked up next to a circuit document
pub const SETTINGS_FILE_NAME: &str = "gatesim.ron";

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "gatesim_app=info,gatesim_graph=warn";

/// Hard upper bound on truth table size (2^16 rows)
pub const MAX_TABLE_INPUTS: usize = 16;

/// Error loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Settings parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] ron::Error),

    /// Written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },
}

/// Simulator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Format version
    pub version: u32,
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Fixed number of propagation passes (default: one per node)
    pub budget: Option<usize>,
    /// Print every port value after the indicators
    pub show_ports: bool,
    /// Largest switch count for which a truth table is produced
    pub max_table_inputs: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            budget: None,
            show_ports: false,
            max_table_inputs: 10,
        }
    }
}

impl Settings {
    /// Parse settings from RON text
    pub fn from_ron(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = ron::from_str(text)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Load settings from a file, falling back to defaults if it is absent
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Settings file path for a circuit document
    pub fn path_for_document(document: &Path) -> PathBuf {
        document
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SETTINGS_FILE_NAME)
    }

    /// Propagation configuration implied by these settings
    pub fn propagation(&self) -> PropagationConfig {
        PropagationConfig {
            budget: self.budget.map_or(PassBudget::NodeCount, PassBudget::Fixed),
        }
    }

    /// Truth table limit, clamped to [`MAX_TABLE_INPUTS`]
    pub fn table_limit(&self) -> usize {
        self.max_table_inputs.min(MAX_TABLE_INPUTS)
    }
}
