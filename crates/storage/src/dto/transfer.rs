use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Player, Race};

pub const EXPORT_VERSION: u32 = 1;

/// Backup file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub players: Vec<Player>,
    pub races: Vec<Race>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Append records whose ids are not already present
    #[default]
    Merge,
    /// Overwrite both collections
    Replace,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Replace => "replace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub mode: ImportMode,
    pub players_added: usize,
    pub races_added: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ImportMode::Replace => write!(
                f,
                "Data replaced: {} players, {} races",
                self.players_added, self.races_added
            ),
            ImportMode::Merge => write!(
                f,
                "Merge complete: {} players added, {} races added",
                self.players_added, self.races_added
            ),
        }
    }
}
