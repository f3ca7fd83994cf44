use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::Database;
use crate::dto::transfer::{EXPORT_VERSION, ExportEnvelope, ImportMode, ImportSummary};
use crate::error::{Result, StorageError};
use crate::models::{Player, Race};

pub struct TransferRepository<'a> {
    db: &'a mut Database,
}

impl<'a> TransferRepository<'a> {
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    pub fn export(&self) -> ExportEnvelope {
        let snapshot = self.db.snapshot();
        ExportEnvelope {
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            players: snapshot.players.clone(),
            races: snapshot.races.clone(),
        }
    }

    /// Pretty-printed backup document.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }

    /// Imports a backup document. Nothing is written unless the whole
    /// document is usable.
    pub fn import(&mut self, json: &str, mode: ImportMode) -> Result<ImportSummary> {
        let (players, races) = parse_backup(json)?;

        let summary = self.db.update(|snap| match mode {
            ImportMode::Replace => {
                let summary = ImportSummary {
                    mode,
                    players_added: players.len(),
                    races_added: races.len(),
                };
                snap.players = players;
                snap.races = races;
                if let Some(active) = snap.active_race_id
                    && snap.find_race(active).is_none()
                {
                    snap.active_race_id = None;
                }
                Ok(summary)
            }
            ImportMode::Merge => {
                let players_added = merge_by_id(&mut snap.players, players, |p| p.id);
                let races_added = merge_by_id(&mut snap.races, races, |r| r.id);
                Ok(ImportSummary {
                    mode,
                    players_added,
                    races_added,
                })
            }
        })?;

        tracing::info!(
            mode = mode.as_str(),
            players = summary.players_added,
            races = summary.races_added,
            "Backup imported"
        );
        Ok(summary)
    }
}

/// Suggested file name for a backup taken on `date`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("backup_multigame_{}.json", date.format("%Y-%m-%d"))
}

fn parse_backup(json: &str) -> Result<(Vec<Player>, Vec<Race>)> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| StorageError::InvalidFormat(format!("not a JSON document: {}", e)))?;

    if !document.get("version").is_some_and(is_truthy) {
        return Err(invalid("missing version"));
    }
    let players = document
        .get("players")
        .filter(|v| v.is_array())
        .ok_or_else(|| invalid("players must be an array"))?;
    let races = document
        .get("races")
        .filter(|v| v.is_array())
        .ok_or_else(|| invalid("races must be an array"))?;

    let players: Vec<Player> = serde_json::from_value(players.clone())
        .map_err(|e| StorageError::InvalidFormat(format!("bad player record: {}", e)))?;
    let races: Vec<Race> = serde_json::from_value(races.clone())
        .map_err(|e| StorageError::InvalidFormat(format!("bad race record: {}", e)))?;

    Ok((players, races))
}

fn invalid(reason: &str) -> StorageError {
    tracing::warn!(reason, "Rejected backup import");
    StorageError::InvalidFormat(reason.to_string())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Appends records whose id is not present yet, including ids repeated
/// within `incoming`. Returns how many were added.
fn merge_by_id<T>(existing: &mut Vec<T>, incoming: Vec<T>, id: impl Fn(&T) -> Uuid) -> usize {
    let mut seen: HashSet<Uuid> = existing.iter().map(&id).collect();
    let before = existing.len();
    existing.extend(incoming.into_iter().filter(|item| seen.insert(id(item))));
    existing.len() - before
}
