pub mod championship;
pub mod player;
pub mod race;
pub mod results;
pub mod transfer;

pub use championship::{
    ChampionshipEntry, ChampionshipSort, PlayerProfile, RaceHistoryEntry, SortDirection,
};
pub use player::{CreatePlayerRequest, UpdatePlayerRequest};
pub use race::{CreateRaceRequest, RunInput, UpdateRaceRequest};
pub use results::{PlayerChampionshipResult, PlayerEventResult, PlayerTimeResult, RaceResults};
pub use transfer::{EXPORT_VERSION, ExportEnvelope, ImportMode, ImportSummary};
