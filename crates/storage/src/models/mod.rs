mod category;
mod lenient;
mod player;
mod race;
mod scores;
mod snapshot;

pub use category::RaceCategory;
pub use player::Player;
pub use race::{DEFAULT_SPORTS, Event, EventType, Race, RaceStatus};
pub use scores::{PENALTY_SCORE_KEY, PENALTY_TIME_KEY, PlayerScores, TOTAL_TIME_KEY};
pub use snapshot::Snapshot;
