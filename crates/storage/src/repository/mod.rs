pub mod player;
pub mod race;
pub mod transfer;

pub use player::PlayerRepository;
pub use race::RaceRepository;
pub use transfer::{TransferRepository, backup_file_name};
