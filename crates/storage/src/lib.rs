pub mod backend;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use database::Database;
