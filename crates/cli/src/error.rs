use std::fmt;

use storage::error::StorageError;
use validator::ValidationErrors;

/// Errors reported to the terminal.
#[derive(Debug)]
pub enum CliError {
    Storage(StorageError),
    Io(std::io::Error),
    /// A player or race reference matched nothing
    NotFound(String),
    BadRequest(String),
    PinRequired,
    Unauthorized,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(StorageError::NotFound) => write!(f, "Not found"),
            Self::Storage(StorageError::Validation(errors)) => {
                write!(f, "Validation failed: {}", describe_validation(errors))
            }
            Self::Storage(StorageError::ConstraintViolation(msg))
            | Self::Storage(StorageError::BadRequest(msg)) => write!(f, "{}", msg),
            Self::Storage(StorageError::InvalidFormat(msg)) => {
                write!(f, "Invalid backup file: {}", msg)
            }
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::NotFound(what) => write!(f, "{} not found", what),
            Self::BadRequest(msg) => write!(f, "{}", msg),
            Self::PinRequired => write!(f, "Admin PIN required (use --pin or MULTIGAME_PIN)"),
            Self::Unauthorized => write!(f, "Unauthorized: wrong admin PIN"),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Storage(StorageError::NotFound) | Self::NotFound(_) => 4,
            Self::Storage(StorageError::ConstraintViolation(_)) => 5,
            Self::Storage(StorageError::Validation(_))
            | Self::Storage(StorageError::BadRequest(_))
            | Self::Storage(StorageError::InvalidFormat(_))
            | Self::BadRequest(_) => 2,
            Self::PinRequired | Self::Unauthorized => 3,
            Self::Storage(_) | Self::Io(_) => 1,
        }
    }
}

fn describe_validation(errors: &ValidationErrors) -> String {
    let mut details: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                format!(
                    "{}: {}",
                    field,
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                )
            })
        })
        .collect();
    details.sort();
    details.join(", ")
}

impl From<StorageError> for CliError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for CliError {
    fn from(error: ValidationErrors) -> Self {
        Self::Storage(StorageError::Validation(error))
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::Storage(StorageError::Serialization(error))
    }
}

pub type CliResult<T> = Result<T, CliError>;
