use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(Box<reqwest::Error>),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Failed to load dataset: {0}")]
    DataLoad(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("No collection selected")]
    NoCollectionSelected,

    #[error("Item {item_id} not found in {collection}")]
    UnknownItem { collection: String, item_id: u32 },

    #[error(transparent)]
    Backup(#[from] BackupError),
}

impl From<std::io::Error> for CatalogError {
    fn from(error: std::io::Error) -> Self {
        CatalogError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(error: reqwest::Error) -> Self {
        CatalogError::Http(Box::new(error))
    }
}

/// Errors surfaced to the user when restoring a backup code.
///
/// The first three are validation failures and are shown verbatim. Anything else that
/// goes wrong while decoding collapses into [`BackupError::Corrupt`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackupError {
    #[error("Invalid data format")]
    InvalidFormat,

    #[error("Backup is missing required fields")]
    MissingFields,

    #[error("Backup was made by a newer version, please update and try again")]
    VersionTooNew,

    #[error("Invalid backup code, make sure it was copied completely")]
    Corrupt,
}
