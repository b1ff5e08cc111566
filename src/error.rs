use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpellError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Catalog Error: operation requires a closed catalog")]
    CatalogOpen,

    #[error("Catalog Error: catalog is closed, no key can be added")]
    CatalogClosed,

    #[error("Index Error: index {index} out of range (size {size})")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Distance Error: key {0} is not part of any distance family")]
    KeyNotInFamily(String),

    #[error("Distance Error: {family} table has no path from {from} to {to}")]
    UnreachedDistance {
        family: String,
        from: usize,
        to: usize,
    },
}

pub type SpellResult<T> = Result<T, SpellError>;

/// Fails with `IndexOutOfRange` unless `index < size`.
pub(crate) fn check_index(index: usize, size: usize) -> SpellResult<()> {
    if index < size {
        Ok(())
    } else {
        Err(SpellError::IndexOutOfRange { index, size })
    }
}
