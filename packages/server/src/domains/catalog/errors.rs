use thiserror::Error;

use crate::common::ValidationErrors;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Failed to load catalog: {0}")]
    Load(anyhow::Error),

    #[error("Store error: {0}")]
    Store(anyhow::Error),
}
