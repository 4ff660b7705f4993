// ABOUTME: Error types for run-log storage operations
// ABOUTME: Defines specific error types for reading and writing the durable log

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access run log: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to serialize run log: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
