//! The module contains the errors the engine can return.
//!
//! Rejections leave the working document untouched:
//!
//! - [`Validation`] bad or missing input to a mutation.
//! - [`NotFound`] a referenced id does not exist.
//! - [`InsufficientFunds`] hard-stop balance checks (transfers, payments).
//!
//! Storage problems are surfaced but never corrupt the in-memory state:
//!
//! - [`CorruptData`] unparsable persisted or imported bytes.
//! - [`StorageQuota`] the durable store refused the write because it is full.
//! - [`Storage`] any other read/write failure of the durable store.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`NotFound`]: EngineError::NotFound
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`CorruptData`]: EngineError::CorruptData
//!  [`StorageQuota`]: EngineError::StorageQuota
//!  [`Storage`]: EngineError::Storage
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Corrupt data: {0}")]
    CorruptData(String),
    #[error("Storage quota exceeded: {0}")]
    StorageQuota(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// `true` when the mutation was applied in memory but could not be made
    /// durable. Every other variant means the operation was rejected.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageQuota(_) | Self::Storage(_))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::CorruptData(a), Self::CorruptData(b)) => a == b,
            (Self::StorageQuota(a), Self::StorageQuota(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
