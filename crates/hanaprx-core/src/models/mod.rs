//! Domain models for the HanapRx system.

mod inventory;
mod medicine;
mod pharmacy;
mod search;

pub use inventory::*;
pub use medicine::*;
pub use pharmacy::*;
pub use search::*;

use thiserror::Error;

/// Longest accepted name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Input that breaks a data-model invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Empty(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Price must be positive, got {0}")]
    Price(f64),

    #[error("Latitude must be between -90 and 90, got {0}")]
    Latitude(f64),

    #[error("Longitude must be between -180 and 180, got {0}")]
    Longitude(f64),

    #[error("Unknown availability label: {0:?}")]
    Availability(String),
}

pub(crate) fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}
