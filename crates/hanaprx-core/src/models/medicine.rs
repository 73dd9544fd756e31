//! Medicine catalog models.

use serde::{Deserialize, Serialize};

use super::{validate_name, ValidationError};

/// A medicine in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: i64,
    /// Brand name (e.g., "Biogesic")
    pub name: String,
    /// Generic name (e.g., "Paracetamol")
    pub generic_name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields required to add a medicine to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicine {
    pub name: String,
    pub generic_name: String,
    pub description: Option<String>,
}

/// Partial update for a medicine. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineUpdate {
    pub name: Option<String>,
    pub generic_name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

impl NewMedicine {
    /// Create a new medicine with required fields.
    pub fn new(name: impl Into<String>, generic_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic_name: generic_name.into(),
            description: None,
        }
    }

    /// Builder-style description setter.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)?;
        validate_name("genericName", &self.generic_name)
    }
}

impl MedicineUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(generic_name) = &self.generic_name {
            validate_name("genericName", generic_name)?;
        }
        Ok(())
    }

    /// Apply this update onto an existing record.
    pub fn apply(self, medicine: &mut Medicine) {
        if let Some(name) = self.name {
            medicine.name = name;
        }
        if let Some(generic_name) = self.generic_name {
            medicine.generic_name = generic_name;
        }
        if let Some(description) = self.description {
            medicine.description = description;
        }
    }
}
