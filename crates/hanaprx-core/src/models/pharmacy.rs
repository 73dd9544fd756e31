//! Pharmacy chain and branch models.

use serde::{Deserialize, Serialize};

use super::{validate_name, ValidationError};
use crate::geo::Coordinate;

/// A pharmacy chain (e.g., "Mercury Drug").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    pub id: i64,
    pub name: String,
    /// Logo URL, if the chain has one
    pub logo_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// The pharmacy fields carried alongside branches and search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PharmacySummary {
    pub id: i64,
    pub name: String,
    pub logo_url: Option<String>,
}

/// A pharmacy with the number of branches it owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyWithBranchCount {
    #[serde(flatten)]
    pub pharmacy: Pharmacy,
    pub branch_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPharmacy {
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyUpdate {
    pub name: Option<String>,
    pub logo_url: Option<Option<String>>,
}

impl NewPharmacy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logo_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)
    }
}

impl PharmacyUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) => validate_name("name", name),
            None => Ok(()),
        }
    }

    pub fn apply(self, pharmacy: &mut Pharmacy) {
        if let Some(name) = self.name {
            pharmacy.name = name;
        }
        if let Some(logo_url) = self.logo_url {
            pharmacy.logo_url = logo_url;
        }
    }
}

impl From<&Pharmacy> for PharmacySummary {
    fn from(pharmacy: &Pharmacy) -> Self {
        Self {
            id: pharmacy.id,
            name: pharmacy.name.clone(),
            logo_url: pharmacy.logo_url.clone(),
        }
    }
}

/// A physical location of a pharmacy chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: i64,
    pub pharmacy_id: i64,
    pub name: String,
    pub address: String,
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
    pub contact_number: Option<String>,
    /// Free-form opening hours (e.g., "Mon-Sun: 7:00 AM - 10:00 PM")
    pub business_hours: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A branch together with its owning pharmacy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchWithPharmacy {
    #[serde(flatten)]
    pub branch: Branch,
    pub pharmacy: PharmacySummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBranch {
    pub pharmacy_id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_number: Option<String>,
    pub business_hours: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchUpdate {
    pub pharmacy_id: Option<i64>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact_number: Option<Option<String>>,
    pub business_hours: Option<Option<String>>,
}

impl Branch {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl NewBranch {
    /// Create a new branch with required fields.
    pub fn new(
        pharmacy_id: i64,
        name: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            pharmacy_id,
            name: name.into(),
            address: address.into(),
            latitude,
            longitude,
            contact_number: None,
            business_hours: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)?;
        if self.address.trim().is_empty() {
            return Err(ValidationError::Empty("address"));
        }
        validate_latitude(self.latitude)?;
        validate_longitude(self.longitude)
    }
}

impl BranchUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(address) = &self.address {
            if address.trim().is_empty() {
                return Err(ValidationError::Empty("address"));
            }
        }
        if let Some(latitude) = self.latitude {
            validate_latitude(latitude)?;
        }
        if let Some(longitude) = self.longitude {
            validate_longitude(longitude)?;
        }
        Ok(())
    }

    pub fn apply(self, branch: &mut Branch) {
        if let Some(pharmacy_id) = self.pharmacy_id {
            branch.pharmacy_id = pharmacy_id;
        }
        if let Some(name) = self.name {
            branch.name = name;
        }
        if let Some(address) = self.address {
            branch.address = address;
        }
        if let Some(latitude) = self.latitude {
            branch.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            branch.longitude = longitude;
        }
        if let Some(contact_number) = self.contact_number {
            branch.contact_number = contact_number;
        }
        if let Some(business_hours) = self.business_hours {
            branch.business_hours = business_hours;
        }
    }
}

fn validate_latitude(latitude: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&latitude) {
        Ok(())
    } else {
        Err(ValidationError::Latitude(latitude))
    }
}

fn validate_longitude(longitude: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&longitude) {
        Ok(())
    } else {
        Err(ValidationError::Longitude(longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_coordinate_bounds() {
        let branch = NewBranch::new(1, "Colon St", "Colon St, Cebu City", 10.2942, 123.9010);
        assert!(branch.validate().is_ok());

        let mut bad = branch.clone();
        bad.latitude = 91.0;
        assert!(matches!(bad.validate(), Err(ValidationError::Latitude(_))));

        let mut bad = branch;
        bad.longitude = -180.5;
        assert!(matches!(bad.validate(), Err(ValidationError::Longitude(_))));
    }

    #[test]
    fn test_nan_latitude_rejected() {
        let branch = NewBranch::new(1, "Colon St", "Colon St", f64::NAN, 0.0);
        assert!(branch.validate().is_err());
    }

    #[test]
    fn test_pharmacy_update_keeps_unset_fields() {
        let mut pharmacy = Pharmacy {
            id: 1,
            name: "Mercury Drug".into(),
            logo_url: Some("https://example.com/logo.png".into()),
            created_at: String::new(),
            updated_at: String::new(),
        };
        PharmacyUpdate {
            name: Some("Mercury".into()),
            logo_url: None,
        }
        .apply(&mut pharmacy);

        assert_eq!(pharmacy.name, "Mercury");
        assert!(pharmacy.logo_url.is_some());
    }
}
