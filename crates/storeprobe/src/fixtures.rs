//! Journey input data.
//!
//! [`TestData`] is read from a camelCase JSON file (`user-data.json` in the
//! recorder's layout). Every field has a default, so a partial file or no
//! file at all still yields a usable fixture.

use crate::result::StoreResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Customer used for registration and login journeys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserData {
    /// Login e-mail
    pub email: String,
    /// Password
    pub password: String,
    /// `Mr` or `Mrs`
    pub gender: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Day of birth (select value)
    pub dob_day: Option<String>,
    /// Month of birth (select value)
    pub dob_month: Option<String>,
    /// Year of birth (select value)
    pub dob_year: Option<String>,
    /// Company
    pub company: Option<String>,
    /// Street address
    pub address: String,
    /// Second address line
    pub address2: Option<String>,
    /// City
    pub city: String,
    /// State label
    pub state: Option<String>,
    /// Postcode
    pub zip_code: String,
    /// Country label
    pub country: Option<String>,
    /// Free-text notes
    pub additional_info: Option<String>,
    /// Home phone
    pub phone: Option<String>,
    /// Mobile phone
    pub mobile_phone: Option<String>,
    /// Address alias
    pub address_alias: Option<String>,
}

impl Default for UserData {
    fn default() -> Self {
        Self {
            email: "test.user@example.com".to_string(),
            password: "Password123!".to_string(),
            gender: "Mr".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            dob_day: None,
            dob_month: None,
            dob_year: None,
            company: None,
            address: "123 Test Street".to_string(),
            address2: None,
            city: "Test City".to_string(),
            state: Some("Alabama".to_string()),
            zip_code: "12345".to_string(),
            country: Some("United States".to_string()),
            additional_info: None,
            phone: Some("5551234567".to_string()),
            mobile_phone: None,
            address_alias: None,
        }
    }
}

impl UserData {
    /// Copy with a fresh, never-registered e-mail address
    #[must_use]
    pub fn with_unique_email(&self) -> Self {
        Self {
            email: unique_email(),
            ..self.clone()
        }
    }
}

/// Credentials only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// E-mail
    pub email: String,
    /// Password
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: "invalid@example.com".to_string(),
            password: "wrongpassword".to_string(),
        }
    }
}

/// Inputs shared by all journeys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestData {
    /// Term expected to return products
    pub product_to_search: String,
    /// Term expected to return nothing
    pub invalid_search_term: String,
    /// Layered-navigation size
    pub filter_size: String,
    /// Sort dropdown label
    pub sort_option: String,
    /// Contact form subject label
    pub contact_subject: String,
    /// Contact form message
    pub contact_us_message: String,
    /// Customer used for registration
    pub valid_user: UserData,
    /// Credentials expected to be rejected
    pub invalid_user: Credentials,
}

impl Default for TestData {
    fn default() -> Self {
        Self {
            product_to_search: "Blouse".to_string(),
            invalid_search_term: "nonexistentproduct12345".to_string(),
            filter_size: "M".to_string(),
            sort_option: "Price: Lowest first".to_string(),
            contact_subject: "Customer service".to_string(),
            contact_us_message: "This is a test message from the automation suite.".to_string(),
            valid_user: UserData::default(),
            invalid_user: Credentials::default(),
        }
    }
}

impl TestData {
    /// Load from a JSON file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let data = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded test data");
        Ok(data)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> StoreResult<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// A random address under `example.com`
#[must_use]
pub fn unique_email() -> String {
    format!("storeprobe.{}@example.com", uuid::Uuid::new_v4().simple())
}
