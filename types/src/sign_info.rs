//! Registry (sign-in) entries.

use serde::{Deserialize, Serialize};

/// A credential record seeded into the registry at initialisation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInfo {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "CompanyName")]
    pub company_name: String,
    #[serde(rename = "CompanyId")]
    pub company_id: String,
}

impl SignInfo {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        company_name: impl Into<String>,
        company_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            company_name: company_name.into(),
            company_id: company_id.into(),
        }
    }

    /// Plain equality on username and password.
    pub fn matches_credentials(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}
