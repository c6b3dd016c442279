use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Company or person the business sells services to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub details: ClientDetails,
    pub created_at: DateTime<Utc>,
}

/// Contact and billing registry fields of a client. All optional free text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientDetails {
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub vat_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub sdi_code: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub call_center: String,
}

impl Client {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            details: ClientDetails::default(),
            created_at,
        }
    }

    pub fn with_details(mut self, details: ClientDetails) -> Self {
        self.details = details;
        self
    }
}

impl ClientDetails {
    /// Sets a detail by its field name; returns false for unknown names.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        let slot = match field {
            "contact" => &mut self.contact,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "vat_id" => &mut self.vat_id,
            "address" => &mut self.address,
            "city" => &mut self.city,
            "zip" => &mut self.zip,
            "sdi_code" => &mut self.sdi_code,
            "agent" => &mut self.agent,
            "call_center" => &mut self.call_center,
            _ => return false,
        };
        *slot = value.into();
        true
    }

    /// Non-empty fields as `(name, value)` pairs, in registry order.
    pub fn filled(&self) -> Vec<(&'static str, &str)> {
        [
            ("contact", self.contact.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("vat_id", self.vat_id.as_str()),
            ("address", self.address.as_str()),
            ("city", self.city.as_str()),
            ("zip", self.zip.as_str()),
            ("sdi_code", self.sdi_code.as_str()),
            ("agent", self.agent.as_str()),
            ("call_center", self.call_center.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

impl Identifiable for Client {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Client {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Client {
    fn display_label(&self) -> String {
        if self.details.city.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.details.city)
        }
    }
}
