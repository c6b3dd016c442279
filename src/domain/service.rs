use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Catalog entry for something the business sells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    /// List price; subscriptions record their own negotiated price.
    pub price: f64,
    pub description: String,
}

impl Service {
    pub fn new(name: impl Into<String>, price: f64, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            description: description.into(),
        }
    }
}

impl Identifiable for Service {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Service {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Service {
    fn display_label(&self) -> String {
        format!("{} ({:.2})", self.name, self.price)
    }
}
