use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{common::same_name, Client, Service, Subscription},
    locale::LocaleConfig,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// In-memory CRM data set: clients, the service catalog, and subscriptions.
///
/// Passed explicitly to every service call; wrap it in
/// [`SharedStore`](super::shared::SharedStore) when several callers need it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmStore {
    pub name: String,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "CrmStore::schema_version_default")]
    pub schema_version: u8,
}

impl CrmStore {
    pub fn new(name: impl Into<String>, locale: LocaleConfig, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            locale,
            clients: Vec::new(),
            services: Vec::new(),
            subscriptions: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn client(&self, id: Uuid) -> Option<&Client> {
        self.clients.iter().find(|client| client.id == id)
    }

    pub fn client_mut(&mut self, id: Uuid) -> Option<&mut Client> {
        self.clients.iter_mut().find(|client| client.id == id)
    }

    pub fn client_by_name(&self, name: &str) -> Option<&Client> {
        self.clients
            .iter()
            .find(|client| same_name(&client.name, name))
    }

    pub fn service(&self, id: Uuid) -> Option<&Service> {
        self.services.iter().find(|service| service.id == id)
    }

    pub fn service_mut(&mut self, id: Uuid) -> Option<&mut Service> {
        self.services.iter_mut().find(|service| service.id == id)
    }

    pub fn service_by_name(&self, name: &str) -> Option<&Service> {
        self.services
            .iter()
            .find(|service| same_name(&service.name, name))
    }

    pub fn subscription(&self, id: Uuid) -> Option<&Subscription> {
        self.subscriptions.iter().find(|sub| sub.id == id)
    }

    pub fn subscription_mut(&mut self, id: Uuid) -> Option<&mut Subscription> {
        self.subscriptions.iter_mut().find(|sub| sub.id == id)
    }

    pub fn subscriptions_for_client(&self, client_id: Uuid) -> impl Iterator<Item = &Subscription> {
        self.subscriptions
            .iter()
            .filter(move |sub| sub.client_id == client_id)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_by_id_and_name() {
        let mut store = CrmStore::new("test", LocaleConfig::default(), Utc::now());
        let client = Client::new("Beta S.r.l.", Utc::now());
        let id = client.id;
        store.clients.push(client);
        store.services.push(Service::new("SEO", 500.0, "Search"));

        assert_eq!(store.client(id).map(|c| c.name.as_str()), Some("Beta S.r.l."));
        assert!(store.client_by_name("  beta s.r.l. ").is_some());
        assert!(store.service_by_name("seo").is_some());
        assert!(store.client(Uuid::new_v4()).is_none());
    }

    #[test]
    fn schema_version_defaults_when_missing() {
        let json = r#"{
            "name": "legacy",
            "created_at": "2024-08-01T00:00:00Z",
            "updated_at": "2024-08-01T00:00:00Z"
        }"#;
        let store: CrmStore = serde_json::from_str(json).unwrap();
        assert_eq!(store.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(store.clients.is_empty());
        assert_eq!(store.locale, LocaleConfig::default());
    }
}
