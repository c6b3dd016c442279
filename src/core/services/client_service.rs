//! Validated mutations for client records.

use tracing::info;
use uuid::Uuid;

use crate::core::{
    clock::Clock,
    errors::{CrmError, Result},
    store::CrmStore,
};
use crate::domain::{common::same_name, Client, ClientDetails};

/// Provides validated mutations for [`Client`] records.
///
/// Removing a client also removes every subscription it owns.
pub struct ClientService;

impl ClientService {
    /// Adds a new client; the name is the only required field.
    pub fn add(
        store: &mut CrmStore,
        clock: &dyn Clock,
        name: &str,
        details: ClientDetails,
    ) -> Result<Uuid> {
        let name = Self::validate_name(store, None, name)?;
        let client = Client::new(name, clock.now()).with_details(details);
        let id = client.id;
        info!(client = %id, name = client.name.as_str(), "client added");
        store.clients.push(client);
        store.touch(clock.now());
        Ok(id)
    }

    pub fn edit(
        store: &mut CrmStore,
        clock: &dyn Clock,
        id: Uuid,
        name: &str,
        details: ClientDetails,
    ) -> Result<()> {
        let name = Self::validate_name(store, Some(id), name)?;
        let client = store
            .client_mut(id)
            .ok_or_else(|| CrmError::ClientNotFound(id.to_string()))?;
        client.name = name;
        client.details = details;
        store.touch(clock.now());
        Ok(())
    }

    /// Removes the client and its subscriptions, returning how many subscriptions went with it.
    pub fn remove(store: &mut CrmStore, clock: &dyn Clock, id: Uuid) -> Result<usize> {
        let before = store.clients.len();
        store.clients.retain(|client| client.id != id);
        if store.clients.len() == before {
            return Err(CrmError::ClientNotFound(id.to_string()));
        }
        let subs_before = store.subscriptions.len();
        store.subscriptions.retain(|sub| sub.client_id != id);
        let dropped = subs_before - store.subscriptions.len();
        info!(client = %id, subscriptions = dropped, "client removed");
        store.touch(clock.now());
        Ok(dropped)
    }

    pub fn get(store: &CrmStore, id: Uuid) -> Result<&Client> {
        store
            .client(id)
            .ok_or_else(|| CrmError::ClientNotFound(id.to_string()))
    }

    pub fn list(store: &CrmStore) -> Vec<&Client> {
        store.clients.iter().collect()
    }

    fn validate_name(store: &CrmStore, exclude: Option<Uuid>, candidate: &str) -> Result<String> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(CrmError::InvalidInput("client name is required".into()));
        }
        let duplicate = store.clients.iter().any(|client| {
            same_name(&client.name, trimmed) && exclude.map_or(true, |id| client.id != id)
        });
        if duplicate {
            Err(CrmError::InvalidInput(format!(
                "client `{}` already exists",
                trimmed
            )))
        } else {
            Ok(trimmed.to_string())
        }
    }
}
