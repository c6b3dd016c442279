//! Validated mutations for the service catalog.

use tracing::info;
use uuid::Uuid;

use crate::core::{
    clock::Clock,
    errors::{CrmError, Result},
    store::CrmStore,
};
use crate::domain::{common::same_name, Service};

/// Maintains the catalog of sellable [`Service`]s.
pub struct CatalogService;

impl CatalogService {
    /// Adds a catalog service. Name, description and a non-negative price are required.
    pub fn add(
        store: &mut CrmStore,
        clock: &dyn Clock,
        name: &str,
        price: f64,
        description: &str,
    ) -> Result<Uuid> {
        let (name, description) = Self::validate(store, None, name, price, description)?;
        let service = Service::new(name, price, description);
        let id = service.id;
        info!(service = %id, name = service.name.as_str(), price, "service added");
        store.services.push(service);
        store.touch(clock.now());
        Ok(id)
    }

    pub fn edit(
        store: &mut CrmStore,
        clock: &dyn Clock,
        id: Uuid,
        name: &str,
        price: f64,
        description: &str,
    ) -> Result<()> {
        let (name, description) = Self::validate(store, Some(id), name, price, description)?;
        let service = store
            .service_mut(id)
            .ok_or_else(|| CrmError::ServiceNotFound(id.to_string()))?;
        service.name = name;
        service.price = price;
        service.description = description;
        store.touch(clock.now());
        Ok(())
    }

    /// Removes the service and every subscription to it.
    pub fn remove(store: &mut CrmStore, clock: &dyn Clock, id: Uuid) -> Result<usize> {
        let before = store.services.len();
        store.services.retain(|service| service.id != id);
        if store.services.len() == before {
            return Err(CrmError::ServiceNotFound(id.to_string()));
        }
        let subs_before = store.subscriptions.len();
        store.subscriptions.retain(|sub| sub.service_id != id);
        let dropped = subs_before - store.subscriptions.len();
        info!(service = %id, subscriptions = dropped, "service removed");
        store.touch(clock.now());
        Ok(dropped)
    }

    pub fn get(store: &CrmStore, id: Uuid) -> Result<&Service> {
        store
            .service(id)
            .ok_or_else(|| CrmError::ServiceNotFound(id.to_string()))
    }

    pub fn list(store: &CrmStore) -> Vec<&Service> {
        store.services.iter().collect()
    }

    fn validate(
        store: &CrmStore,
        exclude: Option<Uuid>,
        name: &str,
        price: f64,
        description: &str,
    ) -> Result<(String, String)> {
        let name = name.trim();
        let description = description.trim();
        if name.is_empty() || description.is_empty() {
            return Err(CrmError::InvalidInput(
                "service name and description are required".into(),
            ));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(CrmError::InvalidInput(format!(
                "service price must be a non-negative number, got {}",
                price
            )));
        }
        let duplicate = store.services.iter().any(|service| {
            same_name(&service.name, name) && exclude.map_or(true, |id| service.id != id)
        });
        if duplicate {
            return Err(CrmError::InvalidInput(format!(
                "service `{}` already exists",
                name
            )));
        }
        Ok((name.to_string(), description.to_string()))
    }
}
