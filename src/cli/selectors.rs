//! Resolves user-typed references (names or id prefixes) to store records.

use uuid::Uuid;

use crate::core::{errors::CrmError, store::CrmStore};
use crate::domain::common::{same_name, Identifiable, NamedEntity};

const MIN_PREFIX_LEN: usize = 4;

/// Finds a record by exact (case-insensitive) name, then by unique id prefix.
fn resolve<'a>(
    candidates: impl Iterator<Item = (Uuid, &'a str)> + Clone,
    selector: &str,
) -> Result<Option<Uuid>, CrmError> {
    if selector.trim().is_empty() {
        return Ok(None);
    }
    if let Some((id, _)) = candidates.clone().find(|(_, name)| same_name(name, selector)) {
        return Ok(Some(id));
    }
    let prefix = selector.trim().to_ascii_lowercase().replace('-', "");
    if prefix.len() < MIN_PREFIX_LEN || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(None);
    }
    let mut matches = candidates.filter(|(id, _)| id.simple().to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some((id, _)), None) => Ok(Some(id)),
        (Some(_), Some(_)) => Err(CrmError::InvalidInput(format!(
            "`{selector}` matches more than one record; use a longer id"
        ))),
        _ => Ok(None),
    }
}

fn named<T: Identifiable + NamedEntity>(
    records: &[T],
) -> impl Iterator<Item = (Uuid, &str)> + Clone {
    records.iter().map(|record| (record.id(), record.name()))
}

pub(crate) fn client_id(store: &CrmStore, selector: &str) -> Result<Uuid, CrmError> {
    resolve(named(&store.clients), selector)?.ok_or_else(|| CrmError::ClientNotFound(selector.to_string()))
}

pub(crate) fn service_id(store: &CrmStore, selector: &str) -> Result<Uuid, CrmError> {
    resolve(named(&store.services), selector)?.ok_or_else(|| CrmError::ServiceNotFound(selector.to_string()))
}

/// `<client>/<service>` or a subscription id prefix. Returns `(client_id, subscription_id)`.
pub(crate) fn subscription_ids(store: &CrmStore, selector: &str) -> Result<(Uuid, Uuid), CrmError> {
    if let Some((client, service)) = selector.split_once('/') {
        let client = client_id(store, client)?;
        let service = service_id(store, service)?;
        return store
            .subscriptions_for_client(client)
            .find(|sub| sub.service_id == service)
            .map(|sub| (client, sub.id))
            .ok_or_else(|| CrmError::SubscriptionNotFound(selector.to_string()));
    }
    let candidates = store.subscriptions.iter().map(|s| (s.id(), ""));
    let id = resolve(candidates, selector)?
        .ok_or_else(|| CrmError::SubscriptionNotFound(selector.to_string()))?;
    store
        .subscription(id)
        .map(|sub| (sub.client_id, sub.id))
        .ok_or_else(|| CrmError::SubscriptionNotFound(selector.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{clock::FixedClock, demo};
    use crate::locale::LocaleConfig;
    use chrono::{NaiveDate, Utc};

    fn demo_store() -> CrmStore {
        let mut store = CrmStore::new("demo", LocaleConfig::default(), Utc::now());
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 8, 6).unwrap());
        demo::seed(&mut store, &clock).unwrap();
        store
    }

    #[test]
    fn names_and_prefixes_resolve() {
        let store = demo_store();
        let alpha = store.clients[0].id;
        assert_eq!(client_id(&store, "azienda alpha").unwrap(), alpha);
        let prefix = &alpha.simple().to_string()[..8];
        assert_eq!(client_id(&store, prefix).unwrap(), alpha);
        assert!(client_id(&store, "Gamma").unwrap_err().is_not_found());
        assert!(client_id(&store, "abc").is_err());
    }

    #[test]
    fn subscription_by_pair() {
        let store = demo_store();
        let (client, sub) = subscription_ids(&store, "Azienda Alpha/Campagna Social Media").unwrap();
        assert_eq!(client, store.clients[0].id);
        assert_eq!(store.subscription(sub).unwrap().subscribed_price, 750.0);
        assert!(matches!(
            subscription_ids(&store, "Beta S.r.l./Campagna Social Media"),
            Err(CrmError::SubscriptionNotFound(_))
        ));
    }
}
