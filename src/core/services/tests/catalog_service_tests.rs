use super::{clock, date, empty_store, store_with_client_and_service};
use crate::core::errors::CrmError;
use crate::core::services::{CatalogService, SubscriptionService};
use crate::domain::SubscriptionTerms;

#[test]
fn all_fields_are_required() {
    let mut store = empty_store();
    assert!(matches!(
        CatalogService::add(&mut store, &clock(), "SEO", 300.0, ""),
        Err(CrmError::InvalidInput(_))
    ));
    assert!(matches!(
        CatalogService::add(&mut store, &clock(), "", 300.0, "Campagna"),
        Err(CrmError::InvalidInput(_))
    ));
    assert!(matches!(
        CatalogService::add(&mut store, &clock(), "SEO", -1.0, "Campagna"),
        Err(CrmError::InvalidInput(_))
    ));
    assert!(store.services.is_empty());
}

#[test]
fn edit_changes_price_and_description() {
    let mut store = empty_store();
    let id = CatalogService::add(&mut store, &clock(), "SEO", 300.0, "Base").unwrap();
    CatalogService::edit(&mut store, &clock(), id, "SEO", 450.0, "Avanzata").unwrap();
    let service = CatalogService::get(&store, id).unwrap();
    assert_eq!(service.price, 450.0);
    assert_eq!(service.description, "Avanzata");
}

#[test]
fn remove_cascades_subscriptions() {
    let (mut store, client, service) = store_with_client_and_service();
    SubscriptionService::subscribe(
        &mut store,
        &clock(),
        client,
        SubscriptionTerms::new(service, 1400.0, date(2024, 1, 1)),
    )
    .unwrap();
    assert_eq!(CatalogService::remove(&mut store, &clock(), service).unwrap(), 1);
    assert!(store.subscriptions.is_empty());
    assert_eq!(store.clients.len(), 1);
}
