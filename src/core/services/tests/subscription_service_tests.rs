use uuid::Uuid;

use super::{clock, date, store_with_client_and_service};
use crate::core::clock::FixedClock;
use crate::core::errors::CrmError;
use crate::core::services::{CatalogService, LedgerService, SubscriptionService};
use crate::domain::SubscriptionTerms;
use crate::ledger::{LedgerField, LedgerUpdate, MonthKey};

fn yearly_terms(service: Uuid) -> SubscriptionTerms {
    SubscriptionTerms::new(service, 1400.0, date(2023, 1, 15))
        .ending(date(2023, 12, 31))
        .with_notes("Sconto annuale")
}

#[test]
fn subscribe_generates_ledger() {
    let (mut store, client, service) = store_with_client_and_service();
    let id = SubscriptionService::subscribe(&mut store, &clock(), client, yearly_terms(service))
        .unwrap();

    let view = SubscriptionService::view(&store, client, id).unwrap();
    assert_eq!(view.service.id, service);
    assert_eq!(view.subscription.ledger.len(), 12);
    assert_eq!(view.subscription.notes, "Sconto annuale");
}

#[test]
fn open_ended_subscription_runs_through_clock_date() {
    let (mut store, client, service) = store_with_client_and_service();
    let id = SubscriptionService::subscribe(
        &mut store,
        &clock(),
        client,
        SubscriptionTerms::new(service, 750.0, date(2024, 3, 1)),
    )
    .unwrap();
    let sub = store.subscription(id).unwrap();
    assert_eq!(sub.ledger.len(), 6);
    assert_eq!(sub.ledger.last_month(), MonthKey::new(2024, 8));
}

#[test]
fn unknown_client_or_service_is_not_found() {
    let (mut store, client, service) = store_with_client_and_service();
    let err = SubscriptionService::subscribe(
        &mut store,
        &clock(),
        Uuid::new_v4(),
        yearly_terms(service),
    )
    .unwrap_err();
    assert!(matches!(err, CrmError::ClientNotFound(_)));

    let err = SubscriptionService::subscribe(
        &mut store,
        &clock(),
        client,
        yearly_terms(Uuid::new_v4()),
    )
    .unwrap_err();
    assert!(matches!(err, CrmError::ServiceNotFound(_)));
}

#[test]
fn duplicate_subscription_is_rejected() {
    let (mut store, client, service) = store_with_client_and_service();
    SubscriptionService::subscribe(&mut store, &clock(), client, yearly_terms(service)).unwrap();
    let err = SubscriptionService::subscribe(&mut store, &clock(), client, yearly_terms(service))
        .unwrap_err();
    assert!(matches!(err, CrmError::DuplicateSubscription { .. }));
    assert_eq!(store.subscriptions.len(), 1);
}

#[test]
fn editing_dates_discards_recorded_months() {
    let (mut store, client, service) = store_with_client_and_service();
    let id = SubscriptionService::subscribe(&mut store, &clock(), client, yearly_terms(service))
        .unwrap();
    let june = MonthKey::new(2023, 6).unwrap();
    LedgerService::save_monthly_notes(
        &mut store,
        &clock(),
        id,
        &LedgerUpdate::new().set(june, LedgerField::AmountPaid, "1400"),
    )
    .unwrap();

    let outcome = SubscriptionService::edit(
        &mut store,
        &clock(),
        client,
        id,
        yearly_terms(service).ending(date(2024, 3, 31)),
    )
    .unwrap();

    let regeneration = outcome.regeneration;
    assert_eq!(regeneration.months, 15);
    assert_eq!(regeneration.discarded, vec![june]);
    let entry = LedgerService::find_entry(&store, id, june).unwrap().unwrap();
    assert_eq!(entry.amount_paid, 0.0);
}

#[test]
fn editing_price_only_resets_ledger() {
    let (mut store, client, service) = store_with_client_and_service();
    let id = SubscriptionService::subscribe(&mut store, &clock(), client, yearly_terms(service))
        .unwrap();
    let june = MonthKey::new(2023, 6).unwrap();
    LedgerService::save_monthly_notes(
        &mut store,
        &clock(),
        id,
        &LedgerUpdate::new().set(june, LedgerField::Notes, "ok"),
    )
    .unwrap();

    let mut terms = yearly_terms(service);
    terms.subscribed_price = 1200.0;
    let outcome = SubscriptionService::edit(&mut store, &clock(), client, id, terms).unwrap();
    assert_eq!(outcome.regeneration.months, 12);
    assert_eq!(outcome.regeneration.discarded, vec![june]);
    assert_eq!(store.subscription(id).unwrap().subscribed_price, 1200.0);
    let entry = LedgerService::find_entry(&store, id, june).unwrap().unwrap();
    assert!(entry.notes.is_empty());
}

#[test]
fn edit_rejects_switch_to_already_subscribed_service() {
    let (mut store, client, website) = store_with_client_and_service();
    let social = CatalogService::add(&mut store, &clock(), "Social", 800.0, "Campagne").unwrap();
    SubscriptionService::subscribe(&mut store, &clock(), client, yearly_terms(website)).unwrap();
    let second =
        SubscriptionService::subscribe(&mut store, &clock(), client, yearly_terms(social)).unwrap();

    let err = SubscriptionService::edit(&mut store, &clock(), client, second, yearly_terms(website))
        .unwrap_err();
    assert!(matches!(err, CrmError::InvalidInput(_)));
}

#[test]
fn view_of_foreign_subscription_is_not_found() {
    let (mut store, client, service) = store_with_client_and_service();
    let id = SubscriptionService::subscribe(&mut store, &clock(), client, yearly_terms(service))
        .unwrap();
    let err = SubscriptionService::view(&store, Uuid::new_v4(), id).unwrap_err();
    assert!(matches!(err, CrmError::ClientNotFound(_)));

    let other = crate::core::services::ClientService::add(
        &mut store,
        &clock(),
        "Beta",
        Default::default(),
    )
    .unwrap();
    let err = SubscriptionService::view(&store, other, id).unwrap_err();
    assert!(matches!(err, CrmError::SubscriptionNotFound(_)));
}

#[test]
fn remove_then_list_is_empty() {
    let (mut store, client, service) = store_with_client_and_service();
    let id = SubscriptionService::subscribe(&mut store, &clock(), client, yearly_terms(service))
        .unwrap();
    assert_eq!(SubscriptionService::list_for_client(&store, client).unwrap().len(), 1);
    SubscriptionService::remove(&mut store, &clock(), client, id).unwrap();
    assert!(SubscriptionService::list_for_client(&store, client)
        .unwrap()
        .is_empty());
    assert!(matches!(
        SubscriptionService::remove(&mut store, &clock(), client, id),
        Err(CrmError::SubscriptionNotFound(_))
    ));
}

#[test]
fn roll_forward_extends_open_ended_only() {
    let (mut store, client, service) = store_with_client_and_service();
    let social = CatalogService::add(&mut store, &clock(), "Social", 800.0, "Campagne").unwrap();
    let fixed = SubscriptionService::subscribe(&mut store, &clock(), client, yearly_terms(service))
        .unwrap();
    let open = SubscriptionService::subscribe(
        &mut store,
        &clock(),
        client,
        SubscriptionTerms::new(social, 750.0, date(2024, 3, 1)),
    )
    .unwrap();

    let later = FixedClock::new(date(2024, 11, 2));
    assert_eq!(SubscriptionService::roll_forward(&mut store, &later), 3);
    assert_eq!(store.subscription(open).unwrap().ledger.len(), 9);
    assert_eq!(store.subscription(fixed).unwrap().ledger.len(), 12);
    assert_eq!(SubscriptionService::roll_forward(&mut store, &later), 0);
}

#[test]
fn roll_forward_fills_ledger_once_future_start_arrives() {
    let (mut store, client, service) = store_with_client_and_service();
    let id = SubscriptionService::subscribe(
        &mut store,
        &clock(),
        client,
        SubscriptionTerms::new(service, 750.0, date(2024, 10, 1)),
    )
    .unwrap();
    assert!(store.subscription(id).unwrap().ledger.is_empty());
    assert_eq!(SubscriptionService::roll_forward(&mut store, &clock()), 0);

    let later = FixedClock::new(date(2025, 2, 10));
    assert_eq!(SubscriptionService::roll_forward(&mut store, &later), 5);
    let ledger = &store.subscription(id).unwrap().ledger;
    assert_eq!(ledger.first_month(), MonthKey::new(2024, 10));
    assert_eq!(ledger.last_month(), MonthKey::new(2025, 2));
}
