mod catalog_service_tests;
mod subscription_service_tests;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::core::{clock::FixedClock, store::CrmStore};
use crate::core::services::{CatalogService, ClientService};
use crate::domain::ClientDetails;
use crate::locale::LocaleConfig;

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(super) fn clock() -> FixedClock {
    FixedClock::new(date(2024, 8, 6))
}

pub(super) fn empty_store() -> CrmStore {
    CrmStore::new("test", LocaleConfig::default(), Utc::now())
}

/// Store with one client and one catalog service.
pub(super) fn store_with_client_and_service() -> (CrmStore, Uuid, Uuid) {
    let mut store = empty_store();
    let clock = clock();
    let client = ClientService::add(&mut store, &clock, "Azienda Alpha", ClientDetails::default())
        .unwrap();
    let service =
        CatalogService::add(&mut store, &clock, "Sviluppo Sito Web", 1500.0, "Sito").unwrap();
    (store, client, service)
}
