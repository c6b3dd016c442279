#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::{NaiveDate, Utc};
use crm_ledger::{
    core::{
        clock::FixedClock,
        services::{CatalogService, ClientService},
        store::CrmStore,
    },
    domain::ClientDetails,
    locale::LocaleConfig,
    storage::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Clock pinned to 6 August 2024.
pub fn clock() -> FixedClock {
    FixedClock::new(date(2024, 8, 6))
}

/// A fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// JSON storage rooted in an isolated directory.
pub fn setup_storage(retention: usize) -> JsonStorage {
    JsonStorage::new(Some(temp_base()), Some(retention)).expect("create json storage backend")
}

/// Store holding one client and one 800/month catalog service.
pub fn store_with_client_and_service() -> (CrmStore, Uuid, Uuid) {
    let clock = clock();
    let mut store = CrmStore::new("test", LocaleConfig::default(), Utc::now());
    let client = ClientService::add(&mut store, &clock, "Acme", ClientDetails::default())
        .expect("add client");
    let service = CatalogService::add(&mut store, &clock, "Hosting", 800.0, "Managed hosting")
        .expect("add service");
    (store, client, service)
}
