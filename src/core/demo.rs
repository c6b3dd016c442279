//! Sample data set: two clients, two catalog services, two subscriptions.

use chrono::NaiveDate;

use crate::core::{
    clock::Clock,
    errors::{CrmError, Result},
    services::{CatalogService, ClientService, SubscriptionService},
    store::CrmStore,
};
use crate::domain::{ClientDetails, SubscriptionTerms};

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CrmError::InvalidInput(format!("invalid date {year}-{month}-{day}")))
}

fn details(pairs: &[(&str, &str)]) -> ClientDetails {
    let mut details = ClientDetails::default();
    for (field, value) in pairs {
        details.set(field, *value);
    }
    details
}

/// Loads the sample records into `store`. Fails if any of them already exist.
pub fn seed(store: &mut CrmStore, clock: &dyn Clock) -> Result<()> {
    let alpha = ClientService::add(
        store,
        clock,
        "Azienda Alpha",
        details(&[
            ("contact", "Mario Rossi"),
            ("email", "mario.rossi@alpha.it"),
            ("phone", "011-1234567"),
            ("vat_id", "IT12345678901"),
            ("address", "Via Roma 10"),
            ("city", "Torino"),
            ("zip", "10121"),
            ("sdi_code", "ABCDEFG"),
            ("agent", "Giuseppe Verdi"),
            ("call_center", "Call Center Nord"),
        ]),
    )?;
    ClientService::add(
        store,
        clock,
        "Beta S.r.l.",
        details(&[
            ("contact", "Giulia Bianchi"),
            ("email", "giulia.bianchi@beta.it"),
            ("phone", "022-9876543"),
            ("vat_id", "IT98765432109"),
            ("address", "Corso Sempione 5"),
            ("city", "Milano"),
            ("zip", "20145"),
            ("sdi_code", "HIJKLMN"),
            ("agent", "Anna Neri"),
            ("call_center", "Call Center Sud"),
        ]),
    )?;

    let website = CatalogService::add(
        store,
        clock,
        "Sviluppo Sito Web",
        1500.0,
        "Creazione di un sito web responsivo.",
    )?;
    let social = CatalogService::add(
        store,
        clock,
        "Campagna Social Media",
        800.0,
        "Gestione di profili social e campagne pubblicitarie.",
    )?;

    SubscriptionService::subscribe(
        store,
        clock,
        alpha,
        SubscriptionTerms::new(website, 1400.0, date(2023, 1, 15)?)
            .ending(date(2023, 12, 31)?)
            .with_notes("Sconto applicato per l'anno intero."),
    )?;
    SubscriptionService::subscribe(
        store,
        clock,
        alpha,
        SubscriptionTerms::new(social, 750.0, date(2023, 3, 1)?)
            .with_notes("Contratto a tempo indeterminato."),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::core::clock::FixedClock;
    use crate::locale::LocaleConfig;

    #[test]
    fn seed_builds_sample_ledgers() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 8, 6).unwrap());
        let mut store = CrmStore::new("demo", LocaleConfig::default(), Utc::now());
        seed(&mut store, &clock).unwrap();

        assert_eq!(store.clients.len(), 2);
        assert_eq!(store.services.len(), 2);
        assert_eq!(store.subscriptions.len(), 2);
        assert_eq!(store.subscriptions[0].ledger.len(), 12);
        // March 2023 through August 2024.
        assert_eq!(store.subscriptions[1].ledger.len(), 18);
    }

    #[test]
    fn seeding_twice_is_rejected() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 8, 6).unwrap());
        let mut store = CrmStore::new("demo", LocaleConfig::default(), Utc::now());
        seed(&mut store, &clock).unwrap();
        assert!(seed(&mut store, &clock).is_err());
    }
}
