use chrono::{Datelike, Duration};
use crm_ledger::{
    ledger::{
        encode_field_name, enumerate_months, LedgerField, LedgerUpdate, MonthKey,
        SubscriptionLedger,
    },
    locale::LocaleConfig,
};

mod common;
use common::date;

fn key(year: i32, month: u32) -> MonthKey {
    MonthKey::new(year, month).unwrap()
}

#[test]
fn enumerated_months_are_contiguous_and_bounded() {
    let locale = LocaleConfig::default();
    let start = date(2019, 11, 30);
    for offset in [0i64, 1, 27, 31, 59, 364, 366, 800] {
        let end = start + Duration::days(offset);
        let months = enumerate_months(start, end);

        assert_eq!(months.first(), Some(&MonthKey::from_date(start)));
        assert_eq!(months.last(), Some(&MonthKey::from_date(end)));
        for pair in months.windows(2) {
            assert_eq!(pair[0].succ(), pair[1]);
        }
        let expected = (end.year() - start.year()) * 12 + end.month() as i32
            - start.month() as i32
            + 1;
        assert_eq!(months.len() as i32, expected);

        let ledger = SubscriptionLedger::generate(start, Some(end), end, &locale);
        assert_eq!(ledger.len(), months.len());
    }
}

#[test]
fn reversed_interval_yields_empty_ledger() {
    let locale = LocaleConfig::default();
    assert!(enumerate_months(date(2024, 5, 1), date(2024, 4, 30)).is_empty());
    let ledger = SubscriptionLedger::generate(
        date(2024, 5, 1),
        Some(date(2024, 4, 30)),
        date(2024, 8, 6),
        &locale,
    );
    assert!(ledger.is_empty());
}

#[test]
fn month_names_follow_the_locale() {
    let ledger = SubscriptionLedger::generate(
        date(2023, 12, 1),
        Some(date(2024, 1, 31)),
        date(2024, 8, 6),
        &LocaleConfig::from_tag("it-IT"),
    );
    let labels: Vec<String> = ledger.entries().iter().map(|entry| entry.label()).collect();
    assert_eq!(labels, vec!["Dicembre 2023", "Gennaio 2024"]);
}

#[test]
fn form_batch_is_applied_field_by_field() {
    let locale = LocaleConfig::default();
    let mut ledger = SubscriptionLedger::generate(
        date(2024, 1, 10),
        Some(date(2024, 3, 5)),
        date(2024, 8, 6),
        &locale,
    );

    let form = vec![
        (encode_field_name(LedgerField::Notes, key(2024, 1)), "kickoff"),
        (encode_field_name(LedgerField::HoursWorked, key(2024, 1)), " 12.5 "),
        (encode_field_name(LedgerField::AmountPaid, key(2024, 2)), "1.200"),
        (encode_field_name(LedgerField::EstimatedHours, key(2024, 3)), "-4"),
        (encode_field_name(LedgerField::AmountPaid, key(2024, 4)), "90"),
        ("csrf_token".to_string(), "abc"),
    ];
    let update = LedgerUpdate::from_form(form);
    assert_eq!(update.ignored(), ["csrf_token".to_string()]);

    let report = ledger.apply_updates(&update);
    assert_eq!(report.applied, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].field, LedgerField::EstimatedHours);
    assert_eq!(report.unmatched, vec![key(2024, 4)]);

    let january = ledger.find_entry(key(2024, 1)).unwrap();
    assert_eq!(january.notes, "kickoff");
    assert_eq!(january.hours_worked, 12.5);
    // "1.200" parses as a plain decimal.
    assert_eq!(ledger.find_entry(key(2024, 2)).unwrap().amount_paid, 1.2);
    assert_eq!(ledger.find_entry(key(2024, 3)).unwrap().estimated_hours, 0.0);
}

#[test]
fn later_values_for_the_same_field_win() {
    let locale = LocaleConfig::default();
    let mut ledger = SubscriptionLedger::generate(
        date(2024, 1, 1),
        Some(date(2024, 1, 31)),
        date(2024, 8, 6),
        &locale,
    );
    let update = LedgerUpdate::new()
        .set(key(2024, 1), LedgerField::AmountPaid, "100")
        .set(key(2024, 1), LedgerField::AmountPaid, "150");
    let report = ledger.apply_updates(&update);
    assert!(report.is_clean());
    assert_eq!(ledger.find_entry(key(2024, 1)).unwrap().amount_paid, 150.0);
}

#[test]
fn extending_keeps_recorded_months() {
    let locale = LocaleConfig::default();
    let mut ledger = SubscriptionLedger::generate(date(2024, 1, 1), None, date(2024, 3, 1), &locale);
    ledger.apply_updates(&LedgerUpdate::new().set(key(2024, 2), LedgerField::Notes, "kept"));

    let added = ledger.extend_through(date(2024, 1, 1), date(2024, 6, 15), &locale);
    assert_eq!(added, 3);
    assert_eq!(ledger.last_month(), Some(key(2024, 6)));
    assert_eq!(ledger.find_entry(key(2024, 2)).unwrap().notes, "kept");
    assert_eq!(ledger.extend_through(date(2024, 1, 1), date(2024, 6, 30), &locale), 0);
}
