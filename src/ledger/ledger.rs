use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::locale::LocaleConfig;

use super::{
    entry::LedgerEntry,
    months::{MonthKey, MonthSpan},
    update::{parse_field_number, FieldFailure, LedgerField, LedgerUpdate, UpdateReport},
};

/// Month-by-month billing ledger owned by one subscription.
///
/// Entries are strictly chronological with one entry per `(year, month)`.
/// Deserialization enforces that, so a hand-edited file cannot smuggle in
/// duplicates or out-of-order months.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<LedgerEntry>", into = "Vec<LedgerEntry>")]
pub struct SubscriptionLedger {
    entries: Vec<LedgerEntry>,
}

/// Why a stored entry sequence is not a valid ledger.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidLedger {
    #[error("ledger entry has invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("ledger entry {next} does not follow {previous}")]
    OutOfOrder { previous: MonthKey, next: MonthKey },
}

impl TryFrom<Vec<LedgerEntry>> for SubscriptionLedger {
    type Error = InvalidLedger;

    fn try_from(entries: Vec<LedgerEntry>) -> Result<Self, Self::Error> {
        let mut previous: Option<MonthKey> = None;
        for entry in &entries {
            let key = MonthKey::new(entry.year, entry.month).ok_or(InvalidLedger::InvalidMonth {
                year: entry.year,
                month: entry.month,
            })?;
            if let Some(previous) = previous {
                if key <= previous {
                    return Err(InvalidLedger::OutOfOrder { previous, next: key });
                }
            }
            previous = Some(key);
        }
        Ok(Self { entries })
    }
}

impl From<SubscriptionLedger> for Vec<LedgerEntry> {
    fn from(ledger: SubscriptionLedger) -> Self {
        ledger.entries
    }
}

/// Months whose recorded values were thrown away by a regeneration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Regeneration {
    pub months: usize,
    pub discarded: Vec<MonthKey>,
}

impl Regeneration {
    pub fn lost_data(&self) -> bool {
        !self.discarded.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LedgerTotals {
    pub months: usize,
    pub hours_worked: f64,
    pub estimated_hours: f64,
    pub amount_paid: f64,
}

impl SubscriptionLedger {
    /// Builds one default entry per month from `start` through `end`, or through
    /// `today` when the subscription is open-ended.
    pub fn generate(
        start: NaiveDate,
        end: Option<NaiveDate>,
        today: NaiveDate,
        locale: &LocaleConfig,
    ) -> Self {
        let effective_end = end.unwrap_or(today);
        let entries = MonthSpan::new(start, effective_end)
            .map(|key| LedgerEntry::new(key, locale))
            .collect();
        Self { entries }
    }

    /// Replaces every entry with a freshly generated one.
    ///
    /// Values recorded for months that survive the new range are not carried
    /// over; the returned [`Regeneration`] lists them.
    pub fn regenerate(
        &mut self,
        start: NaiveDate,
        end: Option<NaiveDate>,
        today: NaiveDate,
        locale: &LocaleConfig,
    ) -> Regeneration {
        let discarded: Vec<MonthKey> = self
            .entries
            .iter()
            .filter(|entry| entry.has_activity())
            .map(LedgerEntry::key)
            .collect();
        *self = Self::generate(start, end, today, locale);
        if !discarded.is_empty() {
            warn!(
                discarded = discarded.len(),
                "ledger regenerated; recorded monthly values were reset"
            );
        }
        Regeneration {
            months: self.entries.len(),
            discarded,
        }
    }

    /// Appends the months after the last entry up to `end`. Existing entries are untouched.
    ///
    /// An empty ledger has no anchor month and is filled from `start` instead.
    pub fn extend_through(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        locale: &LocaleConfig,
    ) -> usize {
        let span = match self.entries.last().map(LedgerEntry::key) {
            Some(last) => MonthSpan::after(last, end),
            None => MonthSpan::new(start, end),
        };
        let before = self.entries.len();
        self.entries
            .extend(span.map(|key| LedgerEntry::new(key, locale)));
        self.entries.len() - before
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first_month(&self) -> Option<MonthKey> {
        self.entries.first().map(LedgerEntry::key)
    }

    pub fn last_month(&self) -> Option<MonthKey> {
        self.entries.last().map(LedgerEntry::key)
    }

    pub fn find_entry(&self, key: MonthKey) -> Option<&LedgerEntry> {
        self.entries.iter().find(|entry| entry.key() == key)
    }

    pub fn find_entry_mut(&mut self, key: MonthKey) -> Option<&mut LedgerEntry> {
        self.entries.iter_mut().find(|entry| entry.key() == key)
    }

    /// Applies every update that targets a month of this ledger.
    ///
    /// Notes always apply. Numeric values that do not parse leave the field
    /// untouched and are reported; the rest of the batch still goes through.
    pub fn apply_updates(&mut self, update: &LedgerUpdate) -> UpdateReport {
        let mut report = UpdateReport::default();

        for change in update.iter() {
            let Some(entry) = self.find_entry_mut(change.key) else {
                if !report.unmatched.contains(&change.key) {
                    report.unmatched.push(change.key);
                }
                continue;
            };

            let target = match change.field {
                LedgerField::Notes => {
                    entry.notes = change.value.clone();
                    report.applied += 1;
                    continue;
                }
                LedgerField::HoursWorked => &mut entry.hours_worked,
                LedgerField::EstimatedHours => &mut entry.estimated_hours,
                LedgerField::AmountPaid => &mut entry.amount_paid,
            };

            match parse_field_number(&change.value) {
                Ok(value) => {
                    *target = value;
                    report.applied += 1;
                }
                Err(reason) => {
                    warn!(
                        month = %change.key,
                        field = change.field.form_prefix(),
                        value = change.value.as_str(),
                        "rejected ledger value"
                    );
                    report.failures.push(FieldFailure {
                        key: change.key,
                        field: change.field,
                        month_name: entry.month_name.clone(),
                        value: change.value.clone(),
                        reason,
                    });
                }
            }
        }

        report
    }

    pub fn totals(&self) -> LedgerTotals {
        self.entries
            .iter()
            .fold(LedgerTotals::default(), |mut totals, entry| {
                totals.months += 1;
                totals.hours_worked += entry.hours_worked;
                totals.estimated_hours += entry.estimated_hours;
                totals.amount_paid += entry.amount_paid;
                totals
            })
    }
}
