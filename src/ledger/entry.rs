use serde::{Deserialize, Serialize};

use crate::locale::LocaleConfig;

use super::months::MonthKey;

/// Billing record for exactly one calendar month of a subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub hours_worked: f64,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub amount_paid: f64,
}

impl LedgerEntry {
    /// Fresh entry for `key` with empty notes and zeroed billing fields.
    pub fn new(key: MonthKey, locale: &LocaleConfig) -> Self {
        Self {
            year: key.year,
            month: key.month,
            month_name: locale.month_name(key.month).to_string(),
            notes: String::new(),
            hours_worked: 0.0,
            estimated_hours: 0.0,
            amount_paid: 0.0,
        }
    }

    pub fn key(&self) -> MonthKey {
        MonthKey {
            year: self.year,
            month: self.month,
        }
    }

    /// `January 2023` style label.
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name, self.year)
    }

    /// True when any billing field was touched since the entry was created.
    pub fn has_activity(&self) -> bool {
        !self.notes.is_empty()
            || self.hours_worked != 0.0
            || self.estimated_hours != 0.0
            || self.amount_paid != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_has_defaults() {
        let key = MonthKey::new(2023, 4).unwrap();
        let entry = LedgerEntry::new(key, &LocaleConfig::default());
        assert_eq!(entry.key(), key);
        assert_eq!(entry.month_name, "April");
        assert_eq!(entry.label(), "April 2023");
        assert!(entry.notes.is_empty());
        assert_eq!(entry.hours_worked, 0.0);
        assert_eq!(entry.estimated_hours, 0.0);
        assert_eq!(entry.amount_paid, 0.0);
        assert!(!entry.has_activity());
    }

    #[test]
    fn activity_tracks_any_field() {
        let mut entry = LedgerEntry::new(MonthKey::new(2024, 1).unwrap(), &LocaleConfig::default());
        entry.estimated_hours = 4.0;
        assert!(entry.has_activity());
    }
}
