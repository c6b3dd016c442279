//! Bulk update protocol for subscription ledgers.
//!
//! Web-style forms post one flat `<field>_<year>_<month>` name per value. The
//! edge decodes those names into [`FieldUpdate`] records so the ledger itself
//! only ever sees structured keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::months::MonthKey;

/// Mutable billing fields of a ledger entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LedgerField {
    Notes,
    HoursWorked,
    EstimatedHours,
    AmountPaid,
}

impl LedgerField {
    pub const ALL: [LedgerField; 4] = [
        LedgerField::Notes,
        LedgerField::HoursWorked,
        LedgerField::EstimatedHours,
        LedgerField::AmountPaid,
    ];

    /// Prefix used in flat form field names.
    pub fn form_prefix(self) -> &'static str {
        match self {
            LedgerField::Notes => "notes",
            LedgerField::HoursWorked => "hours_worked",
            LedgerField::EstimatedHours => "estimated_hours",
            LedgerField::AmountPaid => "amount_paid",
        }
    }

    /// Accepts the canonical prefixes plus the short `note`/`hours` spellings older forms posted.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "notes" | "note" => Some(LedgerField::Notes),
            "hours_worked" | "hours" => Some(LedgerField::HoursWorked),
            "estimated_hours" => Some(LedgerField::EstimatedHours),
            "amount_paid" => Some(LedgerField::AmountPaid),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, LedgerField::Notes)
    }

    pub fn label(self) -> &'static str {
        match self {
            LedgerField::Notes => "notes",
            LedgerField::HoursWorked => "hours worked",
            LedgerField::EstimatedHours => "estimated hours",
            LedgerField::AmountPaid => "amount paid",
        }
    }
}

impl fmt::Display for LedgerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn encode_field_name(field: LedgerField, key: MonthKey) -> String {
    format!("{}_{}_{}", field.form_prefix(), key.year, key.month)
}

/// Recovers `(field, month)` from a `<field>_<year>_<month>` name.
pub fn decode_field_name(name: &str) -> Option<(LedgerField, MonthKey)> {
    let mut parts = name.trim().rsplitn(3, '_');
    let month = parts.next()?.parse::<u32>().ok()?;
    let year = parts.next()?.parse::<i32>().ok()?;
    let field = LedgerField::from_prefix(parts.next()?)?;
    let key = MonthKey::new(year, month)?;
    Some((field, key))
}

/// One value destined for one field of one month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldUpdate {
    pub key: MonthKey,
    pub field: LedgerField,
    pub value: String,
}

/// Ordered batch of field updates. Later updates to the same field win.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerUpdate {
    updates: Vec<FieldUpdate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ignored: Vec<String>,
}

impl LedgerUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: MonthKey, field: LedgerField, value: impl Into<String>) -> Self {
        self.push(key, field, value);
        self
    }

    pub fn push(&mut self, key: MonthKey, field: LedgerField, value: impl Into<String>) {
        self.updates.push(FieldUpdate {
            key,
            field,
            value: value.into(),
        });
    }

    /// Decodes a flat name/value form. Names that are not ledger fields are set aside.
    pub fn from_form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut update = Self::new();
        for (name, value) in pairs {
            let name = name.as_ref();
            match decode_field_name(name) {
                Some((field, key)) => update.push(key, field, value),
                None => {
                    debug!(field = name, "ignoring form field outside the ledger protocol");
                    update.ignored.push(name.to_string());
                }
            }
        }
        update
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldUpdate> {
        self.updates.iter()
    }

    /// Form names that did not decode into a ledger field.
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Why a numeric field value was refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldRejection {
    #[error("is not a valid number")]
    NotANumber,
    #[error("must be a finite number")]
    NotFinite,
    #[error("cannot be negative")]
    Negative,
}

/// Parses a numeric billing value submitted as text.
pub fn parse_field_number(raw: &str) -> Result<f64, FieldRejection> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| FieldRejection::NotANumber)?;
    if !value.is_finite() {
        return Err(FieldRejection::NotFinite);
    }
    if value < 0.0 {
        return Err(FieldRejection::Negative);
    }
    Ok(value)
}

/// A single field that could not be applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldFailure {
    pub key: MonthKey,
    pub field: LedgerField,
    pub month_name: String,
    pub value: String,
    pub reason: FieldRejection,
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for {} {}: `{}` {}",
            self.field, self.month_name, self.key.year, self.value, self.reason
        )
    }
}

/// Outcome of applying a [`LedgerUpdate`]; partial success is normal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateReport {
    pub applied: usize,
    pub failures: Vec<FieldFailure>,
    pub unmatched: Vec<MonthKey>,
}

impl UpdateReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.unmatched.is_empty()
    }
}
