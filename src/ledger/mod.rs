//! Monthly billing ledger: month enumeration, entries, and the bulk update protocol.

pub mod entry;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod months;
pub mod update;

pub use entry::LedgerEntry;
pub use ledger::{InvalidLedger, LedgerTotals, Regeneration, SubscriptionLedger};
pub use months::{enumerate_months, MonthKey, MonthSpan};
pub use update::{
    decode_field_name, encode_field_name, parse_field_number, FieldFailure, FieldRejection,
    FieldUpdate, LedgerField, LedgerUpdate, UpdateReport,
};
