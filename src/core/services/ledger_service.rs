//! Reads and bulk updates of a subscription's monthly ledger.

use tracing::info;
use uuid::Uuid;

use crate::core::{
    clock::Clock,
    errors::{CrmError, Result},
    store::CrmStore,
};
use crate::ledger::{LedgerEntry, LedgerUpdate, MonthKey, UpdateReport};

pub struct LedgerService;

impl LedgerService {
    /// Saves a batch of monthly notes, hours and amounts.
    ///
    /// Only a missing subscription fails the call. Per-field problems and months
    /// outside the ledger come back in the [`UpdateReport`].
    pub fn save_monthly_notes(
        store: &mut CrmStore,
        clock: &dyn Clock,
        subscription_id: Uuid,
        update: &LedgerUpdate,
    ) -> Result<UpdateReport> {
        let subscription = store
            .subscription_mut(subscription_id)
            .ok_or_else(|| CrmError::SubscriptionNotFound(subscription_id.to_string()))?;
        let report = subscription.ledger.apply_updates(update);
        info!(
            subscription = %subscription_id,
            applied = report.applied,
            failures = report.failures.len(),
            unmatched = report.unmatched.len(),
            "monthly details saved"
        );
        if report.applied > 0 {
            store.touch(clock.now());
        }
        Ok(report)
    }

    /// Ledger entries in chronological order.
    pub fn entries(store: &CrmStore, subscription_id: Uuid) -> Result<&[LedgerEntry]> {
        store
            .subscription(subscription_id)
            .map(|sub| sub.ledger.entries())
            .ok_or_else(|| CrmError::SubscriptionNotFound(subscription_id.to_string()))
    }

    /// Looks up one month. An unknown month is `Ok(None)`, an unknown subscription an error.
    pub fn find_entry(
        store: &CrmStore,
        subscription_id: Uuid,
        key: MonthKey,
    ) -> Result<Option<&LedgerEntry>> {
        store
            .subscription(subscription_id)
            .map(|sub| sub.ledger.find_entry(key))
            .ok_or_else(|| CrmError::SubscriptionNotFound(subscription_id.to_string()))
    }
}
