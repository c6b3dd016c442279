//! Client subscriptions: creation, edits with ledger regeneration, and views.

use tracing::{info, warn};
use uuid::Uuid;

use crate::core::{
    clock::Clock,
    errors::{CrmError, Result},
    store::CrmStore,
};
use crate::domain::{Client, Service, Subscription, SubscriptionTerms};
use crate::ledger::Regeneration;

/// A subscription together with the records it points at.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionView<'a> {
    pub client: &'a Client,
    pub service: &'a Service,
    pub subscription: &'a Subscription,
}

/// Result of editing a subscription's terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOutcome {
    /// The rebuilt ledger's size and the months whose values were reset.
    pub regeneration: Regeneration,
}

pub struct SubscriptionService;

impl SubscriptionService {
    /// Subscribes a client to a catalog service and generates its monthly ledger.
    ///
    /// A client holds at most one subscription per service.
    pub fn subscribe(
        store: &mut CrmStore,
        clock: &dyn Clock,
        client_id: Uuid,
        terms: SubscriptionTerms,
    ) -> Result<Uuid> {
        let client = store
            .client(client_id)
            .ok_or_else(|| CrmError::ClientNotFound(client_id.to_string()))?;
        let service = store
            .service(terms.service_id)
            .ok_or_else(|| CrmError::ServiceNotFound(terms.service_id.to_string()))?;
        Self::validate_terms(&terms)?;
        if store
            .subscriptions
            .iter()
            .any(|sub| sub.client_id == client_id && sub.service_id == terms.service_id)
        {
            return Err(CrmError::DuplicateSubscription {
                client: client.name.clone(),
                service: service.name.clone(),
            });
        }

        let subscription = Subscription::new(client_id, terms, clock.today(), &store.locale);
        let id = subscription.id;
        info!(
            subscription = %id,
            client = %client_id,
            months = subscription.ledger.len(),
            "subscription created"
        );
        store.subscriptions.push(subscription);
        store.touch(clock.now());
        Ok(id)
    }

    /// Replaces the terms of a client's subscription.
    ///
    /// Any edit rebuilds the ledger from scratch; values recorded for the old
    /// months are not migrated.
    pub fn edit(
        store: &mut CrmStore,
        clock: &dyn Clock,
        client_id: Uuid,
        subscription_id: Uuid,
        terms: SubscriptionTerms,
    ) -> Result<EditOutcome> {
        Self::validate_terms(&terms)?;
        if store.client(client_id).is_none() {
            return Err(CrmError::ClientNotFound(client_id.to_string()));
        }
        if store.service(terms.service_id).is_none() {
            return Err(CrmError::ServiceNotFound(terms.service_id.to_string()));
        }
        let clash = store.subscriptions.iter().any(|sub| {
            sub.id != subscription_id
                && sub.client_id == client_id
                && sub.service_id == terms.service_id
        });

        let locale = store.locale.clone();
        let subscription = Self::owned_mut(store, client_id, subscription_id)?;
        if clash {
            return Err(CrmError::InvalidInput(
                "client already has another subscription to that service".into(),
            ));
        }
        let regeneration = subscription.apply_terms(terms, clock.today(), &locale);
        if regeneration.lost_data() {
            warn!(
                subscription = %subscription_id,
                months = ?regeneration.discarded,
                "subscription edit discarded recorded monthly values"
            );
        }
        info!(subscription = %subscription_id, "subscription edited");
        store.touch(clock.now());
        Ok(EditOutcome { regeneration })
    }

    pub fn remove(
        store: &mut CrmStore,
        clock: &dyn Clock,
        client_id: Uuid,
        subscription_id: Uuid,
    ) -> Result<()> {
        let before = store.subscriptions.len();
        store
            .subscriptions
            .retain(|sub| !(sub.id == subscription_id && sub.client_id == client_id));
        if store.subscriptions.len() == before {
            return Err(CrmError::SubscriptionNotFound(subscription_id.to_string()));
        }
        info!(subscription = %subscription_id, "subscription removed");
        store.touch(clock.now());
        Ok(())
    }

    pub fn view(
        store: &CrmStore,
        client_id: Uuid,
        subscription_id: Uuid,
    ) -> Result<SubscriptionView<'_>> {
        let client = store
            .client(client_id)
            .ok_or_else(|| CrmError::ClientNotFound(client_id.to_string()))?;
        let subscription = store
            .subscription(subscription_id)
            .filter(|sub| sub.client_id == client_id)
            .ok_or_else(|| CrmError::SubscriptionNotFound(subscription_id.to_string()))?;
        let service = store
            .service(subscription.service_id)
            .ok_or_else(|| CrmError::ServiceNotFound(subscription.service_id.to_string()))?;
        Ok(SubscriptionView {
            client,
            service,
            subscription,
        })
    }

    /// Subscriptions of a client whose service still exists, in creation order.
    pub fn list_for_client(store: &CrmStore, client_id: Uuid) -> Result<Vec<SubscriptionView<'_>>> {
        let client = store
            .client(client_id)
            .ok_or_else(|| CrmError::ClientNotFound(client_id.to_string()))?;
        Ok(store
            .subscriptions_for_client(client_id)
            .filter_map(|subscription| {
                store
                    .service(subscription.service_id)
                    .map(|service| SubscriptionView {
                        client,
                        service,
                        subscription,
                    })
            })
            .collect())
    }

    /// Extends every open-ended ledger through today without touching recorded months.
    ///
    /// A ledger still empty because its start was in the future fills in from the start date.
    pub fn roll_forward(store: &mut CrmStore, clock: &dyn Clock) -> usize {
        let today = clock.today();
        let locale = store.locale.clone();
        let added: usize = store
            .subscriptions
            .iter_mut()
            .filter(|sub| sub.is_open_ended())
            .map(|sub| sub.ledger.extend_through(sub.start_date, today, &locale))
            .sum();
        if added > 0 {
            info!(months = added, "open-ended ledgers rolled forward");
            store.touch(clock.now());
        }
        added
    }

    fn owned_mut(
        store: &mut CrmStore,
        client_id: Uuid,
        subscription_id: Uuid,
    ) -> Result<&mut Subscription> {
        store
            .subscription_mut(subscription_id)
            .filter(|sub| sub.client_id == client_id)
            .ok_or_else(|| CrmError::SubscriptionNotFound(subscription_id.to_string()))
    }

    fn validate_terms(terms: &SubscriptionTerms) -> Result<()> {
        if !terms.subscribed_price.is_finite() || terms.subscribed_price < 0.0 {
            return Err(CrmError::InvalidInput(format!(
                "subscribed price must be a non-negative number, got {}",
                terms.subscribed_price
            )));
        }
        Ok(())
    }
}
