use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::common::*,
    ledger::{Regeneration, SubscriptionLedger},
    locale::LocaleConfig,
};

/// Editable terms of a client's subscription to a service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionTerms {
    pub service_id: Uuid,
    pub subscribed_price: f64,
    pub start_date: NaiveDate,
    /// `None` keeps the subscription open-ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl SubscriptionTerms {
    pub fn new(service_id: Uuid, subscribed_price: f64, start_date: NaiveDate) -> Self {
        Self {
            service_id,
            subscribed_price,
            start_date,
            end_date: None,
            notes: String::new(),
        }
    }

    pub fn ending(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// A client's subscription to a service, with its monthly billing ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: Uuid,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub subscribed_price: f64,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub ledger: SubscriptionLedger,
}

impl Subscription {
    /// Creates the subscription and generates its ledger through `today` when open-ended.
    pub fn new(
        client_id: Uuid,
        terms: SubscriptionTerms,
        today: NaiveDate,
        locale: &LocaleConfig,
    ) -> Self {
        let ledger =
            SubscriptionLedger::generate(terms.start_date, terms.end_date, today, locale);
        Self {
            id: Uuid::new_v4(),
            client_id,
            service_id: terms.service_id,
            subscribed_price: terms.subscribed_price,
            start_date: terms.start_date,
            end_date: terms.end_date,
            notes: terms.notes,
            ledger,
        }
    }

    pub fn is_open_ended(&self) -> bool {
        self.end_date.is_none()
    }

    pub fn effective_end(&self, today: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or(today)
    }

    pub fn terms(&self) -> SubscriptionTerms {
        SubscriptionTerms {
            service_id: self.service_id,
            subscribed_price: self.subscribed_price,
            start_date: self.start_date,
            end_date: self.end_date,
            notes: self.notes.clone(),
        }
    }

    /// Applies new terms and rebuilds the ledger from them.
    ///
    /// Every edit regenerates, so each month's recorded values are reset even
    /// when the date range is unchanged.
    pub fn apply_terms(
        &mut self,
        terms: SubscriptionTerms,
        today: NaiveDate,
        locale: &LocaleConfig,
    ) -> Regeneration {
        self.service_id = terms.service_id;
        self.subscribed_price = terms.subscribed_price;
        self.start_date = terms.start_date;
        self.end_date = terms.end_date;
        self.notes = terms.notes;
        self.ledger
            .regenerate(self.start_date, self.end_date, today, locale)
    }
}

impl Identifiable for Subscription {
    fn id(&self) -> Uuid {
        self.id
    }
}
