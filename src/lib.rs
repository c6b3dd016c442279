//! CRM Ledger tracks clients, the services they subscribe to, and a monthly
//! billing ledger per subscription (notes, hours worked, estimated hours and
//! amount paid for every calendar month the subscription spans).
//!
//! The [`ledger`] module holds the month arithmetic and the bulk update
//! protocol; [`core`] owns the store and the services that mutate it.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ledger;
pub mod locale;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT.call_once(|| {
        utils::init_tracing();
        tracing::debug!(version = env!("CARGO_PKG_VERSION"), "crm_ledger initialized");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
    }
}
