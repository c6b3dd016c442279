pub mod catalog_service;
pub mod client_service;
pub mod ledger_service;
pub mod subscription_service;

pub use catalog_service::CatalogService;
pub use client_service::ClientService;
pub use ledger_service::LedgerService;
pub use subscription_service::{EditOutcome, SubscriptionService, SubscriptionView};

#[cfg(test)]
mod tests;
