//! Typed records for clients, catalog services and subscriptions.

pub mod client;
pub mod common;
pub mod service;
pub mod subscription;

pub use client::{Client, ClientDetails};
pub use common::{Displayable, Identifiable, NamedEntity};
pub use service::Service;
pub use subscription::{Subscription, SubscriptionTerms};
