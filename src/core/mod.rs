pub mod clock;
pub mod demo;
pub mod errors;
pub mod services;
pub mod shared;
pub mod store;
pub mod utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{CrmError, Result};
pub use shared::SharedStore;
pub use store::CrmStore;
