pub mod json_backend;

use crate::core::{errors::Result, store::CrmStore};

/// Persistence backend for named CRM stores and their backups.
pub trait StorageBackend: Send + Sync {
    fn save(&self, store: &CrmStore, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<CrmStore>;
    /// Backup file names for `name`, newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn backup(&self, store: &CrmStore, name: &str, note: Option<&str>) -> Result<String>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<CrmStore>;
}

pub use json_backend::{store_warnings, JsonStorage};
