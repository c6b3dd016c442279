pub mod client;
pub mod ledger;
pub mod service;
pub mod store;
pub mod subscription;
pub mod system;

use crate::cli::registry::{CommandEntry, CommandRegistry};

const ROOT_COMMAND_ORDER: &[&str] = &[
    "client",
    "service",
    "subscribe",
    "subscription",
    "ledger",
    "demo",
    "save",
    "load",
    "backup",
    "backups",
    "restore",
    "config",
    "help",
    "version",
    "exit",
];

pub(crate) fn all_entries() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(client::definitions());
    commands.extend(service::definitions());
    commands.extend(subscription::definitions());
    commands.extend(ledger::definitions());
    commands.extend(store::definitions());
    commands.extend(system::definitions());
    commands
}

/// Builds the shell's registry in help order.
pub(crate) fn registry() -> CommandRegistry {
    let mut entries = all_entries();
    entries.sort_by_key(|entry| {
        ROOT_COMMAND_ORDER
            .iter()
            .position(|name| entry.name.eq_ignore_ascii_case(name))
            .unwrap_or(ROOT_COMMAND_ORDER.len())
    });
    CommandRegistry::from_entries(entries)
}
