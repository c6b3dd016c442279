//! Interactive and scripted command shell over a CRM store.

pub mod args;
pub mod commands;
pub mod core;
pub mod help;
pub mod output;
pub mod registry;
pub mod selectors;
pub(crate) mod shell;
pub mod table;

pub use shell::{run_cli, SCRIPT_ENV};
