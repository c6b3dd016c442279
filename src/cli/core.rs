//! Shell context, dispatch, and error reporting shared by every command.

use std::{io, path::PathBuf, sync::Arc};

use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use tracing::warn;

use crate::{
    config::{Config, ConfigManager},
    core::{
        clock::{Clock, SystemClock},
        errors::CrmError,
        services::SubscriptionService,
        shared::SharedStore,
        store::CrmStore,
        utils::PathResolver,
    },
    storage::{JsonStorage, StorageBackend},
};

use super::commands;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CrmError),
    #[error("line editor failed: {0}")]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Command(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] CrmError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl CommandError {
    pub(crate) fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {usage}"))
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            CommandError::Io(inner) => CliError::Io(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

/// Runtime state of one shell session: the open store, where it is saved,
/// and the user's preferences.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub store: SharedStore,
    pub clock: Arc<dyn Clock>,
    pub storage: JsonStorage,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub theme: ColorfulTheme,
    /// Unsaved changes since the last save or load.
    pub dirty: bool,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base(mode, PathResolver::base_dir(), Arc::new(SystemClock))
    }

    /// Builds a context rooted at `base`, opening the configured store when it exists.
    pub fn with_base(mode: CliMode, base: PathBuf, clock: Arc<dyn Clock>) -> Result<Self, CliError> {
        let registry = commands::registry();

        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load()?;
        let storage = JsonStorage::new(Some(base), Some(config.backup_retention))?;
        let store = CrmStore::new(
            config.store_name.clone(),
            config.locale_config(),
            clock.now(),
        );

        let mut context = ShellContext {
            mode,
            registry,
            store: SharedStore::new(store),
            clock,
            storage,
            config_manager,
            config,
            theme: ColorfulTheme::default(),
            dirty: false,
            last_command: None,
            running: true,
        };
        context.open_configured_store();
        Ok(context)
    }

    fn open_configured_store(&mut self) {
        let name = self.config.store_name.clone();
        if !self.storage.exists(&name) {
            return;
        }
        match self.storage.load(&name) {
            Ok(store) => {
                if let Err(err) = self.install_store(store) {
                    warn!(store = name.as_str(), error = %err, "could not open store");
                }
            }
            Err(err) => {
                warn!(store = name.as_str(), error = %err, "could not open store");
                output::warning(format!(
                    "Store `{}` could not be loaded ({}); starting empty.",
                    name, err
                ));
            }
        }
    }

    /// Replaces the open store and brings open-ended ledgers up to today.
    pub(crate) fn install_store(&mut self, store: CrmStore) -> Result<usize, CommandError> {
        self.store.replace(store)?;
        let clock = Arc::clone(&self.clock);
        let added = self
            .store
            .write(|store| Ok(SubscriptionService::roll_forward(store, clock.as_ref())))?;
        self.dirty = added > 0;
        Ok(added)
    }

    pub(crate) fn with_store<T>(
        &self,
        f: impl FnOnce(&CrmStore) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        self.store.read(f)?
    }

    /// Runs a mutation against the open store and marks the session dirty on success.
    pub(crate) fn with_store_mut<T>(
        &mut self,
        f: impl FnOnce(&mut CrmStore, &dyn Clock) -> Result<T, CrmError>,
    ) -> Result<T, CommandError> {
        let clock = Arc::clone(&self.clock);
        let value = self.store.write(|store| f(store, clock.as_ref()))?;
        self.dirty = true;
        Ok(value)
    }

    pub(crate) fn store_name(&self) -> String {
        self.config.store_name.clone()
    }

    pub(crate) fn currency(&self) -> &str {
        &self.config.currency
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn prompt(&self) -> String {
        let marker = if self.dirty { "*" } else { "" };
        format!("crm[{}{}]> ", self.config.store_name, marker)
    }

    pub(crate) fn command(&self, word: &str) -> Option<&CommandEntry> {
        self.registry.find(word)
    }

    /// Names and aliases offered by tab completion.
    pub(crate) fn command_words(&self) -> Vec<&'static str> {
        self.registry.words().collect()
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.find(command).map(|entry| entry.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        if raw.starts_with('#') {
            return Ok(LoopControl::Continue);
        }

        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.last_command = Some(line.trim().to_string());

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        let needle = input.to_lowercase();
        let best = self
            .registry
            .words()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    /// Asks before a destructive step. Script mode always proceeds.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        match self.mode {
            CliMode::Script => Ok(true),
            CliMode::Interactive => self.ask(prompt),
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script || !self.dirty {
            return Ok(true);
        }
        self.ask("There are unsaved changes. Exit anyway?")
    }

    fn ask(&self, prompt: &str) -> Result<bool, CommandError> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(CommandError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(err) if err.is_not_found() => {
                output::warning(err);
                Ok(())
            }
            CommandError::Core(CrmError::LockPoisoned) => Err(CliError::Core(CrmError::LockPoisoned)),
            other => {
                output::error(other);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    base: &std::path::Path,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    use crate::core::clock::FixedClock;
    use chrono::NaiveDate;

    let today = NaiveDate::from_ymd_opt(2024, 8, 6)
        .ok_or_else(|| CliError::Command("invalid test date".into()))?;
    let mut context = ShellContext::with_base(
        CliMode::Script,
        base.to_path_buf(),
        Arc::new(FixedClock::new(today)),
    )?;
    for line in lines {
        match context.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(context)
}
