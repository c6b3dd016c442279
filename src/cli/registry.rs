use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Groups commands on the help page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSection {
    Records,
    Ledger,
    Store,
    Shell,
}

impl CommandSection {
    pub const ALL: [CommandSection; 4] = [
        CommandSection::Records,
        CommandSection::Ledger,
        CommandSection::Store,
        CommandSection::Shell,
    ];

    pub fn title(self) -> &'static str {
        match self {
            CommandSection::Records => "Clients and services",
            CommandSection::Ledger => "Subscriptions and ledgers",
            CommandSection::Store => "Stores and backups",
            CommandSection::Shell => "Shell",
        }
    }
}

pub struct CommandEntry {
    pub name: &'static str,
    pub section: CommandSection,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        section: CommandSection,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            section,
            aliases: &[],
            description,
            usage,
            handler,
        }
    }

    pub const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn answers_to(&self, word: &str) -> bool {
        self.name.eq_ignore_ascii_case(word)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(word))
    }
}

/// Top-level commands in help order. Lookups accept a name or an alias.
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    /// Later entries reusing a taken name or alias are dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = CommandEntry>) -> Self {
        let mut accepted: Vec<CommandEntry> = Vec::new();
        for entry in entries {
            let clash = accepted.iter().any(|existing| {
                existing.answers_to(entry.name)
                    || entry.aliases.iter().any(|alias| existing.answers_to(alias))
            });
            if !clash {
                accepted.push(entry);
            }
        }
        Self { entries: accepted }
    }

    pub fn find(&self, word: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.answers_to(word))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Names and aliases, for completion and suggestions.
    pub fn words(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries
            .iter()
            .flat_map(|entry| std::iter::once(entry.name).chain(entry.aliases.iter().copied()))
    }

    pub fn in_section(&self, section: CommandSection) -> impl Iterator<Item = &CommandEntry> + '_ {
        self.entries.iter().filter(move |entry| entry.section == section)
    }
}
