use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandRegistry, CommandSection};

pub fn print_overview(registry: &CommandRegistry) {
    output::section("Available commands");
    for section in CommandSection::ALL {
        output::info(format!("{}:", section.title()));
        for entry in registry.in_section(section) {
            output::info(format!("  {:<14} {}", entry.name, entry.description));
        }
    }
    output::info("Use `help <command>` for details.");
}

pub fn print_command(entry: &CommandEntry) {
    output::section(format!("Help: {}", entry.name));
    output::info(format!("  Description: {}", entry.description));
    if !entry.aliases.is_empty() {
        output::info(format!("  Aliases: {}", entry.aliases.join(", ")));
    }
    for (idx, line) in entry.usage.lines().enumerate() {
        let label = if idx == 0 { "  Usage:" } else { "        " };
        output::info(format!("{label} {}", line.trim()));
    }
}
