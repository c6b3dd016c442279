use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandSection};
use crate::core::store::CURRENT_SCHEMA_VERSION;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "config",
            CommandSection::Shell,
            "Show or change preferences",
            "config [show]\nconfig set <locale|currency|store_name|backup_retention> <value>",
            cmd_config,
        ),
        CommandEntry::new(
            "help",
            CommandSection::Shell,
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new(
            "version",
            CommandSection::Shell,
            "Show build metadata",
            "version",
            cmd_version,
        ),
        CommandEntry::new(
            "exit",
            CommandSection::Shell,
            "Exit the shell",
            "exit",
            cmd_exit,
        )
        .with_aliases(&["quit"]),
    ]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        output::section("Configuration");
        for (key, value) in context.config.entries() {
            output::info(format!("  {:<18} {}", key, value));
        }
        output::info(format!(
            "  {:<18} {}",
            "file",
            context.config_manager.path().display()
        ));
        return Ok(());
    }
    if !args[0].eq_ignore_ascii_case("set") || args.len() < 3 {
        return Err(CommandError::usage(
            "config set <locale|currency|store_name|backup_retention> <value>",
        ));
    }
    let key = args[1].to_lowercase();
    let value = args[2..].join(" ");
    let mut updated = context.config.clone();
    updated.set(&key, &value)?;
    context.config = updated;
    context.persist_config()?;

    if key == "locale" {
        let locale = context.config.locale_config();
        context.with_store_mut(|store, _| {
            store.locale = locale;
            Ok(())
        })?;
        output::info("New ledger months use the updated month names.");
    }
    if key == "backup_retention" {
        output::info("The new retention applies from the next session.");
    }
    output::success(format!("`{}` set to `{}`.", key, value.trim()));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.command(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        }
        return Ok(());
    }
    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("CRM Ledger {}", meta.version));
    output::info(format!("  Schema ver   : v{}", CURRENT_SCHEMA_VERSION));
    output::info(format!(
        "  Build hash   : {} ({})",
        meta.git_hash, meta.git_status
    ));
    output::info(format!("  Built at     : {}", meta.timestamp));
    output::info(format!("  Target       : {}", meta.target));
    output::info(format!("  Profile      : {}", meta.profile));
    output::info(format!("  Rustc        : {}", meta.rustc));
    Ok(())
}

fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.dirty {
        if !context.confirm_exit()? {
            return Ok(());
        }
        output::warning("Exiting with unsaved changes.");
    }
    Err(CommandError::ExitRequested)
}
