use chrono::NaiveDateTime;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandSection};
use crate::core::demo;
use crate::storage::{store_warnings, StorageBackend};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "demo",
            CommandSection::Store,
            "Load the sample clients, services and subscriptions",
            "demo",
            cmd_demo,
        ),
        CommandEntry::new(
            "save",
            CommandSection::Store,
            "Save the open store (optionally under a new name)",
            "save [name]",
            cmd_save,
        ),
        CommandEntry::new(
            "load",
            CommandSection::Store,
            "Open a saved store",
            "load [name]",
            cmd_load,
        )
        .with_aliases(&["open"]),
        CommandEntry::new(
            "backup",
            CommandSection::Store,
            "Write a timestamped backup of the open store",
            "backup [note]",
            cmd_backup,
        ),
        CommandEntry::new(
            "backups",
            CommandSection::Store,
            "List backups of a store, newest first",
            "backups [name]",
            cmd_backups,
        ),
        CommandEntry::new(
            "restore",
            CommandSection::Store,
            "Restore a store from a backup (by list index or file name fragment)",
            "restore <index|fragment> [name]",
            cmd_restore,
        ),
    ]
}

fn cmd_demo(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let empty = context.with_store(|store| {
        Ok(store.clients.is_empty() && store.services.is_empty())
    })?;
    if !empty {
        return Err(CommandError::InvalidArguments(
            "demo data can only be loaded into an empty store".into(),
        ));
    }
    context.with_store_mut(|store, clock| demo::seed(store, clock))?;
    let (clients, services, subscriptions) = context.with_store(|store| {
        Ok((
            store.clients.len(),
            store.services.len(),
            store.subscriptions.len(),
        ))
    })?;
    output::success(format!(
        "Demo data loaded: {} clients, {} services, {} subscriptions.",
        clients, services, subscriptions
    ));
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = match args.first() {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => context.store_name(),
    };
    let snapshot = context.store.write(|store| {
        store.name = name.clone();
        Ok(store.clone())
    })?;
    context.storage.save(&snapshot, &name)?;
    context.dirty = false;
    if context.config.store_name != name {
        context.config.store_name = name.clone();
        context.persist_config()?;
    }
    output::success(format!(
        "Store `{}` saved to {}.",
        name,
        context.storage.store_path(&name).display()
    ));
    Ok(())
}

fn confirm_discard(context: &ShellContext) -> Result<bool, CommandError> {
    if !context.dirty {
        return Ok(true);
    }
    context.confirm("The open store has unsaved changes. Discard them?")
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args
        .first()
        .map(|name| name.trim().to_string())
        .unwrap_or_else(|| context.store_name());
    if !confirm_discard(context)? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    let store = context.storage.load(&name)?;
    open_store(context, store, &name)?;
    output::success(format!("Store `{}` loaded.", name));
    Ok(())
}

fn open_store(
    context: &mut ShellContext,
    store: crate::core::store::CrmStore,
    name: &str,
) -> CommandResult {
    for warning in store_warnings(&store) {
        output::warning(warning);
    }
    let added = context.install_store(store)?;
    if added > 0 {
        output::info(format!(
            "Open-ended ledgers extended by {} month(s); save to keep them.",
            added
        ));
    }
    if context.config.store_name != name {
        context.config.store_name = name.to_string();
        context.persist_config()?;
    }
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = (!args.is_empty()).then(|| args.join(" "));
    let name = context.store_name();
    let snapshot = context.store.snapshot()?;
    let file = context.storage.backup(&snapshot, &name, note.as_deref())?;
    output::success(format!("Backup `{}` created.", file));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = args
        .first()
        .map(|name| name.to_string())
        .unwrap_or_else(|| context.store_name());
    let backups = context.storage.list_backups(&name)?;
    if backups.is_empty() {
        output::warning(format!("No backups available for `{}`.", name));
        return Ok(());
    }
    output::info(format!("Backups of `{}`:", name));
    for (idx, file) in backups.iter().enumerate() {
        output::info(format!("  {:>2}. {}", idx + 1, format_backup_label(file)));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(reference) = args.first() else {
        return Err(CommandError::usage("restore <index|fragment> [name]"));
    };
    let name = args
        .get(1)
        .map(|name| name.to_string())
        .unwrap_or_else(|| context.store_name());
    let backups = context.storage.list_backups(&name)?;
    let target = select_backup(&backups, reference)?;
    if !confirm_discard(context)?
        || !context.confirm(&format!("Restore `{}` from `{}`?", name, target))?
    {
        output::info("Operation cancelled.");
        return Ok(());
    }
    let store = context.storage.restore(&name, &target)?;
    open_store(context, store, &name)?;
    output::success(format!("Store `{}` restored from backup `{}`.", name, target));
    Ok(())
}

/// A 1-based list index or a unique fragment of the backup file name.
fn select_backup(backups: &[String], reference: &str) -> Result<String, CommandError> {
    if backups.is_empty() {
        return Err(CommandError::InvalidArguments(
            "no backups available to restore".into(),
        ));
    }
    if let Ok(index) = reference.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|idx| backups.get(idx))
            .cloned()
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!("backup index {} out of range", reference))
            });
    }
    let mut matches = backups.iter().filter(|file| file.contains(reference));
    match (matches.next(), matches.next()) {
        (Some(file), None) => Ok(file.clone()),
        (Some(_), Some(_)) => Err(CommandError::InvalidArguments(format!(
            "`{}` matches more than one backup",
            reference
        ))),
        _ => Err(CommandError::InvalidArguments(format!(
            "no backup matches `{}`",
            reference
        ))),
    }
}

fn format_backup_label(file_name: &str) -> String {
    let stem = file_name.trim_end_matches(".json");
    let parts: Vec<&str> = stem.split('_').collect();
    let created = parts.windows(2).find_map(|pair| {
        let time = pair[1].split('-').next()?;
        NaiveDateTime::parse_from_str(&format!("{}{}", pair[0], time), "%Y%m%d%H%M%S").ok()
    });
    match created {
        Some(at) => format!("{} (created {} UTC)", file_name, at.format("%Y-%m-%d %H:%M:%S")),
        None => file_name.to_string(),
    }
}
