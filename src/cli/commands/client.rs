use crate::cli::args::{parse_assignments, short_id};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandSection};
use crate::cli::selectors;
use crate::cli::table::{Table, TableColumn, TableRenderer};
use crate::core::services::{ClientService, SubscriptionService};
use crate::domain::{ClientDetails, Displayable};
use crate::locale::{format_amount, format_date};

const USAGE: &str = "client add <name> [field=value ...]
client list
client show <client>
client edit <client> [name=<new name>] [field=value ...]
client remove <client>
fields: contact email phone vat_id address city zip sdi_code agent call_center";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "client",
        CommandSection::Records,
        "Add, list, show, edit or remove clients",
        USAGE,
        cmd_client,
    )
    .with_aliases(&["clients"])]
}

fn cmd_client(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(sub) = args.first() else {
        return Err(CommandError::usage("client <add|list|show|edit|remove>"));
    };
    match sub.to_lowercase().as_str() {
        "add" => add(context, &args[1..]),
        "list" => list(context),
        "show" => show(context, &args[1..]),
        "edit" => edit(context, &args[1..]),
        "remove" | "delete" => remove(context, &args[1..]),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown client subcommand `{}`",
            other
        ))),
    }
}

fn apply_details(details: &mut ClientDetails, args: &[&str]) -> Result<Option<String>, CommandError> {
    let mut rename = None;
    for (key, value) in parse_assignments(args)? {
        if key == "name" {
            rename = Some(value.to_string());
        } else if !details.set(&key, value.trim()) {
            return Err(CommandError::InvalidArguments(format!(
                "unknown client field `{key}`"
            )));
        }
    }
    Ok(rename)
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(name) = args.first() else {
        return Err(CommandError::usage("client add <name> [field=value ...]"));
    };
    let mut details = ClientDetails::default();
    if apply_details(&mut details, &args[1..])?.is_some() {
        return Err(CommandError::InvalidArguments(
            "the client name is the first argument, not name=".into(),
        ));
    }
    let id = context.with_store_mut(|store, clock| ClientService::add(store, clock, name, details))?;
    output::success(format!("Client `{}` added ({}).", name.trim(), short_id(id)));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let table = context.with_store(|store| {
        let mut table = Table::new(
            Some("Clients"),
            vec![
                TableColumn::new("Id", 8),
                TableColumn::new("Name", 28),
                TableColumn::new("City", 16),
                TableColumn::new("Subs", 4).right(),
                TableColumn::new("Email", 24),
            ],
        );
        for client in ClientService::list(store) {
            table.add_row(vec![
                short_id(client.id),
                client.name.clone(),
                client.details.city.clone(),
                store.subscriptions_for_client(client.id).count().to_string(),
                client.details.email.clone(),
            ]);
        }
        Ok(table)
    })?;
    if table.is_empty() {
        output::info("No clients yet. Use `client add <name>` or `demo`.");
        return Ok(());
    }
    TableRenderer::render(&table);
    Ok(())
}

fn show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(selector) = args.first() else {
        return Err(CommandError::usage("client show <client>"));
    };
    let currency = context.currency().to_string();
    context.with_store(|store| {
        let id = selectors::client_id(store, selector)?;
        let client = ClientService::get(store, id)?;
        output::section(format!("Client: {}", client.name));
        output::info(format!("  {:<12} {}", "id", client.id));
        for (field, value) in client.details.filled() {
            output::info(format!("  {:<12} {}", field, value));
        }
        let subscriptions = SubscriptionService::list_for_client(store, id)?;
        if subscriptions.is_empty() {
            output::info("  No subscriptions.");
            return Ok(());
        }
        output::info("  Subscriptions:");
        for view in subscriptions {
            let sub = view.subscription;
            let end = sub
                .end_date
                .map(format_date)
                .unwrap_or_else(|| "open-ended".into());
            output::info(format!(
                "    {} {} at {} from {} to {} ({} months)",
                short_id(sub.id),
                view.service.name,
                format_amount(&store.locale, sub.subscribed_price, &currency),
                format_date(sub.start_date),
                end,
                sub.ledger.len()
            ));
        }
        Ok(())
    })
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(selector) = args.first() else {
        return Err(CommandError::usage(
            "client edit <client> [name=<new name>] [field=value ...]",
        ));
    };
    let (id, mut name, mut details) = context.with_store(|store| {
        let id = selectors::client_id(store, selector)?;
        let client = ClientService::get(store, id)?;
        Ok((id, client.name.clone(), client.details.clone()))
    })?;
    if let Some(rename) = apply_details(&mut details, &args[1..])? {
        name = rename;
    }
    context.with_store_mut(|store, clock| ClientService::edit(store, clock, id, &name, details))?;
    output::success(format!("Client `{}` updated.", name.trim()));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(selector) = args.first() else {
        return Err(CommandError::usage("client remove <client>"));
    };
    let (id, name, subscriptions) = context.with_store(|store| {
        let id = selectors::client_id(store, selector)?;
        let client = ClientService::get(store, id)?;
        Ok((id, client.display_label(), store.subscriptions_for_client(id).count()))
    })?;
    let prompt = format!(
        "Remove client `{}` and its {} subscription(s)?",
        name, subscriptions
    );
    if !context.confirm(&prompt)? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    let dropped = context.with_store_mut(|store, clock| ClientService::remove(store, clock, id))?;
    output::success(format!(
        "Client `{}` removed along with {} subscription(s).",
        name, dropped
    ));
    Ok(())
}
