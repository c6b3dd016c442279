use crate::cli::args::{parse_amount, parse_assignments, short_id};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandSection};
use crate::cli::selectors;
use crate::cli::table::{Table, TableColumn, TableRenderer};
use crate::core::services::CatalogService;
use crate::domain::Displayable;
use crate::locale::format_amount;

const USAGE: &str = "service add <name> <price> <description>
service list
service edit <service> [name=<name>] [price=<price>] [description=<text>]
service remove <service>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "service",
        CommandSection::Records,
        "Manage the service catalog",
        USAGE,
        cmd_service,
    )
    .with_aliases(&["services"])]
}

fn cmd_service(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(sub) = args.first() else {
        return Err(CommandError::usage("service <add|list|edit|remove>"));
    };
    match sub.to_lowercase().as_str() {
        "add" => add(context, &args[1..]),
        "list" => list(context),
        "edit" => edit(context, &args[1..]),
        "remove" | "delete" => remove(context, &args[1..]),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown service subcommand `{}`",
            other
        ))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(CommandError::usage("service add <name> <price> <description>"));
    }
    let name = args[0];
    let price = parse_amount("price", args[1])?;
    let description = args[2..].join(" ");
    let id = context.with_store_mut(|store, clock| {
        CatalogService::add(store, clock, name, price, &description)
    })?;
    output::success(format!("Service `{}` added ({}).", name.trim(), short_id(id)));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let currency = context.currency().to_string();
    let table = context.with_store(|store| {
        let mut table = Table::new(
            Some("Services"),
            vec![
                TableColumn::new("Id", 8),
                TableColumn::new("Name", 26),
                TableColumn::new("Price", 14).right(),
                TableColumn::new("Description", 30),
            ],
        );
        for service in CatalogService::list(store) {
            table.add_row(vec![
                short_id(service.id),
                service.name.clone(),
                format_amount(&store.locale, service.price, &currency),
                service.description.clone(),
            ]);
        }
        Ok(table)
    })?;
    if table.is_empty() {
        output::info("The catalog is empty. Use `service add` or `demo`.");
        return Ok(());
    }
    TableRenderer::render(&table);
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(selector) = args.first() else {
        return Err(CommandError::usage(
            "service edit <service> [name=<name>] [price=<price>] [description=<text>]",
        ));
    };
    let (id, mut name, mut price, mut description) = context.with_store(|store| {
        let id = selectors::service_id(store, selector)?;
        let service = CatalogService::get(store, id)?;
        Ok((id, service.name.clone(), service.price, service.description.clone()))
    })?;
    for (key, value) in parse_assignments(&args[1..])? {
        match key.as_str() {
            "name" => name = value.to_string(),
            "price" => price = parse_amount("price", value)?,
            "description" => description = value.to_string(),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown service field `{other}`"
                )))
            }
        }
    }
    context.with_store_mut(|store, clock| {
        CatalogService::edit(store, clock, id, &name, price, &description)
    })?;
    output::success(format!("Service `{}` updated.", name.trim()));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(selector) = args.first() else {
        return Err(CommandError::usage("service remove <service>"));
    };
    let (id, name, subscriptions) = context.with_store(|store| {
        let id = selectors::service_id(store, selector)?;
        let service = CatalogService::get(store, id)?;
        let subscriptions = store
            .subscriptions
            .iter()
            .filter(|sub| sub.service_id == id)
            .count();
        Ok((id, service.display_label(), subscriptions))
    })?;
    let prompt = format!(
        "Remove service `{}` and {} subscription(s) to it?",
        name, subscriptions
    );
    if !context.confirm(&prompt)? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    let dropped = context.with_store_mut(|store, clock| CatalogService::remove(store, clock, id))?;
    output::success(format!(
        "Service `{}` removed along with {} subscription(s).",
        name, dropped
    ));
    Ok(())
}
