use chrono::NaiveDate;

use crate::cli::args::{parse_amount, parse_assignments, parse_date, parse_optional_date, short_id};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandSection};
use crate::cli::selectors;
use crate::cli::table::{Table, TableColumn, TableRenderer};
use crate::core::services::{CatalogService, SubscriptionService};
use crate::domain::SubscriptionTerms;
use crate::locale::{format_amount, format_date};

const SUBSCRIBE_USAGE: &str =
    "subscribe <client> <service> start=YYYY-MM-DD [end=YYYY-MM-DD] [price=<amount>] [notes=<text>]";

const SUBSCRIPTION_USAGE: &str = "subscription list <client>
subscription show <client>/<service>
subscription edit <client>/<service> [start=..] [end=..|end=none] [price=..] [notes=..] [service=..]
subscription remove <client>/<service>
a subscription may also be referenced by its id prefix";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "subscribe",
            CommandSection::Ledger,
            "Subscribe a client to a service and generate its monthly ledger",
            SUBSCRIBE_USAGE,
            cmd_subscribe,
        ),
        CommandEntry::new(
            "subscription",
            CommandSection::Ledger,
            "List, show, edit or remove a client's subscriptions",
            SUBSCRIPTION_USAGE,
            cmd_subscription,
        )
        .with_aliases(&["sub"]),
    ]
}

/// Term overrides parsed from `key=value` arguments.
#[derive(Default)]
struct TermArgs {
    start: Option<NaiveDate>,
    end: Option<Option<NaiveDate>>,
    price: Option<f64>,
    notes: Option<String>,
    service: Option<String>,
}

impl TermArgs {
    fn parse(args: &[&str]) -> Result<Self, CommandError> {
        let mut parsed = Self::default();
        for (key, value) in parse_assignments(args)? {
            match key.as_str() {
                "start" => parsed.start = Some(parse_date(value)?),
                "end" => parsed.end = Some(parse_optional_date(value)?),
                "price" => parsed.price = Some(parse_amount("price", value)?),
                "notes" => parsed.notes = Some(value.to_string()),
                "service" => parsed.service = Some(value.to_string()),
                other => {
                    return Err(CommandError::InvalidArguments(format!(
                        "unknown subscription field `{other}`"
                    )))
                }
            }
        }
        Ok(parsed)
    }
}

fn cmd_subscribe(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(CommandError::usage(SUBSCRIBE_USAGE));
    }
    let overrides = TermArgs::parse(&args[2..])?;
    if overrides.service.is_some() {
        return Err(CommandError::InvalidArguments(
            "the service is the second argument, not service=".into(),
        ));
    }
    let start = overrides
        .start
        .ok_or_else(|| CommandError::InvalidArguments("start=YYYY-MM-DD is required".into()))?;

    let (client_id, service_id, catalog_price) = context.with_store(|store| {
        let client = selectors::client_id(store, args[0])?;
        let service = selectors::service_id(store, args[1])?;
        Ok((client, service, CatalogService::get(store, service)?.price))
    })?;

    let mut terms = SubscriptionTerms::new(
        service_id,
        overrides.price.unwrap_or(catalog_price),
        start,
    );
    terms.end_date = overrides.end.flatten();
    terms.notes = overrides.notes.unwrap_or_default();

    let id = context.with_store_mut(|store, clock| {
        SubscriptionService::subscribe(store, clock, client_id, terms)
    })?;
    let months = context.with_store(|store| {
        Ok(store.subscription(id).map(|sub| sub.ledger.len()).unwrap_or(0))
    })?;
    output::success(format!(
        "Subscription {} created with {} monthly entries.",
        short_id(id),
        months
    ));
    Ok(())
}

fn cmd_subscription(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(sub) = args.first() else {
        return Err(CommandError::usage("subscription <list|show|edit|remove>"));
    };
    match sub.to_lowercase().as_str() {
        "list" => list(context, &args[1..]),
        "show" => show(context, &args[1..]),
        "edit" => edit(context, &args[1..]),
        "remove" | "delete" => remove(context, &args[1..]),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown subscription subcommand `{}`",
            other
        ))),
    }
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(selector) = args.first() else {
        return Err(CommandError::usage("subscription list <client>"));
    };
    let currency = context.currency().to_string();
    let table = context.with_store(|store| {
        let client_id = selectors::client_id(store, selector)?;
        let views = SubscriptionService::list_for_client(store, client_id)?;
        let title = views
            .first()
            .map(|view| format!("Subscriptions of {}", view.client.name))
            .unwrap_or_else(|| "Subscriptions".into());
        let mut table = Table::new(
            Some(title),
            vec![
                TableColumn::new("Id", 8),
                TableColumn::new("Service", 24),
                TableColumn::new("Price", 14).right(),
                TableColumn::new("Start", 10),
                TableColumn::new("End", 10),
                TableColumn::new("Months", 6).right(),
                TableColumn::new("Notes", 20),
            ],
        );
        for view in views {
            let sub = view.subscription;
            table.add_row(vec![
                short_id(sub.id),
                view.service.name.clone(),
                format_amount(&store.locale, sub.subscribed_price, &currency),
                format_date(sub.start_date),
                sub.end_date.map(format_date).unwrap_or_else(|| "open".into()),
                sub.ledger.len().to_string(),
                sub.notes.clone(),
            ]);
        }
        Ok(table)
    })?;
    if table.is_empty() {
        output::info("No subscriptions for this client.");
        return Ok(());
    }
    TableRenderer::render(&table);
    Ok(())
}

fn show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(selector) = args.first() else {
        return Err(CommandError::usage("subscription show <client>/<service>"));
    };
    let currency = context.currency().to_string();
    let today = context.clock.today();
    context.with_store(|store| {
        let (client_id, sub_id) = selectors::subscription_ids(store, selector)?;
        let view = SubscriptionService::view(store, client_id, sub_id)?;
        let sub = view.subscription;
        let totals = sub.ledger.totals();
        output::section(format!("{} / {}", view.client.name, view.service.name));
        output::info(format!("  {:<16} {}", "id", sub.id));
        output::info(format!(
            "  {:<16} {} (catalog {})",
            "price",
            format_amount(&store.locale, sub.subscribed_price, &currency),
            format_amount(&store.locale, view.service.price, &currency)
        ));
        output::info(format!("  {:<16} {}", "start", format_date(sub.start_date)));
        let end = match sub.end_date {
            Some(end) => format_date(end),
            None => format!("open-ended (through {})", format_date(sub.effective_end(today))),
        };
        output::info(format!("  {:<16} {}", "end", end));
        if !sub.notes.is_empty() {
            output::info(format!("  {:<16} {}", "notes", sub.notes));
        }
        output::info(format!("  {:<16} {}", "months", totals.months));
        output::info(format!("  {:<16} {:.2}", "hours worked", totals.hours_worked));
        output::info(format!("  {:<16} {:.2}", "estimated hours", totals.estimated_hours));
        output::info(format!(
            "  {:<16} {}",
            "amount paid",
            format_amount(&store.locale, totals.amount_paid, &currency)
        ));
        Ok(())
    })
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(selector) = args.first() else {
        return Err(CommandError::usage(
            "subscription edit <client>/<service> [start=..] [end=..] [price=..] [notes=..] [service=..]",
        ));
    };
    let overrides = TermArgs::parse(&args[1..])?;
    let (client_id, sub_id, terms, recorded) = context.with_store(|store| {
        let (client_id, sub_id) = selectors::subscription_ids(store, selector)?;
        let view = SubscriptionService::view(store, client_id, sub_id)?;
        let mut terms = view.subscription.terms();
        if let Some(service) = &overrides.service {
            terms.service_id = selectors::service_id(store, service)?;
        }
        if let Some(start) = overrides.start {
            terms.start_date = start;
        }
        if let Some(end) = overrides.end {
            terms.end_date = end;
        }
        if let Some(price) = overrides.price {
            terms.subscribed_price = price;
        }
        if let Some(notes) = &overrides.notes {
            terms.notes = notes.clone();
        }
        let recorded = view
            .subscription
            .ledger
            .entries()
            .iter()
            .filter(|entry| entry.has_activity())
            .count();
        Ok((client_id, sub_id, terms, recorded))
    })?;

    if recorded > 0 {
        let prompt = format!(
            "Editing resets the ledger and discards {} month(s) of recorded data. Continue?",
            recorded
        );
        if !context.confirm(&prompt)? {
            output::info("Operation cancelled.");
            return Ok(());
        }
    }

    let outcome = context.with_store_mut(|store, clock| {
        SubscriptionService::edit(store, clock, client_id, sub_id, terms)
    })?;
    output::success(format!("Subscription {} updated.", short_id(sub_id)));
    let regeneration = outcome.regeneration;
    output::info(format!(
        "Ledger regenerated with {} monthly entries.",
        regeneration.months
    ));
    if regeneration.lost_data() {
        let months: Vec<String> = regeneration
            .discarded
            .iter()
            .map(ToString::to_string)
            .collect();
        output::warning(format!(
            "Recorded values were reset for: {}",
            months.join(", ")
        ));
    }
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(selector) = args.first() else {
        return Err(CommandError::usage("subscription remove <client>/<service>"));
    };
    let (client_id, sub_id, label) = context.with_store(|store| {
        let (client_id, sub_id) = selectors::subscription_ids(store, selector)?;
        let view = SubscriptionService::view(store, client_id, sub_id)?;
        Ok((
            client_id,
            sub_id,
            format!("{} / {}", view.client.name, view.service.name),
        ))
    })?;
    if !context.confirm(&format!("Remove subscription `{}` and its ledger?", label))? {
        output::info("Operation cancelled.");
        return Ok(());
    }
    context.with_store_mut(|store, clock| {
        SubscriptionService::remove(store, clock, client_id, sub_id)
    })?;
    output::success(format!("Subscription `{}` removed.", label));
    Ok(())
}
