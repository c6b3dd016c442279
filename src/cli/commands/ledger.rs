use std::sync::Arc;

use crate::cli::args::short_id;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandSection};
use crate::cli::selectors;
use crate::cli::table::{Table, TableColumn, TableRenderer};
use crate::core::services::{LedgerService, SubscriptionService};
use crate::ledger::{LedgerEntry, LedgerUpdate, MonthKey};
use crate::locale::{format_amount, format_number, LocaleConfig};

const USAGE: &str = "ledger show <client>/<service> [YYYY-MM]
ledger set <client>/<service> <field>_<year>_<month>=<value> ...
ledger refresh
fields: notes hours_worked estimated_hours amount_paid";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "ledger",
        CommandSection::Ledger,
        "Show or update a subscription's monthly ledger",
        USAGE,
        cmd_ledger,
    )]
}

fn cmd_ledger(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(sub) = args.first() else {
        return Err(CommandError::usage("ledger <show|set|refresh>"));
    };
    match sub.to_lowercase().as_str() {
        "show" => show(context, &args[1..]),
        "set" => set(context, &args[1..]),
        "refresh" => refresh(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown ledger subcommand `{}`",
            other
        ))),
    }
}

fn parse_month(input: &str) -> Result<MonthKey, CommandError> {
    input
        .split_once('-')
        .and_then(|(year, month)| MonthKey::new(year.parse().ok()?, month.parse().ok()?))
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!("invalid month `{input}` (use YYYY-MM)"))
        })
}

fn show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(selector) = args.first() else {
        return Err(CommandError::usage("ledger show <client>/<service> [YYYY-MM]"));
    };
    let month = args.get(1).map(|raw| parse_month(raw)).transpose()?;
    let currency = context.currency().to_string();

    context.with_store(|store| {
        let (client_id, sub_id) = selectors::subscription_ids(store, selector)?;
        let view = SubscriptionService::view(store, client_id, sub_id)?;
        let locale = &store.locale;

        if let Some(key) = month {
            let Some(entry) = LedgerService::find_entry(store, sub_id, key)? else {
                output::warning(format!(
                    "{} has no ledger entry for {}.",
                    short_id(sub_id),
                    key
                ));
                return Ok(());
            };
            print_entry(entry, locale, &currency);
            return Ok(());
        }

        let mut table = Table::new(
            Some(format!("Ledger {} / {}", view.client.name, view.service.name)),
            vec![
                TableColumn::new("Month", 16),
                TableColumn::new("Hours", 8).right(),
                TableColumn::new("Estimated", 9).right(),
                TableColumn::new("Paid", 14).right(),
                TableColumn::new("Notes", 24),
            ],
        );
        for entry in LedgerService::entries(store, sub_id)? {
            table.add_row(vec![
                entry.label(),
                format_number(locale, entry.hours_worked, 2),
                format_number(locale, entry.estimated_hours, 2),
                format_amount(locale, entry.amount_paid, &currency),
                entry.notes.clone(),
            ]);
        }
        let totals = view.subscription.ledger.totals();
        table.add_row(vec![
            format!("Total ({} months)", totals.months),
            format_number(locale, totals.hours_worked, 2),
            format_number(locale, totals.estimated_hours, 2),
            format_amount(locale, totals.amount_paid, &currency),
            String::new(),
        ]);
        TableRenderer::render(&table);
        Ok(())
    })
}

fn print_entry(entry: &LedgerEntry, locale: &LocaleConfig, currency: &str) {
    output::section(entry.label());
    output::info(format!("  {:<16} {}", "notes", entry.notes));
    output::info(format!(
        "  {:<16} {}",
        "hours worked",
        format_number(locale, entry.hours_worked, 2)
    ));
    output::info(format!(
        "  {:<16} {}",
        "estimated hours",
        format_number(locale, entry.estimated_hours, 2)
    ));
    output::info(format!(
        "  {:<16} {}",
        "amount paid",
        format_amount(locale, entry.amount_paid, currency)
    ));
}

/// Applies `field_year_month=value` pairs the same way a submitted web form would.
fn set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(CommandError::usage(
            "ledger set <client>/<service> <field>_<year>_<month>=<value> ...",
        ));
    }
    let mut pairs = Vec::with_capacity(args.len() - 1);
    for arg in &args[1..] {
        let (name, value) = arg.split_once('=').ok_or_else(|| {
            CommandError::InvalidArguments(format!("expected <field>_<year>_<month>=<value>, got `{arg}`"))
        })?;
        pairs.push((name, value));
    }
    let update = LedgerUpdate::from_form(pairs);
    for name in update.ignored() {
        output::warning(format!("Ignored `{}`: not a ledger field.", name));
    }

    let sub_id = context.with_store(|store| {
        let (client_id, sub_id) = selectors::subscription_ids(store, args[0])?;
        SubscriptionService::view(store, client_id, sub_id)?;
        Ok(sub_id)
    })?;
    if update.is_empty() {
        output::info("Nothing to update.");
        return Ok(());
    }
    let report = context.with_store_mut(|store, clock| {
        LedgerService::save_monthly_notes(store, clock, sub_id, &update)
    })?;

    for failure in &report.failures {
        output::error(format!("Invalid value: {}", failure));
    }
    for key in &report.unmatched {
        output::warning(format!("No ledger entry for {}; values skipped.", key));
    }
    if report.applied > 0 {
        output::success(format!("Monthly details saved ({} field(s)).", report.applied));
    } else if report.is_clean() {
        output::info("No fields changed.");
    }
    Ok(())
}

fn refresh(context: &mut ShellContext) -> CommandResult {
    let clock = Arc::clone(&context.clock);
    let added = context
        .store
        .write(|store| Ok(SubscriptionService::roll_forward(store, clock.as_ref())))?;
    if added == 0 {
        output::info("All open-ended ledgers are up to date.");
        return Ok(());
    }
    context.dirty = true;
    output::success(format!("Added {} month(s) to open-ended ledgers.", added));
    Ok(())
}
