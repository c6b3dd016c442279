use assert_cmd::Command;
use assert_fs::{prelude::*, TempDir};
use predicates::{
    prelude::{predicate, PredicateBooleanExt},
    str::contains,
};
use regex::Regex;

fn script(home: &TempDir, input: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("crm_ledger_cli")
        .unwrap()
        .env("CRM_LEDGER_CLI_SCRIPT", "1")
        .env("CRM_LEDGER_HOME", home.path())
        .env("RUST_LOG", "off")
        .write_stdin(input.to_string())
        .assert()
}

#[test]
fn script_mode_runs_basic_flow() {
    let home = TempDir::new().unwrap();
    let input = "\
client add \"Studio Rossi\" email=info@rossi.it city=Torino
service add Hosting 120 Managed hosting
subscribe \"Studio Rossi\" Hosting start=2024-01-10 end=2024-06-30
ledger set \"Studio Rossi/Hosting\" notes_2024_1=\"setup done\" hours_worked_2024_1=6 amount_paid_2024_2=abc
ledger show \"Studio Rossi/Hosting\"
save
exit
";

    let output = script(&home, input)
        .success()
        .stdout(
            contains("Client `Studio Rossi` added")
                .and(contains("Subscription"))
                .and(contains("created with 6 monthly entries"))
                .and(contains("Invalid value"))
                .and(contains("Monthly details saved (2 field(s))."))
                .and(contains("January 2024"))
                .and(contains("Store `default` saved")),
        )
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    let created = Regex::new(r"Subscription ([0-9a-f]{8}) created").unwrap();
    assert!(created.is_match(&stdout), "missing subscription id in:\n{stdout}");

    let store_file = home.child("stores/default.json");
    store_file.assert(predicate::path::exists());
    let json = std::fs::read_to_string(store_file.path()).unwrap();
    assert!(json.contains("\"Studio Rossi\""));
    assert!(json.contains("setup done"));
}

#[test]
fn date_change_reports_discarded_months() {
    let home = TempDir::new().unwrap();
    let input = "\
client add Acme
service add SEO 300 Search optimisation
subscribe Acme SEO start=2024-01-01 end=2024-03-31
ledger set Acme/SEO amount_paid_2024_2=300
subscription edit Acme/SEO start=2024-02-01
ledger show Acme/SEO 2024-01
exit
";

    script(&home, input).success().stdout(
        contains("Subscription")
            .and(contains("updated"))
            .and(contains("Ledger regenerated with 2 monthly entries."))
            .and(contains("Recorded values were reset for: 2024-02"))
            .and(contains("has no ledger entry for 2024-01")),
    );
}

#[test]
fn demo_data_and_unknown_commands() {
    let home = TempDir::new().unwrap();
    let input = "\
demo
clinet list
ledger show \"Azienda Alpha/Sviluppo Sito Web\" 2023-01
exit
";

    script(&home, input).success().stdout(
        contains("Demo data loaded: 2 clients, 2 services, 2 subscriptions.")
            .and(contains("Unknown command `clinet`"))
            .and(contains("Suggestion: `client`?"))
            .and(contains("January 2023")),
    );
}

#[test]
fn named_store_backups_and_restore() {
    let home = TempDir::new().unwrap();
    let input = "\
client add First
save office
client add Second
save office
backups office
restore 1 office
client list
exit
";

    script(&home, input).success().stdout(
        contains("Store `office` saved")
            .and(contains("Backups of `office`:"))
            .and(contains("restored from backup"))
            .and(contains("First")),
    );

    let json = std::fs::read_to_string(home.child("stores/office.json").path()).unwrap();
    assert!(json.contains("First"));
    assert!(!json.contains("Second"));
    let config = std::fs::read_to_string(home.child("config.json").path()).unwrap();
    assert!(config.contains("\"office\""));
}

#[test]
fn config_changes_persist() {
    let home = TempDir::new().unwrap();
    script(&home, "config set currency usd\nconfig set backup_retention 0\nexit\n")
        .success()
        .stdout(contains("`currency` set to `usd`.").and(contains("Configuration error")));

    home.child("config.json").assert(predicate::path::is_file());
    let config = std::fs::read_to_string(home.child("config.json").path()).unwrap();
    assert!(config.contains("\"USD\""));
}

#[test]
fn help_groups_commands_and_aliases_dispatch() {
    let home = TempDir::new().unwrap();
    let input = "\
help
help quit
clients add Alias
sub list Alias
quit
client add Late
";

    script(&home, input).success().stdout(
        contains("Subscriptions and ledgers:")
            .and(contains("Stores and backups:"))
            .and(contains("Help: exit"))
            .and(contains("Aliases: quit"))
            .and(contains("Client `Alias` added"))
            .and(contains("No subscriptions for this client."))
            .and(contains("Client `Late` added").not()),
    );
}
