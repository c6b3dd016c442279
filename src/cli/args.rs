//! Argument parsing shared by command handlers.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::cli::core::CommandError;

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

/// `none`, `open` or an empty value clear an optional date.
pub(crate) fn parse_optional_date(input: &str) -> Result<Option<NaiveDate>, CommandError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "none" | "open" | "-" => Ok(None),
        _ => parse_date(input).map(Some),
    }
}

pub(crate) fn parse_amount(label: &str, input: &str) -> Result<f64, CommandError> {
    let value: f64 = input.trim().parse().map_err(|_| {
        CommandError::InvalidArguments(format!("{label} must be a number, got `{input}`"))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(CommandError::InvalidArguments(format!(
            "{label} must be a non-negative number, got `{input}`"
        )));
    }
    Ok(value)
}

/// Splits `key=value` arguments. Keys are lowercased; values keep their case.
pub(crate) fn parse_assignments<'a>(args: &[&'a str]) -> Result<Vec<(String, &'a str)>, CommandError> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .filter(|(key, _)| !key.trim().is_empty())
                .map(|(key, value)| (key.trim().to_ascii_lowercase(), value))
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!("expected key=value, got `{arg}`"))
                })
        })
        .collect()
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_and_open_end() {
        assert_eq!(
            parse_date("2023-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
        );
        assert!(parse_date("15/01/2023").is_err());
        assert_eq!(parse_optional_date("none").unwrap(), None);
    }

    #[test]
    fn amounts_must_be_non_negative() {
        assert_eq!(parse_amount("price", " 1400.5 ").unwrap(), 1400.5);
        assert!(parse_amount("price", "-1").is_err());
        assert!(parse_amount("price", "abc").is_err());
    }

    #[test]
    fn assignments_split_on_first_equals() {
        let parsed = parse_assignments(&["Notes=a=b", "city=Torino"]).unwrap();
        assert_eq!(parsed[0], ("notes".to_string(), "a=b"));
        assert!(parse_assignments(&["=x"]).is_err());
        assert!(parse_assignments(&["plain"]).is_err());
    }
}
