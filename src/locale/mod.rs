//! Locale-aware display helpers: month names, numbers, amounts and dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const IT_MONTHS: [&str; 12] = [
    "Gennaio",
    "Febbraio",
    "Marzo",
    "Aprile",
    "Maggio",
    "Giugno",
    "Luglio",
    "Agosto",
    "Settembre",
    "Ottobre",
    "Novembre",
    "Dicembre",
];

/// Language families with their own month-name table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MonthNames {
    English,
    Italian,
}

impl MonthNames {
    fn table(self) -> &'static [&'static str; 12] {
        match self {
            MonthNames::English => &EN_MONTHS,
            MonthNames::Italian => &IT_MONTHS,
        }
    }
}

/// Locale-aware formatting preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub month_names: MonthNames,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language_tag: "en-US".into(),
            decimal_separator: '.',
            grouping_separator: ',',
            month_names: MonthNames::English,
        }
    }
}

impl LocaleConfig {
    /// Resolves a BCP-47 style tag. Unknown languages fall back to English conventions.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "it" => Self {
                language_tag: tag.to_string(),
                decimal_separator: ',',
                grouping_separator: '.',
                month_names: MonthNames::Italian,
            },
            _ => Self {
                language_tag: tag.to_string(),
                ..Self::default()
            },
        }
    }

    /// Display name of a calendar month (1..=12). Out-of-range months render as `?`.
    pub fn month_name(&self, month: u32) -> &'static str {
        month
            .checked_sub(1)
            .and_then(|idx| self.month_names.table().get(idx as usize))
            .copied()
            .unwrap_or("?")
    }
}

pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let body = format!("{:.*}", precision as usize, value.abs());
    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body.as_str(), None),
    };

    let mut out = String::new();
    if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, locale.grouping_separator));
    if let Some(frac) = frac_part {
        out.push(locale.decimal_separator);
        out.push_str(frac);
    }
    out
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats a monetary amount with two decimals followed by the currency code.
pub fn format_amount(locale: &LocaleConfig, amount: f64, currency: &str) -> String {
    format!("{} {}", format_number(locale, amount, 2), currency.to_uppercase())
}

/// Day-first date rendering used across the CRM screens.
pub fn format_date(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_follow_language() {
        let en = LocaleConfig::default();
        let it = LocaleConfig::from_tag("it-IT");
        assert_eq!(en.month_name(1), "January");
        assert_eq!(it.month_name(8), "Agosto");
        assert_eq!(it.month_name(13), "?");
        assert_eq!(en.month_name(0), "?");
    }

    #[test]
    fn unknown_tag_falls_back_to_english() {
        let locale = LocaleConfig::from_tag("fr-FR");
        assert_eq!(locale.language_tag, "fr-FR");
        assert_eq!(locale.month_name(3), "March");
        assert_eq!(locale.decimal_separator, '.');
    }

    #[test]
    fn numbers_group_thousands() {
        let en = LocaleConfig::default();
        let it = LocaleConfig::from_tag("it");
        assert_eq!(format_number(&en, 1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(&it, 1400.0, 2), "1.400,00");
        assert_eq!(format_number(&en, -750.5, 1), "-750.5");
        assert_eq!(format_number(&en, 12.0, 0), "12");
    }

    #[test]
    fn amounts_and_dates() {
        let en = LocaleConfig::default();
        assert_eq!(format_amount(&en, 1500.0, "eur"), "1,500.00 EUR");
        let date = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(format_date(date), "05/01/2023");
    }
}
