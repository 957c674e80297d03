//! Some utility functions

use std::error::Error;
use std::io::{stdout, Write};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer};

use crate::Todo;

/// The wire format of calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The current calendar date, in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(text: &str) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|err| format!("Invalid date {:?} (expected YYYY-MM-DD): {}", text, err).into())
}

/// Deserialize a calendar date that may be sent either as `YYYY-MM-DD` or as a full RFC3339 timestamp.
/// In the latter case, only the date part is kept.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&text, DATE_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.date_naive())
        .map_err(|_| serde::de::Error::custom(format!("invalid calendar date {:?}", text)))
}


/// Pretty-prints a list of to-dos, numbered from 1
pub fn print_todo_list(date: NaiveDate, todos: &[Todo]) {
    println!("---- Todos for {} ----", format_date(date));
    if todos.is_empty() {
        println!("    No todos for {}", format_date(date));
        return;
    }
    for (index, todo) in todos.iter().enumerate() {
        print_todo(index + 1, todo);
    }
}

pub fn print_todo(row: usize, todo: &Todo) {
    let completion = if todo.completed() { "✓" } else { " " };
    println!("  {:>3}. [{}] {}\t({})", row, completion, todo.title(), todo.id());
}

/// Print a prompt and flush it, so that it is displayed before the user types
pub fn prompt(text: &str) {
    let mut stdout = stdout();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(format_date(date), "2024-05-01");
        assert_eq!(parse_date("2024-05-01").unwrap(), date);
        assert_eq!(parse_date(" 2024-05-01\n").unwrap(), date);
        assert!(parse_date("01/05/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn lenient_dates() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "deserialize_date")]
            date: NaiveDate,
        }
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let w: Wrapper = serde_json::from_str(r#"{"date": "2024-05-01"}"#).unwrap();
        assert_eq!(w.date, expected);
        let w: Wrapper = serde_json::from_str(r#"{"date": "2024-05-01T08:30:00Z"}"#).unwrap();
        assert_eq!(w.date, expected);
        let w: Wrapper = serde_json::from_str(r#"{"date": "2024-05-01T23:30:00+02:00"}"#).unwrap();
        assert_eq!(w.date, expected);
        assert!(serde_json::from_str::<Wrapper>(r#"{"date": "May 1st"}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"date": 12}"#).is_err());
    }
}
