//! Chronological renderings of a history for display and export.
//!
//! Flat row formats put the day in a `_date` column ahead of the record's
//! own fields, so a producer field called `date` never collides with it.

use crate::error::Result;
use daystore::{DateKey, History, Record};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::io::Write;

pub const DATE_COLUMN: &str = "_date";

/// Union of field names across all days, in first-seen chronological order.
pub fn field_columns(history: &History) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for (_, record) in history.chronological() {
        for name in record.field_names() {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

/// The history re-ordered oldest day first.
pub fn chronological(history: &History) -> History {
    history
        .chronological()
        .into_iter()
        .map(|(date, record)| (date, record.clone()))
        .collect()
}

/// The persisted document layout, pretty-printed, days in order.
pub fn write_json<W: Write>(history: &History, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &chronological(history))?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_jsonl<W: Write>(history: &History, mut writer: W) -> Result<()> {
    for (date, record) in history.chronological() {
        serde_json::to_writer(&mut writer, &Row { date, record })?;
        writeln!(writer)?;
    }
    Ok(())
}

pub fn write_csv<W: Write>(history: &History, writer: W) -> Result<()> {
    let columns = field_columns(history);
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(columns.iter().cloned());
    csv.write_record(&header)?;

    for (date, record) in history.chronological() {
        let mut row = vec![date.to_string()];
        row.extend(
            columns
                .iter()
                .map(|c| record.get(c).unwrap_or_default().to_string()),
        );
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

struct Row<'a> {
    date: DateKey,
    record: &'a Record,
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.record.len() + 1))?;
        map.serialize_entry(DATE_COLUMN, &self.date)?;
        for (name, value) in self.record.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> History {
        serde_json::from_str(
            r#"{
                "2024-03-15": {"author": "Jane Doe", "publish_time": "8:05am"},
                "2024-03-13": {"headline": "Older, with comma"},
                "2024-03-14": {"headline": "Middle", "author": "Sam"}
            }"#,
        )
        .unwrap()
    }

    fn render(f: impl Fn(&History, &mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&history(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_field_columns_first_seen_chronologically() {
        assert_eq!(
            field_columns(&history()),
            vec!["headline", "author", "publish_time"]
        );
    }

    #[test]
    fn test_write_csv() {
        let text = render(|h, out| write_csv(h, out));
        assert_eq!(
            text,
            "_date,headline,author,publish_time\n\
             2024-03-13,\"Older, with comma\",,\n\
             2024-03-14,Middle,Sam,\n\
             2024-03-15,,Jane Doe,8:05am\n"
        );
    }

    #[test]
    fn test_write_jsonl() {
        let text = render(|h, out| write_jsonl(h, out));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            r#"{"_date":"2024-03-13","headline":"Older, with comma"}"#
        );
        assert_eq!(
            lines[2],
            r#"{"_date":"2024-03-15","author":"Jane Doe","publish_time":"8:05am"}"#
        );
    }

    #[test]
    fn test_write_json_orders_days() {
        let text = render(|h, out| write_json(h, out));
        let first = text.find("2024-03-13").unwrap();
        let last = text.find("2024-03-15").unwrap();
        assert!(first < last);

        let parsed: History = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, history());
    }
}
