use crate::error::Result;
use crate::export;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use daystore::History;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
    Jsonl,
    Csv,
}

pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn write_history(&mut self, history: &History) -> Result<()> {
        match self.format {
            OutputFormat::Json => export::write_json(history, &mut self.writer)?,
            OutputFormat::Jsonl => export::write_jsonl(history, &mut self.writer)?,
            OutputFormat::Csv => export::write_csv(history, &mut self.writer)?,
            OutputFormat::Table => {
                if history.is_empty() {
                    self.writeln("No entries")?;
                } else {
                    let table = history_table(history);
                    writeln!(self.writer, "{}", table)?;
                    self.writeln(&format!("\nTotal: {} days", history.len()))?;
                }
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn writeln(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{}", text)?;
        Ok(())
    }
}

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// One row per day, oldest first, one column per field seen on any day.
pub fn history_table(history: &History) -> Table {
    let columns = export::field_columns(history);
    let mut table = create_table();

    let mut header = vec![Cell::new("Date")];
    header.extend(columns.iter().map(Cell::new));
    table.set_header(header);

    for (date, record) in history.chronological() {
        let mut row = vec![Cell::new(date)];
        row.extend(columns.iter().map(|c| {
            Cell::new(truncate_string(record.get(c).unwrap_or("-"), 80))
        }));
        table.add_row(row);
    }
    table
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        format!("{}...", s.chars().take(max_len - 3).collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate_string("ééééé", 5), "ééééé");
    }

    #[test]
    fn test_table_output() {
        let history: History =
            serde_json::from_str(r#"{"2024-03-15": {"headline": "Quakers win"}}"#).unwrap();
        let mut out = Vec::new();
        OutputWriter::new(&mut out, OutputFormat::Table)
            .write_history(&history)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Date"));
        assert!(text.contains("headline"));
        assert!(text.contains("2024-03-15"));
        assert!(text.contains("Quakers win"));
        assert!(text.contains("Total: 1 days"));
    }

    #[test]
    fn test_empty_table() {
        let mut out = Vec::new();
        OutputWriter::new(&mut out, OutputFormat::Table)
            .write_history(&History::new())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No entries\n");
    }
}
