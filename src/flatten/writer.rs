use crate::flatten::types::FlattenedItem;
use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;

/// How flattened items are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Lines,
    /// One compact JSON array per batch
    Compact,
    /// One indented JSON array per batch
    Pretty,
}

/// Writes flattened items to any output
pub struct ItemWriter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> ItemWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        ItemWriter { writer, format }
    }

    pub fn write_items(&mut self, items: Vec<FlattenedItem>) -> Result<()> {
        match self.format {
            OutputFormat::Lines => {
                for item in items {
                    let json = serde_json::to_string(&item)
                        .context("Failed to serialize flattened item")?;
                    writeln!(self.writer, "{}", json)
                        .context("Failed to write flattened item")?;
                }
                Ok(())
            }
            OutputFormat::Compact | OutputFormat::Pretty => {
                let batch = Value::Array(items.into_iter().map(Value::Object).collect());
                self.write_value(&batch)
            }
        }
    }

    /// Write a single value; `Lines` and `Compact` both print it on one line
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        let json = match self.format {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Lines | OutputFormat::Compact => serde_json::to_string(value),
        }
        .context("Failed to serialize value")?;

        writeln!(self.writer, "{}", json).context("Failed to write value")
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
