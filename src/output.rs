//! Report writers for violation lists.

use crate::check::Violation;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

pub trait ReportWriter {
    fn write_violations(&mut self, violations: &[Violation]) -> anyhow::Result<()>;
}

pub fn create_writer(format: OutputFormat, out: Box<dyn Write>) -> Box<dyn ReportWriter> {
    match format {
        OutputFormat::Text => Box::new(TextWriter::new(out)),
        OutputFormat::Json => Box::new(JsonWriter::new(out)),
    }
}

/// The stable one-line form: `slicing: shortDescription: a -> b, c -> d`.
pub fn violation_line(violation: &Violation) -> String {
    let dependencies = violation
        .dependencies
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}: {}: {}",
        violation.slicing, violation.short_description, dependencies
    )
}

pub struct TextWriter<W: Write> {
    out: W,
}

impl<W: Write> TextWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ReportWriter for TextWriter<W> {
    fn write_violations(&mut self, violations: &[Violation]) -> anyhow::Result<()> {
        for violation in violations {
            writeln!(self.out, "{}", violation_line(violation))?;
        }
        Ok(())
    }
}

pub struct JsonWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ReportWriter for JsonWriter<W> {
    fn write_violations(&mut self, violations: &[Violation]) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, violations)?;
        writeln!(self.out)?;
        Ok(())
    }
}
