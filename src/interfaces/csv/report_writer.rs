use crate::error::Result;
use crate::interfaces::scenario::ReportRow;
use std::io::Write;

/// Writes one CSV line per executed scenario step.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Rows are flushed immediately so a later failure keeps earlier output.
    pub fn write_row(&mut self, row: &ReportRow) -> Result<()> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_emits_header_once() {
        let mut buffer = Vec::new();
        {
            let mut writer = ReportWriter::new(&mut buffer);
            for outcome in ["initialized", "error: Not found"] {
                writer
                    .write_row(&ReportRow {
                        step: "initialize".to_string(),
                        family: "payment".to_string(),
                        method: "googlepay".to_string(),
                        container: String::new(),
                        outcome: outcome.to_string(),
                    })
                    .unwrap();
            }
        }

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "step,family,method,container,outcome");
        assert_eq!(lines[1], "initialize,payment,googlepay,,initialized");
        assert_eq!(lines[2], "initialize,payment,googlepay,,error: Not found");
        assert_eq!(lines.len(), 3);
    }
}
