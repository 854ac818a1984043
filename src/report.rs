use crate::analytics::{ComplianceRow, RowSink};
use anyhow::Result;
use log::debug;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

const LABEL_WIDTH: usize = 50;
const CURRENT_WIDTH: usize = 70;
const RECOMMENDED_WIDTH: usize = 30;
const VERDICT_WIDTH: usize = 10;

/// Tagged message levels used by the network test output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Good,
}

impl Level {
    fn header(&self) -> &'static str {
        match self {
            Level::Info => "INFO  : ",
            Level::Warn => "WARN  : ",
            Level::Error => "ERROR : ",
            Level::Good => "GOOD  : ",
        }
    }
}

fn indent(level: u8) -> &'static str {
    match level {
        0 => "",
        1 => ">>> ",
        2 => "    >>> ",
        _ => "        >>> ",
    }
}

/// "INFO  : >>> text", or just ">>> text" with the header hidden.
pub fn format_message(level: Level, depth: u8, text: &str, hide_header: bool) -> String {
    let header = if hide_header { "" } else { level.header() };
    format!("{}{}{}", header, indent(depth), text)
}

/// Writes every line to the console and tees it to a per-run file.
pub struct Transcript {
    console: Box<dyn Write>,
    file: Option<File>,
}

impl Transcript {
    /// Truncates the file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        debug!("Writing transcript to {}", path.display());
        Ok(Transcript {
            console: Box::new(io::stdout()),
            file: Some(File::create(path)?),
        })
    }

    pub fn with_console(console: Box<dyn Write>, file: Option<File>) -> Self {
        Transcript { console, file }
    }

    pub fn stdout_only() -> Self {
        Transcript::with_console(Box::new(io::stdout()), None)
    }

    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.console, "{}", text)?;
        if let Some(file) = self.file.as_mut() {
            writeln!(file, "{}", text)?;
        }
        Ok(())
    }

    pub fn message(&mut self, level: Level, depth: u8, text: &str, hide_header: bool) -> Result<()> {
        self.line(&format_message(level, depth, text, hide_header))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.console.flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

pub fn format_row(row: &ComplianceRow) -> String {
    format!(
        "{:<lw$} {:<cw$} {:<rw$} {:<vw$}",
        truncate(&row.label, LABEL_WIDTH),
        truncate(&row.current, CURRENT_WIDTH),
        truncate(&row.recommended, RECOMMENDED_WIDTH),
        row.verdict,
        lw = LABEL_WIDTH,
        cw = CURRENT_WIDTH,
        rw = RECOMMENDED_WIDTH,
        vw = VERDICT_WIDTH,
    )
    .trim_end()
    .to_string()
}

fn rule() -> String {
    "=".repeat(LABEL_WIDTH + CURRENT_WIDTH + RECOMMENDED_WIDTH + VERDICT_WIDTH + 3)
}

/// Renders compliance rows as a fixed-width table, one line per row as soon as
/// it arrives.
pub struct ConsoleReport<'a> {
    transcript: &'a mut Transcript,
}

impl<'a> ConsoleReport<'a> {
    pub fn new(transcript: &'a mut Transcript) -> Self {
        ConsoleReport { transcript }
    }

    pub fn header(&mut self) -> Result<()> {
        let header = format!(
            "{:<lw$} {:<cw$} {:<rw$} {:<vw$}",
            "Settings/Parameters/Version",
            "Current Value",
            "Recommended Value",
            "Result",
            lw = LABEL_WIDTH,
            cw = CURRENT_WIDTH,
            rw = RECOMMENDED_WIDTH,
            vw = VERDICT_WIDTH,
        );
        self.transcript.line(&rule())?;
        self.transcript.line(header.trim_end())?;
        self.transcript.line(&rule())
    }

    /// Opens a titled section, e.g. "ESXi Host : esx01".
    pub fn section(&mut self, title: &str) -> Result<()> {
        self.transcript.line("")?;
        self.transcript.line(&rule())?;
        self.transcript.line(title)?;
        self.transcript.line(&rule())
    }

    pub fn footer(&mut self) -> Result<()> {
        self.transcript.line(&rule())
    }
}

impl RowSink for ConsoleReport<'_> {
    fn emit(&mut self, row: ComplianceRow) -> Result<()> {
        self.transcript.line(&format_row(&row))
    }

    fn group_break(&mut self) -> Result<()> {
        self.transcript.line("")
    }
}

#[cfg(test)]
mod tests {
    use super::{format_message, format_row, ConsoleReport, Level, Transcript};
    use crate::analytics::{ComplianceRow, RowSink, Verdict};
    use std::fs;
    use std::fs::File;
    use std::io;
    use tempfile::TempDir;

    #[test]
    fn test_message_headers_and_indents() {
        assert_eq!(format_message(Level::Info, 0, "Start", false), "INFO  : Start");
        assert_eq!(format_message(Level::Warn, 1, "x", false), "WARN  : >>> x");
        assert_eq!(format_message(Level::Error, 2, "x", false), "ERROR :     >>> x");
        assert_eq!(format_message(Level::Good, 3, "x", true), "        >>> x");
    }

    #[test]
    fn test_row_layout() {
        let row = ComplianceRow::new(
            "ESXi Version".to_string(),
            "6.0.0".to_string(),
            "5.5".to_string(),
            Verdict::Pass,
        );
        let line = format_row(&row);
        assert!(line.starts_with("ESXi Version"));
        assert_eq!(line.find("6.0.0"), Some(51));
        assert_eq!(line.find("5.5"), Some(122));
        assert_eq!(line.find("Pass"), Some(153));
    }

    #[test]
    fn test_transcript_tees_to_file() {
        let tmp_dir = TempDir::new().unwrap();
        let path = tmp_dir.path().join("esxi_checklist.log");
        let file = File::create(&path).unwrap();
        let mut transcript = Transcript::with_console(Box::new(io::sink()), Some(file));
        {
            let mut report = ConsoleReport::new(&mut transcript);
            report.header().unwrap();
            report
                .emit(ComplianceRow::manual("ESXi HA".to_string(), "enabled".to_string()))
                .unwrap();
        }
        transcript.flush().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("Settings/Parameters/Version"));
        assert!(written.contains("Verify Manually"));
        assert!(written.contains("Manual"));
    }
}
