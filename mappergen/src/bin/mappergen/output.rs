use anyhow::Result;
use clap::ValueEnum;
use colored::{Color, Colorize};
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use mappergen_build::processor::{FailedMapper, GeneratedMapper};
use mappergen_build::{RoundReport, WriteStatus};
use serde::Serialize;
use std::io::Write;

/// Colors by role, shared by messages, tables and clap help.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub written: Color,
    pub unchanged: Color,
    pub failed: Color,
    pub warning: Color,
    pub info: Color,
    pub heading: Color,
    pub accent: Color,
    pub command: Color,
}

pub const PALETTE: Palette = Palette {
    written: Color::Green,
    unchanged: Color::BrightBlack,
    failed: Color::Red,
    warning: Color::Yellow,
    info: Color::Blue,
    heading: Color::BrightBlue,
    accent: Color::Cyan,
    command: Color::Magenta,
};

pub const ARROW: &str = "→";

/// Leading glyph of a message line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Written,
    Unchanged,
    Failed,
    Warning,
    Info,
    Detail,
    Bullet,
    Busy,
}

impl Mark {
    fn glyph(self) -> &'static str {
        match self {
            Mark::Written => "✓",
            Mark::Unchanged => "=",
            Mark::Failed => "✗",
            Mark::Warning => "⚠",
            Mark::Info => "ℹ",
            Mark::Detail => ARROW,
            Mark::Bullet => "•",
            Mark::Busy => "⟳",
        }
    }

    fn color(self) -> Color {
        match self {
            Mark::Written => PALETTE.written,
            Mark::Unchanged | Mark::Detail | Mark::Bullet => PALETTE.unchanged,
            Mark::Failed => PALETTE.failed,
            Mark::Warning => PALETTE.warning,
            Mark::Info => PALETTE.info,
            Mark::Busy => PALETTE.accent,
        }
    }
}

impl From<WriteStatus> for Mark {
    fn from(status: WriteStatus) -> Self {
        match status {
            WriteStatus::Written => Mark::Written,
            WriteStatus::Unchanged => Mark::Unchanged,
        }
    }
}

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Data that can be displayed as a table
pub trait TableDisplay {
    fn to_table(&self, output: &OutputManager) -> Table;
    fn to_compact(&self) -> String;
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    fn decorates(&self) -> bool {
        !self.options.quiet && self.options.output_format != OutputFormat::Json
    }

    fn marked(&self, mark: Mark, message: &str) -> String {
        if self.options.no_color {
            format!("{} {message}", mark.glyph())
        } else {
            format!("{} {}", mark.glyph().color(mark.color()), message.color(mark.color()))
        }
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
            OutputFormat::Table => println!("{}", data.to_table(self)),
            OutputFormat::Compact => println!("{}", data.to_compact()),
        }
        Ok(())
    }

    pub fn success(&self, message: &str) {
        if self.decorates() {
            println!("{}", self.marked(Mark::Written, message));
        }
    }

    /// Errors go to stderr even in quiet mode.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.marked(Mark::Failed, message));
    }

    pub fn warning(&self, message: &str) {
        if self.decorates() {
            println!("{}", self.marked(Mark::Warning, message));
        }
    }

    pub fn info(&self, message: &str) {
        if self.decorates() {
            println!("{}", self.marked(Mark::Info, message));
        }
    }

    /// Only shown with `--verbose`.
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!("{}", self.marked(Mark::Detail, message));
        }
    }

    pub fn heading(&self, text: &str) {
        if !self.decorates() {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", text.color(PALETTE.heading).bold());
        }
    }

    pub fn bullet(&self, text: &str) {
        if !self.decorates() {
            return;
        }
        let bullet = if self.options.no_color {
            Mark::Bullet.glyph().normal()
        } else {
            Mark::Bullet.glyph().color(Mark::Bullet.color())
        };
        println!("  {bullet} {text}");
    }

    /// `✓ a.mapper.OrderMapper ← a.model.Order`, marked by write status.
    fn generated_line(&self, mapper: &GeneratedMapper) -> String {
        self.marked(Mark::from(mapper.status), &format!("{} ← {}", mapper.mapper, mapper.model))
    }

    fn failed_line(&self, mapper: &FailedMapper) -> String {
        self.marked(Mark::Failed, &format!("{} ← {}: {}", mapper.mapper, mapper.model, mapper.error))
    }

    /// Per-request mapper lines for `--verbose`, one block per configuration root.
    pub fn round_details(&self, report: &RoundReport) {
        if !self.options.verbose || self.options.quiet {
            return;
        }
        for line in self.round_lines(report) {
            eprintln!("{line}");
        }
    }

    fn round_lines(&self, report: &RoundReport) -> Vec<String> {
        let mut lines = Vec::new();
        for outcome in &report.outcomes {
            lines.push(self.marked(Mark::Detail, &outcome.origin));
            match &outcome.result {
                Ok(summary) => {
                    lines.extend(summary.generated.iter().map(|g| format!("    {}", self.generated_line(g))));
                    lines.extend(summary.failed.iter().map(|f| format!("    {}", self.failed_line(f))));
                }
                Err(err) => lines.push(format!("    {}", self.marked(Mark::Failed, &err.to_string()))),
            }
        }
        lines
    }

    /// Table cell for a request status: `ok`, `partial` or `failed`.
    pub fn status_cell(&self, status: &str) -> Cell {
        let cell = Cell::new(status);
        if self.options.no_color {
            return cell;
        }
        cell.fg(match status {
            "ok" => TableColor::Green,
            "partial" => TableColor::Yellow,
            _ => TableColor::Red,
        })
    }

    /// Table with a bold header row
    pub fn create_table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();

        if self.options.no_color {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        } else {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        }

        let header_cells: Vec<Cell> = headers
            .iter()
            .map(|h| {
                let cell = Cell::new(h).add_attribute(Attribute::Bold);
                if self.options.no_color { cell } else { cell.fg(TableColor::Cyan) }
            })
            .collect();
        table.set_header(header_cells);

        table
    }

    /// Transient status line, cleared with [`clear_line`](Self::clear_line).
    pub fn progress(&self, message: &str) {
        if !self.decorates() {
            return;
        }
        print!("\r{}...", self.marked(Mark::Busy, message));
        std::io::stdout().flush().ok();
    }

    pub fn clear_line(&self) {
        if !self.decorates() {
            return;
        }
        print!("\r{}\r", " ".repeat(80));
        std::io::stdout().flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mappergen_build::processor::{RequestOutcome, RequestSummary};
    use mappergen_build::{EmitError, LookupError, RequestError};

    fn plain() -> OutputManager {
        OutputManager::new(GlobalOptions {
            no_color: true,
            verbose: true,
            ..Default::default()
        })
    }

    fn report() -> RoundReport {
        RoundReport {
            outcomes: vec![
                RequestOutcome {
                    origin: "mappergen.toml#1".to_string(),
                    result: Ok(RequestSummary {
                        generated: vec![
                            GeneratedMapper {
                                model: "a.model.Order".to_string(),
                                mapper: "a.mapper.OrderMapper".to_string(),
                                status: WriteStatus::Written,
                            },
                            GeneratedMapper {
                                model: "a.model.User".to_string(),
                                mapper: "a.mapper.UserMapper".to_string(),
                                status: WriteStatus::Unchanged,
                            },
                        ],
                        failed: vec![FailedMapper {
                            model: "a.model.Item".to_string(),
                            mapper: "a.mapper.ItemMapper".to_string(),
                            error: EmitError {
                                package: "a.mapper".to_string(),
                                name: "ItemMapper".to_string(),
                                source: std::io::Error::other("disk full"),
                            },
                        }],
                        ..Default::default()
                    }),
                },
                RequestOutcome {
                    origin: "a.dao.BaseDao".to_string(),
                    result: Err(RequestError::Lookup(LookupError::new("a.absent"))),
                },
            ],
        }
    }

    #[test]
    fn test_round_lines_follow_write_status() {
        let lines = plain().round_lines(&report());
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "→ mappergen.toml#1");
        assert_eq!(lines[1], "    ✓ a.mapper.OrderMapper ← a.model.Order");
        assert_eq!(lines[2], "    = a.mapper.UserMapper ← a.model.User");
        assert!(lines[3].starts_with("    ✗ a.mapper.ItemMapper ← a.model.Item: "));
        assert_eq!(lines[4], "→ a.dao.BaseDao");
        assert!(lines[5].starts_with("    ✗ "));
        assert!(lines[5].contains("a.absent"));
    }

    #[test]
    fn test_status_cell_plain() {
        let cell = plain().status_cell("partial");
        assert_eq!(cell.content(), "partial");
    }

    #[test]
    fn test_display_json_and_quiet() {
        #[derive(Serialize)]
        struct Row {
            mapper: String,
        }

        impl TableDisplay for Row {
            fn to_table(&self, output: &OutputManager) -> Table {
                let mut table = output.create_table(&["Mapper"]);
                table.add_row(vec![Cell::new(&self.mapper)]);
                table
            }

            fn to_compact(&self) -> String {
                self.mapper.clone()
            }
        }

        let row = Row {
            mapper: "a.mapper.OrderMapper".to_string(),
        };
        let json = OutputManager::new(GlobalOptions {
            output_format: OutputFormat::Json,
            ..Default::default()
        });
        assert!(json.display(&row).is_ok());
        let quiet = OutputManager::new(GlobalOptions {
            quiet: true,
            ..Default::default()
        });
        assert!(quiet.display(&row).is_ok());

        let rendered = row.to_table(&plain()).to_string();
        assert!(rendered.contains("Mapper"));
        assert!(rendered.contains("a.mapper.OrderMapper"));
    }
}
