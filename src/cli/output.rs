/// Output formatting: Alfred JSON, pretty JSON, table. TTY detection.
use std::io::{IsTerminal, Write};

use comfy_table::{Table, presets::UTF8_BORDERS_ONLY};
use serde::Serialize;

use super::args::OutputFormat;
use crate::types::Feedback;
use crate::workflow::WorkflowError;

/// Resolve the effective output format, handling TTY auto-detection.
#[must_use]
pub fn resolve_format(fmt: OutputFormat) -> OutputFormat {
    if fmt == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Alfred
        }
    } else {
        fmt
    }
}

/// Output context passed to all writers.
#[derive(Debug, Clone)]
pub struct OutputCtx {
    pub format: OutputFormat,
    pub no_header: bool,
    /// Report errors as plain text instead of a feedback item.
    pub text_errors: bool,
}

impl OutputCtx {
    /// Construct from CLI args.
    #[must_use]
    pub fn new(fmt: OutputFormat, no_header: bool, text_errors: bool) -> Self {
        Self {
            format: resolve_format(fmt),
            no_header,
            text_errors,
        }
    }
}

// --- Feedback ---

/// Write a feedback payload to stdout.
pub fn write_feedback(feedback: &Feedback, ctx: &OutputCtx) {
    match ctx.format {
        OutputFormat::Alfred => print_compact_json(feedback),
        OutputFormat::Json => print_json(feedback),
        OutputFormat::Table | OutputFormat::Auto => println!("{}", feedback_table(feedback, ctx)),
    }
}

fn feedback_table(feedback: &Feedback, ctx: &OutputCtx) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    if !ctx.no_header {
        table.set_header(["TITLE", "SUBTITLE", "ARG", "ICON"]);
    }
    for item in &feedback.items {
        table.add_row([
            item.title.as_str(),
            item.subtitle.as_str(),
            item.arg.as_deref().unwrap_or(""),
            item.icon.as_ref().map_or("", |i| i.path.as_str()),
        ]);
    }
    table
}

// --- Error output ---

/// Report a fatal error.
///
/// With text errors on, the bare message goes to stdout so Alfred can show it
/// in a notification. Otherwise Alfred formats get a single error item and the
/// table format gets a line on stderr.
pub fn write_error(err: &WorkflowError, ctx: &OutputCtx) {
    let message = err.to_string();
    if ctx.text_errors {
        print!("{message}");
        let _ = std::io::stdout().flush();
        return;
    }
    match ctx.format {
        OutputFormat::Alfred | OutputFormat::Json => {
            write_feedback(&Feedback::error(&message), ctx);
        }
        OutputFormat::Table | OutputFormat::Auto => {
            let _ = writeln!(std::io::stderr().lock(), "Error: {message}");
        }
    }
}

// --- Generic JSON helpers ---

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => tracing::error!("JSON serialization error: {e}"),
    }
}

fn print_compact_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => tracing::error!("JSON serialization error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Icon, Item};

    #[test]
    fn test_explicit_format_kept() {
        assert_eq!(resolve_format(OutputFormat::Json), OutputFormat::Json);
        assert_eq!(resolve_format(OutputFormat::Table), OutputFormat::Table);
    }

    #[test]
    fn test_table_rows() {
        let mut feedback = Feedback::new();
        feedback.push(
            Item::new("grinning")
                .subtitle("Paste symbol")
                .arg("😀")
                .icon(Icon::image("images/1f600.png")),
        );
        let ctx = OutputCtx::new(OutputFormat::Table, false, false);
        let rendered = feedback_table(&feedback, &ctx).to_string();
        assert!(rendered.contains("TITLE"));
        assert!(rendered.contains("grinning"));
        assert!(rendered.contains("images/1f600.png"));
    }

    #[test]
    fn test_table_no_header() {
        let ctx = OutputCtx::new(OutputFormat::Table, true, false);
        let rendered = feedback_table(&Feedback::new(), &ctx).to_string();
        assert!(!rendered.contains("TITLE"));
    }
}
