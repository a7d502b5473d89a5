//! Rendering of [`InlineError`]s for humans (ariadne) and tools (JSON).

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use tarn_common::LineIndex;

use crate::error::InlineError;

/// How diagnostics should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticOptions {
    pub color: bool,
    /// One JSON object per diagnostic instead of a report.
    pub json: bool,
}

impl DiagnosticOptions {
    /// Plain text, no ANSI escapes. Deterministic output for tests.
    pub fn colorless() -> Self {
        Self {
            color: false,
            json: false,
        }
    }
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self {
            color: true,
            json: false,
        }
    }
}

/// Render an error against the source it points into.
pub fn render_diagnostic(
    error: &InlineError,
    source: &str,
    filename: &str,
    options: &DiagnosticOptions,
) -> String {
    if options.json {
        return render_json(error, source, filename).to_string();
    }
    let Some(span) = error.span() else {
        return format!("error[{}]: {}\n", error.code(), error);
    };
    let range = span.to_range(source.len());
    let label = match error {
        InlineError::NotAnIterator { .. } => "this call is not an iterator",
        InlineError::MultipleYields { .. } => "second yield here",
        InlineError::NoYield { .. } => "iterator called here",
        InlineError::InternalInvariantViolation { .. } => "while transforming this",
    };

    let mut builder = Report::build(ReportKind::Error, (filename, range.clone()))
        .with_code(error.code())
        .with_message(error.to_string())
        .with_config(Config::default().with_color(options.color))
        .with_label(Label::new((filename, range)).with_message(label).with_color(Color::Red));

    match error {
        InlineError::MultipleYields { first, .. } => {
            builder.add_label(
                Label::new((filename, first.to_range(source.len())))
                    .with_message("first yield here")
                    .with_color(Color::Blue),
            );
            builder.set_help("iterators are inlined at compile time and may yield only once");
        }
        InlineError::NoYield { .. } => {
            builder.set_help("an iterator body needs exactly one reachable `yield`");
        }
        _ => {}
    }

    let mut buf = Vec::new();
    match builder.finish().write((filename, Source::from(source)), &mut buf) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("error[{}]: {}\n", error.code(), error),
    }
}

/// Render an error as a JSON object with a 1-based line number.
pub fn render_json(error: &InlineError, source: &str, filename: &str) -> serde_json::Value {
    let index = LineIndex::new(source);
    let spans: Vec<serde_json::Value> = error
        .span()
        .map(|span| {
            let (line, column) = index.line_col(span.start);
            serde_json::json!({
                "start": span.start,
                "end": span.end,
                "line": line,
                "column": column,
            })
        })
        .into_iter()
        .collect();
    serde_json::json!({
        "code": error.code(),
        "severity": if error.is_internal() { "bug" } else { "error" },
        "message": error.to_string(),
        "file": filename,
        "spans": spans,
    })
}
