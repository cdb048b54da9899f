//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one value per line. Tones
//! from evse-core become terminal colors via owo-colors.

use std::io::{self, IsTerminal, Write};

use owo_colors::{OwoColorize, Style as Paint};
use tabled::{Table, Tabled, settings::Style};

use evse_core::{CollectionView, Tone};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Apply the terminal color for `tone`.
pub fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    let style = match tone {
        Tone::Neutral => return text.to_owned(),
        Tone::Success => Paint::new().green(),
        Tone::Info => Paint::new().cyan(),
        Tone::Warning => Paint::new().yellow(),
        Tone::Danger => Paint::new().red().bold(),
    };
    text.style(style).to_string()
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a collection view: its rows, or its single "no data" / error row.
///
/// Structured formats serialize the tagged view so scripts can tell an
/// empty list from a failed load.
pub fn render_collection<T, R>(
    format: OutputFormat,
    view: &CollectionView<T>,
    color: bool,
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match (format, view) {
        (OutputFormat::Table | OutputFormat::Plain, CollectionView::Rows { rows }) => {
            render_list(format, rows, to_row, id_fn)
        }
        (OutputFormat::Table | OutputFormat::Plain, CollectionView::Empty { message }) => {
            paint(message, Tone::Neutral, color)
        }
        (OutputFormat::Table | OutputFormat::Plain, CollectionView::Failed { message }) => {
            paint(message, Tone::Danger, color)
        }
        (OutputFormat::Json, _) => render_json(view, false),
        (OutputFormat::JsonCompact, _) => render_json(view, true),
        (OutputFormat::Yaml, _) => render_yaml(view),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views don't use
/// `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Key/value detail block with aligned labels.
pub fn render_detail<K: AsRef<str>>(pairs: &[(K, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.as_ref().len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{:<width$}  {v}", k.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a status line to stderr, respecting quiet mode.
pub fn print_notice(text: &str, tone: Tone, color: bool, quiet: bool) {
    if quiet {
        return;
    }
    eprintln!("{}", paint(text, tone, color));
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let result = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "JSON serialization failed");
        String::new()
    })
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| {
        tracing::error!(error = %e, "YAML serialization failed");
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, serde::Serialize)]
    struct Row {
        id: String,
    }

    #[test]
    fn empty_collection_prints_its_message() {
        let view: CollectionView<Row> = CollectionView::Empty {
            message: "No authorized cards".into(),
        };
        let out = render_collection(
            OutputFormat::Table,
            &view,
            false,
            |r| Row { id: r.id.clone() },
            |r| r.id.clone(),
        );
        assert_eq!(out, "No authorized cards");
    }

    #[test]
    fn json_keeps_the_state_tag() {
        let view: CollectionView<Row> = CollectionView::failed();
        let out = render_collection(
            OutputFormat::JsonCompact,
            &view,
            false,
            |r| Row { id: r.id.clone() },
            |r| r.id.clone(),
        );
        assert_eq!(out, r#"{"state":"failed","message":"Load failed"}"#);
    }

    #[test]
    fn detail_aligns_labels() {
        let out = render_detail(&[("Voltage", "230.0 V".into()), ("Power", "0.0 W".into())]);
        assert_eq!(out, "Voltage  230.0 V\nPower    0.0 W");
    }

    #[test]
    fn paint_is_identity_without_color() {
        assert_eq!(paint("Fault", Tone::Danger, false), "Fault");
    }
}
