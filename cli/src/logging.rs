//! # Structured Logging
//!
//! The CLI runs one command and exits, so its log lines are short: the
//! pretty format is compact with no timestamp or module path, and the JSON
//! format flattens event fields to the top level of each line.
//!
//! Output always goes to stderr. Stdout carries nothing but command results
//! (JSON, or the forensic report text). `RUST_LOG` overrides the default
//! filter.

use std::io::{self, IsTerminal};

use tracing::Subscriber;
use tracing_subscriber::{fmt, fmt::MakeWriter, layer::SubscriberExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One compact line per event, colored when stderr is a terminal.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// "json" (any case) selects JSON. Anything else falls back to `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Assemble the subscriber for `format`, writing to `writer`.
pub fn build_subscriber<W>(
    filter: EnvFilter,
    format: LogFormat,
    ansi: bool,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => Box::new(
            registry.with(
                fmt::layer()
                    .compact()
                    .without_time()
                    .with_target(false)
                    .with_ansi(ansi)
                    .with_writer(writer),
            ),
        ),
        LogFormat::Json => Box::new(
            registry.with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(writer),
            ),
        ),
    }
}

/// Install the global subscriber. Later calls are ignored.
///
/// `default_filter` applies when `RUST_LOG` is unset, e.g.
/// `"decision_ledger=info,decision_ledger_cli=info"`.
pub fn init_logging(default_filter: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let ansi = io::stderr().is_terminal();
    let _ = tracing::subscriber::set_global_default(build_subscriber(
        filter,
        format,
        ansi,
        io::stderr,
    ));
    tracing::debug!(?format, "logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn emit(format: LogFormat) -> String {
        let out = Captured::default();
        let subscriber = build_subscriber(EnvFilter::new("info"), format, false, out.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("filtered out");
            tracing::info!(blocks = 3, "ledger loaded");
        });
        out.text()
    }

    #[test]
    fn format_parsing_is_lossy() {
        assert_eq!(LogFormat::from_str_lossy("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str_lossy("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str_lossy("yaml"), LogFormat::Pretty);
    }

    #[test]
    fn pretty_lines_are_compact() {
        let text = emit(LogFormat::Pretty);
        assert_eq!(text.lines().count(), 1, "{}", text);
        assert!(text.contains("ledger loaded"), "{}", text);
        assert!(text.contains("blocks=3"), "{}", text);
        assert!(!text.contains("decision_ledger_cli"), "{}", text);
        assert!(!text.contains(".rs:"), "{}", text);
    }

    #[test]
    fn json_lines_carry_flattened_fields() {
        let text = emit(LogFormat::Json);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1, "{}", text);

        let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event["level"], "INFO");
        assert_eq!(event["message"], "ledger loaded");
        assert_eq!(event["blocks"], 3);
    }
}
