use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields, FormattedFields},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Target for per-word results (accepted guesses, worker failures).
pub const WORD_RESULT_TARGET: &str = "word_result";
/// Target for the periodic good/bad status line.
pub const STATUS_TARGET: &str = "status";

pub fn setup_logger() -> Option<WorkerGuard> {
    // Create logs directory
    std::fs::create_dir_all("logs").ok();

    // Hourly rotation; a long brute-force run produces one file per hour
    let file_appender = tracing_appender::rolling::hourly("logs", "bee");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // File layer: INFO for results and status, WARN for others
    let file_filter = tracing_subscriber::filter::Targets::new()
        .with_target(WORD_RESULT_TARGET, tracing::Level::INFO)
        .with_target(STATUS_TARGET, tracing::Level::INFO)
        .with_default(tracing::Level::WARN);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    // Console layer: INFO for results and status, ERROR for others
    let console_filter = tracing_subscriber::filter::Targets::new()
        .with_target(WORD_RESULT_TARGET, tracing::Level::INFO)
        .with_target(STATUS_TARGET, tracing::Level::INFO)
        .with_default(tracing::Level::ERROR);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter);

    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();

    if installed.is_err() {
        return None;
    }

    // Return guard - MUST be kept alive by caller
    Some(guard)
}

// --- Formatters ---

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn event_message(event: &Event<'_>) -> String {
    let mut visitor = MessageVisitor {
        message: String::new(),
    };
    event.record(&mut visitor);
    visitor.message
}

/// Highlights accepted words and failures on the console.
pub fn colorize(msg: &str) -> String {
    if msg.contains("SCORE:") || msg.contains("Accepted") {
        let green_text = Style::new().fg(Color::LightGreen).bold();
        msg.replace("SCORE:", &format!("{}", green_text.paint("SCORE:")))
            .replace("Accepted", &format!("{}", green_text.paint("Accepted")))
    } else if msg.contains("FAILED") || msg.contains("failed") {
        let red_text = Style::new().fg(Color::LightRed).bold();
        msg.replace("FAILED", &format!("{}", red_text.paint("FAILED")))
            .replace("failed", &format!("{}", red_text.paint("failed")))
    } else {
        msg.to_string()
    }
}

pub struct TerminalFormatter;

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                if span.name() != "worker" {
                    continue;
                }
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    let style = Style::new().fg(Color::DarkGray);
                    write!(writer, "{} ", style.paint(format!("[{}]", fields)))?;
                }
            }
        }

        write!(writer, "{}", colorize(&event_message(event)))?;
        writeln!(writer)
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();

        write!(writer, "{} [{}] ", timestamp, level)?;
        writeln!(writer, "{}", event_message(event))
    }
}
