//! Tracing subscriber: console rendering plus the per-command log file.
use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Tracing target for stage headers.
pub(super) const STAGE_TARGET: &str = "dloom::stage";
/// Tracing target for dry-run action lines.
pub(super) const DRY_RUN_TARGET: &str = "dloom::dry_run";

/// How a [`Log`](super::Log) call is rendered, recovered from an event's
/// level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    DryRun,
    Error,
    Warn,
    Info,
    Detail,
}

/// Classify `event` and pull out its message.
fn classify(event: &Event<'_>) -> (Kind, String) {
    struct Message(String);

    impl Visit for Message {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    let meta = event.metadata();
    let kind = match (*meta.level(), meta.target()) {
        (Level::ERROR, _) => Kind::Error,
        (Level::WARN, _) => Kind::Warn,
        (Level::INFO, STAGE_TARGET) => Kind::Stage,
        (Level::INFO, DRY_RUN_TARGET) => Kind::DryRun,
        (Level::INFO, _) => Kind::Info,
        _ => Kind::Detail,
    };
    let mut message = Message(String::new());
    event.record(&mut message);
    (kind, message.0)
}

/// Appends every event to `$XDG_CACHE_HOME/dloom/<command>.log`,
/// timestamped and with ANSI codes stripped.
#[derive(Debug)]
struct FileLayer {
    file: Mutex<File>,
}

impl FileLayer {
    /// Truncate `path`, write a run header and open it for appending.
    fn open(path: &Path, command: &str) -> Option<Self> {
        let version =
            option_env!("DLOOM_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        fs::write(
            path,
            format!("# dloom {version} {command} {}\n", format_utc_datetime()),
        )
        .ok()?;
        let file = OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let (kind, msg) = classify(event);
        let tag = match kind {
            Kind::Stage => Some("==>"),
            Kind::DryRun => Some("[dry run]"),
            Kind::Error => Some("[error]"),
            Kind::Warn => Some("[warn]"),
            Kind::Info => None,
            Kind::Detail => Some("[debug]"),
        };
        let ts = format_utc_time();
        let msg = strip_ansi(&msg);
        let line = tag.map_or_else(|| format!("[{ts}] {msg}"), |tag| format!("[{ts}] {tag} {msg}"));
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console rendering: coloured stage headers and dry-run lines, dimmed
/// verbose detail.
struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let (kind, msg) = classify(event);
        match kind {
            Kind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Kind::DryRun => writeln!(writer, "  \x1b[34m[DRY RUN]\x1b[0m {msg}"),
            Kind::Error => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            Kind::Warn => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            Kind::Info => writeln!(writer, "  {msg}"),
            Kind::Detail => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Install the global subscriber.
///
/// Warnings and errors go to stderr and everything else to stdout; detail
/// lines only reach the console when `verbose` is set. The log file always
/// receives detail lines. A log file that cannot be opened is skipped.
/// Must be called once, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));
    let console = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file = log_file_path(command)
        .and_then(|path| FileLayer::open(&path, command))
        .map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();
}
