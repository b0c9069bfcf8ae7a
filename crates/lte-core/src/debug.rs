use core::fmt;
use std::sync::Once;
use std::fs::OpenOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt as tracingfmt, EnvFilter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;


/// if `cond` is false, logs a warning with your message.
#[macro_export]
macro_rules! assert_warn {
    ($cond:expr, $($arg:tt)+) => {{
        if !$cond {
            tracing::warn!(
                target: module_path!(),
                "assertion warning: `{}` failed: {} at {}:{}",
                stringify!($cond),
                format_args!($($arg)+),
                file!(),
                line!(),
            );
        }
    }};
}

/// One event per line: coloured level, shortened source location, then the message
/// starting at a fixed column.
struct AlignedFormatter;

const MESSAGE_COLUMN: usize = 60;

fn level_color(level: &tracing::Level) -> &'static str {
    match *level {
        tracing::Level::ERROR => "\x1b[31m",
        tracing::Level::WARN => "\x1b[33m",
        tracing::Level::INFO => "\x1b[32m",
        tracing::Level::DEBUG => "\x1b[34m",
        tracing::Level::TRACE => "\x1b[35m",
    }
}

/// "crates/lte-pdus/src/mac/pdus/sch_pdu.rs" becomes "[pdus/mac] sch_pdu.rs"
fn short_location(file_path: &str) -> String {
    let Some((before_src, after_src)) = file_path.split_once("/src/") else {
        return file_path.to_string();
    };
    let crate_name = match before_src.rfind("lte-") {
        Some(idx) => &before_src[idx + 4..],
        None => before_src.rsplit('/').next().unwrap_or("unknown"),
    };
    match after_src.rsplit_once('/') {
        Some((modules, filename)) => {
            let top_module = modules.split('/').next().unwrap_or("");
            format!("[{}/{}] {}", crate_name, top_module, filename)
        }
        None => format!("[{}] {}", crate_name, after_src),
    }
}

impl<S, N> FormatEvent<S, N> for AlignedFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let (color, reset) = if writer.has_ansi_escapes() { (level_color(meta.level()), "\x1b[0m") } else { ("", "") };
        let location = format!(
            "{}{:<5}{} {}:{}:",
            color,
            meta.level(),
            reset,
            short_location(meta.file().unwrap_or("unknown")),
            meta.line().unwrap_or(0)
        );

        let mut message = String::new();
        ctx.field_format().format_fields(format::Writer::new(&mut message), event)?;

        // Tx/rx markers sit slightly left of the message column
        let width = if message.starts_with("->") || message.starts_with("<-") { MESSAGE_COLUMN - 3 } else { MESSAGE_COLUMN };
        writeln!(writer, "{:<width$} {}", location, message, width = width)
    }
}

static INIT_LOG: Once = Once::new();

/// Sets up logging with maximum verbosity (trace level)
/// Mainly for unit tests
pub fn setup_logging_verbose() {
    setup_logging(EnvFilter::new("trace"), None);
}

/// Sets up default logging to stdout and optionally, a verbose log file
/// Returns a guard, that needs to be kept alive for logging to file to work
pub fn setup_logging_default(verbose_logfile: Option<String>) -> Option<WorkerGuard> {
    let stdout_filter = get_default_stdout_filter();
    let logfile_and_filter = verbose_logfile.map(|file| (file, get_default_logfile_filter()));
    setup_logging(stdout_filter, logfile_and_filter)
}

pub fn get_default_stdout_filter() -> EnvFilter {
    EnvFilter::new("info")
        // Bit-level codec chatter
        .add_directive(directive("lte_core::bitbuffer=warn"))

        // Mux/demux layout and corruption reports
        .add_directive(directive("lte_pdus::mac::pdus=info"))
        .add_directive(directive("lte_pdus::mac::fields=info"))

        // SDU source
        .add_directive(directive("lte_saps::rlc=info"))
}

fn get_default_logfile_filter() -> EnvFilter {
    EnvFilter::new("debug")
}

fn directive(s: &'static str) -> tracing_subscriber::filter::Directive {
    // Static strings above are known-good directives
    s.parse().unwrap_or_else(|e| panic!("invalid log directive {}: {}", s, e))
}

/// Sets up logging to stdout and optionally, a verbose log file
/// If an output file  is requested, returns Some<WorkerGuard>. Keep this value alive
/// or logging to file may cease working. If no output file is provided, returns None.
fn setup_logging(stdout_filter: EnvFilter, outfile: Option<(String, EnvFilter)>) -> Option<WorkerGuard> {
    if let Some((outfile, outfile_filter)) = outfile {
        let file = match OpenOptions::new().create(true).append(true).open(&outfile) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", outfile, e);
                return setup_logging(stdout_filter, None);
            }
        };
        let (file_writer, guard) = tracing_appender::non_blocking(file);

        INIT_LOG.call_once(|| {
            let file_layer = tracingfmt::layer()
                .event_format(AlignedFormatter)
                .with_writer(file_writer)
                .with_ansi(false);

            let stdout_layer = tracingfmt::layer()
                .event_format(AlignedFormatter);

            tracing_subscriber::registry()
                .with(file_layer.with_filter(outfile_filter))
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
        });

        Some(guard)
    } else {
        INIT_LOG.call_once(|| {
            let stdout_layer = tracingfmt::layer()
                .event_format(AlignedFormatter)
                .with_test_writer();

            tracing_subscriber::registry()
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
        });
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_location() {
        assert_eq!(short_location("crates/lte-pdus/src/mac/pdus/sch_pdu.rs"), "[pdus/mac] sch_pdu.rs");
        assert_eq!(short_location("crates/lte-core/src/bitbuffer.rs"), "[core] bitbuffer.rs");
        assert_eq!(short_location("bins/pdu-tool/src/tools/decoder.rs"), "[pdu-tool/tools] decoder.rs");
        assert_eq!(short_location("<unknown>"), "<unknown>");
    }

    #[test]
    fn test_default_filters_parse() {
        let _ = get_default_stdout_filter();
        let _ = get_default_logfile_filter();
    }
}
