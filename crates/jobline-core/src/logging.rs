//! Logging setup: env_logger backend, bridged through indicatif when a TTY is attached

use indicatif::MultiProgress;

/// ANSI color code and padded label for a log level.
fn level_style(level: log::Level, color: bool) -> (&'static str, &'static str, &'static str) {
    let label = match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    };
    if !color {
        return ("", label, "");
    }
    let ansi = match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug | log::Level::Trace => "\x1b[36m",
    };
    (ansi, label, "\x1b[0m")
}

/// Debug and trace lines carry the emitting module so page-level noise can be traced back.
fn format_line(record: &log::Record, color: bool) -> String {
    let (pre, label, post) = level_style(record.level(), color);
    if record.level() >= log::Level::Debug {
        let target = record.target().trim_start_matches("jobline_");
        format!("[{pre}{label}{post}] {target}: {}", record.args())
    } else {
        format!("[{pre}{label}{post}] {}", record.args())
    }
}

/// Logger that prints through indicatif `MultiProgress` so log lines don't tear the page bar.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            let line = format_line(record, true);
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Initialize logging.
///
/// `RUST_LOG` wins over the `quiet` / `debug` defaults. With `multi` set, lines
/// are routed through the progress bars; otherwise plain `[LEVEL] msg` lines
/// without ANSI colors are written to stderr.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let default_level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let env = env_logger::Env::default().default_filter_or(default_level);

    if let Some(multi) = multi {
        let logger = env_logger::Builder::from_env(env).build();
        let max_level = logger.filter();
        if log::set_boxed_logger(Box::new(IndicatifLogger::new(logger, multi.clone()))).is_ok() {
            log::set_max_level(max_level);
        }
    } else {
        // try_init: tests and repeated CLI invocations in one process must not panic
        let _ = env_logger::Builder::from_env(env)
            .format(|buf, record| writeln!(buf, "{}", format_line(record, false)))
            .try_init();
    }
}
