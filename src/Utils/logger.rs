use crate::symbolic::symbolic_errors::ExprError;
use chrono::Local;
use simplelog::*;
use std::fs::File;
use std::path::Path;

/// Maps a level name from the configuration to a `LevelFilter`.
/// `off` and `none` both switch logging off.
pub fn parse_level(level: &str) -> Result<LevelFilter, ExprError> {
    match level.trim().to_lowercase().as_str() {
        "off" | "none" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(ExprError::config(format!(
            "loglevel must be off, none, error, warn, info, debug or trace, got '{}'",
            other
        ))),
    }
}

/// `log_YYYY-MM-DD_HH-MM-SS.txt` for the current local time
pub fn log_file_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Installs a terminal logger and, when `log_file` is given, a file logger next to it.
///
/// Returns `Ok(true)` when this call installed the logger and `Ok(false)` when logging is
/// off or a logger was already installed (only the first initialisation takes effect).
pub fn init_logger(level: &str, log_file: Option<&Path>) -> Result<bool, ExprError> {
    let log_option = parse_level(level)?;
    if log_option == LevelFilter::Off {
        return Ok(false);
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        let file = File::create(path).map_err(|e| {
            ExprError::config(format!("cannot create log file {}: {}", path.display(), e))
        })?;
        loggers.push(WriteLogger::new(log_option, Config::default(), file));
    }
    let logger_instance = CombinedLogger::init(loggers);
    match logger_instance {
        Ok(()) => {
            log::info!("logging started with level {}", log_option);
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}
