//! Engine settings read from a TOML document:
//!
//! ```toml
//! input_mode = "single_complex"   # or "two_real"
//! max_iterations = 256
//! bailout = 4.0
//! simplify_passes = 8
//!
//! [logging]
//! level = "info"                  # off | none | error | warn | info | debug | trace
//! file = "auto"                   # a path, or "auto" for a timestamped log_*.txt
//! ```
//! Every key is optional; missing keys keep their defaults and unknown keys are ignored.
use crate::Utils::logger::{init_logger, log_file_name, parse_level};
use crate::symbolic::symbolic_errors::ExprError;
use crate::symbolic::symbolic_glsl::InputMode;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use toml::{Table, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub input_mode: InputMode,
    /// iteration cap of the escape-time loop
    pub max_iterations: usize,
    /// escape radius
    pub bailout: f64,
    /// pass limit for `simplify_to_fixpoint`
    pub simplify_passes: usize,
    pub loglevel: String,
    pub log_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            input_mode: InputMode::SingleComplex,
            max_iterations: 256,
            bailout: 4.0,
            simplify_passes: 8,
            loglevel: "info".to_string(),
            log_file: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ExprError> {
        let table = text
            .parse::<Table>()
            .map_err(|e| ExprError::config(format!("invalid TOML: {}", e)))?;
        let mut config = EngineConfig::default();

        if let Some(value) = table.get("input_mode") {
            let name = expect_str(value, "input_mode")?;
            config.input_mode = InputMode::from_str(name)
                .map_err(|_| ExprError::config(format!("unknown input_mode '{}'", name)))?;
        }
        if let Some(value) = table.get("max_iterations") {
            config.max_iterations = expect_positive_int(value, "max_iterations")?;
        }
        if let Some(value) = table.get("bailout") {
            config.bailout = expect_positive_float(value, "bailout")?;
        }
        if let Some(value) = table.get("simplify_passes") {
            config.simplify_passes = expect_positive_int(value, "simplify_passes")?;
        }
        if let Some(value) = table.get("logging") {
            let logging = value
                .as_table()
                .ok_or_else(|| ExprError::config("[logging] must be a table"))?;
            if let Some(level) = logging.get("level") {
                let level = expect_str(level, "logging.level")?;
                parse_level(level)?;
                config.loglevel = level.to_string();
            }
            if let Some(file) = logging.get("file") {
                let file = expect_str(file, "logging.file")?;
                config.log_file = Some(if file == "auto" {
                    PathBuf::from(log_file_name())
                } else {
                    PathBuf::from(file)
                });
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ExprError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ExprError::config(format!("cannot read {}: {}", path.display(), e)))?;
        EngineConfig::from_toml_str(&text)
    }

    /// starts logging as configured; see [`init_logger`]
    pub fn init_logging(&self) -> Result<bool, ExprError> {
        init_logger(&self.loglevel, self.log_file.as_deref())
    }
}

fn expect_str<'a>(value: &'a Value, key: &str) -> Result<&'a str, ExprError> {
    value
        .as_str()
        .ok_or_else(|| ExprError::config(format!("{} must be a string", key)))
}

fn expect_positive_int(value: &Value, key: &str) -> Result<usize, ExprError> {
    match value.as_integer() {
        Some(n) if n > 0 => Ok(n as usize),
        _ => Err(ExprError::config(format!("{} must be a positive integer", key))),
    }
}

fn expect_positive_float(value: &Value, key: &str) -> Result<f64, ExprError> {
    let number = match value {
        Value::Float(f) => Some(*f),
        Value::Integer(i) => Some(*i as f64),
        _ => None,
    };
    match number {
        Some(f) if f > 0.0 && f.is_finite() => Ok(f),
        _ => Err(ExprError::config(format!("{} must be a positive number", key))),
    }
}
