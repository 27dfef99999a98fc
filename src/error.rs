use crate::value::ValueKind;
use colored::Colorize;
use std::fmt;

/// Hard errors that stop a resolution pass
///
/// Problems with individual values are not errors: they are collected as
/// diagnostics on the [`EnvResult`](crate::EnvResult).
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Blank text was handed to a value parser
    EmptyInput { kind: ValueKind },
    /// A declared `pattern` is not a valid regular expression
    InvalidPattern {
        key: String,
        pattern: String,
        message: String,
    },
    /// A nested field cannot be traced back to the root object
    UnresolvedPath { field: String, reason: String },
    /// The pass produced diagnostics and `throw_errors` is enabled
    Aborted { errors: Vec<String> },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyInput { kind } => write!(
                f,
                "You must supply a string representation of a {} to parse, it cannot be blank!",
                kind
            ),
            ConfigError::InvalidPattern {
                key,
                pattern,
                message,
            } => {
                writeln!(
                    f,
                    "{}: Invalid pattern {}",
                    key.magenta().bold(),
                    format!("'{}'", pattern).red(),
                )?;
                write!(f, "\t{}", message)
            }
            ConfigError::UnresolvedPath { field, reason } => write!(
                f,
                "{}: Cannot resolve property path ({})",
                field.magenta().bold(),
                reason
            ),
            ConfigError::Aborted { errors } => write!(f, "{}", format_config_errors(errors)),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Formats a list of diagnostics into a single message
pub fn format_config_errors(errors: &[String]) -> String {
    let error_summary = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Configuration failed with {} error(s):\n{}",
        errors.len().to_string().yellow().bold(),
        error_summary
    )
}
