//! Parsers turning raw `.env` text into numbers and booleans.
//!
//! Both parsers report malformed input by appending to `diagnostics` rather
//! than failing, so one pass can surface every problem at once.

use crate::error::ConfigError;
use crate::options::{EnvOptions, NumberFormat};
use crate::value::ValueKind;

/// Parses `raw` as a number using the decimal point and thousands separators of `format`.
///
/// Digits, one decimal point, a sign (leading or right after the exponent
/// marker) and one exponent marker (`e`/`E`) are kept; thousands separators
/// are dropped. Any other character records a diagnostic and yields `NaN`.
///
/// A second decimal point or exponent marker records a diagnostic and the
/// number accumulated before it is returned, so bound checks still see a
/// best-effort value.
///
/// Blank input is an [`ConfigError::EmptyInput`] error rather than a diagnostic.
pub fn parse_number(
    raw: &str,
    diagnostics: &mut Vec<String>,
    format: &NumberFormat,
) -> Result<f64, ConfigError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ConfigError::EmptyInput {
            kind: ValueKind::Number,
        });
    }

    let mut accumulated = String::with_capacity(value.len());
    let mut decimal_count = 0;
    let mut exponent_count = 0;
    // length of `accumulated` when the first repeated marker was seen
    let mut partial_len: Option<usize> = None;

    for ch in value.chars() {
        if ch.is_ascii_digit() {
            accumulated.push(ch);
        } else if ch == format.decimal_point {
            decimal_count += 1;
            if decimal_count > 1 {
                partial_len.get_or_insert(accumulated.len());
            }
            accumulated.push('.');
        } else if ch == 'e' || ch == 'E' {
            exponent_count += 1;
            if exponent_count > 1 {
                partial_len.get_or_insert(accumulated.len());
            }
            accumulated.push('e');
        } else if (ch == '+' || ch == '-') && (accumulated.is_empty() || accumulated.ends_with('e'))
        {
            accumulated.push(ch);
        } else if format.thousands_separators.contains(&ch) {
            continue;
        } else {
            diagnostics.push(format!(
                "'{}' cannot be parsed as a number, '{}' is not allowed (decimal point '{}', thousands separators {})",
                value,
                ch,
                format.decimal_point,
                describe_separators(&format.thousands_separators)
            ));
            return Ok(f64::NAN);
        }
    }

    if decimal_count > 1 {
        diagnostics.push(format!(
            "A number cannot have more than one decimal point ('{}') in it! ({})",
            format.decimal_point, value
        ));
    }
    if exponent_count > 1 {
        diagnostics.push(format!(
            "A number cannot have more than one exponent marker in it! ({})",
            value
        ));
    }

    let text = match partial_len {
        Some(len) => &accumulated[..len],
        None => accumulated.as_str(),
    };

    if !text.chars().any(|c| c.is_ascii_digit()) {
        diagnostics.push(format!("There were no digits in the value '{}'", value));
        return Ok(f64::NAN);
    }

    match text.parse::<f64>() {
        Ok(number) => Ok(number),
        Err(_) => {
            diagnostics.push(format!("'{}' cannot be parsed as a valid number.", value));
            Ok(f64::NAN)
        }
    }
}

fn describe_separators(separators: &[char]) -> String {
    if separators.is_empty() {
        return "none".to_string();
    }
    separators
        .iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses `raw` as a boolean.
///
/// `true`/`false` are always accepted; with `boolean.extended` the
/// `boolean.matches` lists are scanned in order (trues first) and the first
/// match wins. Unrecognised or blank input records a diagnostic and yields `false`.
pub fn parse_boolean(raw: &str, diagnostics: &mut Vec<String>, options: &EnvOptions) -> bool {
    let value = raw.trim();
    if value.is_empty() {
        diagnostics.push(
            "You must supply a string representation of a boolean to parse, it cannot be blank!"
                .to_string(),
        );
        return false;
    }

    let mode = options.boolean_case_mode();
    if mode.matches(value, "true") {
        return true;
    }
    if mode.matches(value, "false") {
        return false;
    }

    if options.boolean.extended {
        let (trues, falses) = &options.boolean.matches;
        if trues.iter().any(|candidate| mode.matches(value, candidate)) {
            return true;
        }
        if falses.iter().any(|candidate| mode.matches(value, candidate)) {
            return false;
        }
    }

    diagnostics.push(format!("The value '{}' cannot be parsed as a boolean", value));
    false
}
