use serde::{Deserialize, Serialize};

/// Options controlling how values are read, coerced and validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvOptions {
    /// Compare strings (choices) case-sensitively (default = true)
    pub case_sensitive: bool,
    /// A value found in the process environment replaces the one from the `.env` file (default = true)
    pub process_env_overwrites: bool,
    /// Abort with a single [`ConfigError::Aborted`](crate::ConfigError::Aborted) instead of
    /// returning a failed result (default = false)
    pub throw_errors: bool,
    pub boolean: BooleanOptions,
    pub number: NumberFormat,
}

impl Default for EnvOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            process_env_overwrites: true,
            throw_errors: false,
            boolean: BooleanOptions::default(),
            number: NumberFormat::default(),
        }
    }
}

impl EnvOptions {
    /// Comparison mode used for `choices`
    pub fn string_case_mode(&self) -> CaseMode {
        if self.case_sensitive {
            CaseMode::Variant
        } else {
            CaseMode::Base
        }
    }

    /// Comparison mode used for boolean literals.
    ///
    /// The boolean-specific flag can only loosen the global one: comparison is
    /// case-sensitive only when both flags ask for it.
    pub fn boolean_case_mode(&self) -> CaseMode {
        if self.case_sensitive && self.boolean.case_sensitive {
            CaseMode::Variant
        } else {
            CaseMode::Base
        }
    }
}

/// Options for parsing boolean values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BooleanOptions {
    /// Accept the extra literals in `matches` (default = true)
    pub extended: bool,
    /// Extra `(trues, falses)` literals, default `([on, yes, 1], [off, no, 0])`
    pub matches: (Vec<String>, Vec<String>),
    /// Parse booleans case-sensitively (default = false)
    pub case_sensitive: bool,
}

impl Default for BooleanOptions {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            extended: true,
            matches: (owned(&["on", "yes", "1"]), owned(&["off", "no", "0"])),
            case_sensitive: false,
        }
    }
}

/// Locale rules for parsing numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub decimal_point: char,
    /// Grouping characters that are skipped while parsing
    pub thousands_separators: Vec<char>,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_point: '.',
            thousands_separators: vec![','],
        }
    }
}

impl NumberFormat {
    /// `1.234.567,89` and `1 234 567,89`
    pub fn european() -> Self {
        Self {
            decimal_point: ',',
            thousands_separators: vec!['.', ' '],
        }
    }
}

/// How two strings are compared
///
/// `Base` folds both sides with the Unicode lowercase mapping
/// (`str::to_lowercase`) before comparing. Accented letters are not folded
/// onto their base letter, so `é` and `e` stay distinct in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    /// Exact comparison
    Variant,
    /// Case-insensitive comparison
    Base,
}

impl CaseMode {
    pub fn matches(self, left: &str, right: &str) -> bool {
        match self {
            CaseMode::Variant => left == right,
            CaseMode::Base => left == right || fold(left) == fold(right),
        }
    }
}

/// Case-folds `value` for [`CaseMode::Base`] comparisons
pub fn fold(value: &str) -> String {
    value.to_lowercase()
}
