use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where a raw value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The `.env` file
    Base,
    /// The process environment
    Override,
}

/// The raw key/value tables consulted during a pass
#[derive(Debug, Clone, Default)]
pub struct Sources {
    base: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl Sources {
    pub fn from_maps(base: HashMap<String, String>, overrides: HashMap<String, String>) -> Self {
        Self { base, overrides }
    }

    /// Reads the env file at `path` and, when `with_process_env` is set, snapshots the process environment.
    ///
    /// Returns the diagnostic to report when the file cannot be read.
    pub fn load(path: &Path, with_process_env: bool) -> Result<Self, String> {
        let base = read_env_file(path)?;
        let overrides = if with_process_env {
            process_env()
        } else {
            HashMap::new()
        };
        log::debug!(
            "loaded {} value(s) from {} and {} from the process environment",
            base.len(),
            path.display(),
            overrides.len()
        );
        Ok(Self { base, overrides })
    }

    /// Looks up `key`, letting the process environment win when `overrides_win` is set.
    ///
    /// Blank values count as absent in both tables.
    pub fn lookup(&self, key: &str, overrides_win: bool) -> Option<(&str, Origin)> {
        if overrides_win && let Some(value) = present(&self.overrides, key) {
            return Some((value, Origin::Override));
        }
        present(&self.base, key).map(|value| (value, Origin::Base))
    }
}

fn present<'a>(table: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    table
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

/// `<current dir>/.env`
pub fn default_env_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join(".env"))
        .unwrap_or_else(|_| PathBuf::from(".env"))
}

/// Reads an env file into a map; later duplicates overwrite earlier ones
///
/// Lines are trimmed, blank lines and `#` comments are skipped, and the rest
/// is split on the first `=`. Values are taken verbatim: no quoting, escaping,
/// inline comments or variable expansion. Lines without `=` are ignored.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, String> {
    let contents = fs::read_to_string(path).map_err(|error| {
        if error.kind() == io::ErrorKind::NotFound {
            format!("The .env file ({}) does not exist", path.display())
        } else {
            format!("There was a problem reading the .env file ({})", error)
        }
    })?;
    Ok(parse_env_lines(&contents))
}

fn parse_env_lines(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Snapshot of the process environment, skipping entries that are not valid UTF-8
pub fn process_env() -> HashMap<String, String> {
    env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_read_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# a comment").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "FIRST_NAME=Francis").unwrap();
        writeln!(file, "SURNAME=Judge").unwrap();
        writeln!(file, "URL=http://host/?a=b").unwrap();
        writeln!(file, "FIRST_NAME=Frank").unwrap();

        let values = read_env_file(file.path()).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values["FIRST_NAME"], "Frank");
        assert_eq!(values["SURNAME"], "Judge");
        assert_eq!(values["URL"], "http://host/?a=b");
    }

    #[test]
    fn test_values_are_taken_verbatim() {
        let values = parse_env_lines(
            "PASSWORD=pa$word\nGREETING=it is\nAPOS=it's\nLIMIT=10 # ten\nQUOTED=\"hello\"\n",
        );

        assert_eq!(values["PASSWORD"], "pa$word");
        assert_eq!(values["GREETING"], "it is");
        assert_eq!(values["APOS"], "it's");
        assert_eq!(values["LIMIT"], "10 # ten");
        assert_eq!(values["QUOTED"], "\"hello\"");
    }

    #[test]
    fn test_lines_are_trimmed_and_filtered() {
        let values = parse_env_lines("  KEY=value  \r\n\n   # KEY=comment\nNO_EQUALS\nEMPTY=\n");

        assert_eq!(values.len(), 2);
        assert_eq!(values["KEY"], "value");
        assert_eq!(values["EMPTY"], "");
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();

        let error = read_env_file(dir.path()).unwrap_err();
        assert!(error.starts_with("There was a problem reading the .env file"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.env");

        let error = read_env_file(&path).unwrap_err();
        assert!(error.contains("does not exist"));
        assert!(error.contains("missing.env"));
    }

    #[test]
    fn test_override_wins_when_enabled() {
        let sources = Sources::from_maps(map(&[("KEY", "file")]), map(&[("KEY", "process")]));

        assert_eq!(sources.lookup("KEY", true), Some(("process", Origin::Override)));
        assert_eq!(sources.lookup("KEY", false), Some(("file", Origin::Base)));
    }

    #[test]
    fn test_override_only_value() {
        let sources = Sources::from_maps(HashMap::new(), map(&[("KEY", "process")]));

        assert_eq!(sources.lookup("KEY", true), Some(("process", Origin::Override)));
        assert_eq!(sources.lookup("KEY", false), None);
    }

    #[test]
    fn test_blank_values_are_absent() {
        let sources = Sources::from_maps(map(&[("KEY", "file"), ("EMPTY", "")]), map(&[("KEY", "  ")]));

        assert_eq!(sources.lookup("KEY", true), Some(("file", Origin::Base)));
        assert_eq!(sources.lookup("EMPTY", true), None);
        assert_eq!(sources.lookup("MISSING", true), None);
    }

    #[test]
    fn test_load_without_process_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ONLY_IN_FILE=1").unwrap();

        temp_env::with_var("ENVBIND_SOURCE_TEST", Some("x"), || {
            let sources = Sources::load(file.path(), false).unwrap();
            assert_eq!(sources.lookup("ENVBIND_SOURCE_TEST", true), None);
            assert!(sources.lookup("ONLY_IN_FILE", true).is_some());

            let sources = Sources::load(file.path(), true).unwrap();
            assert_eq!(
                sources.lookup("ENVBIND_SOURCE_TEST", true),
                Some(("x", Origin::Override))
            );
        });
    }

    #[test]
    fn test_default_env_path() {
        assert!(default_env_path().ends_with(".env"));
    }
}
