pub mod error;
pub mod field;
pub mod options;
pub mod parse;
mod path;
pub mod registry;
pub mod resolver;
pub mod result;
pub mod schema;
pub mod source;
pub mod tree;
pub mod value;

use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

// Re-export main types
pub use error::{ConfigError, format_config_errors};
pub use field::{BooleanProp, FieldDescriptor, NumberProp, ObjectLink, StringProp};
pub use options::{BooleanOptions, CaseMode, EnvOptions, NumberFormat};
pub use parse::{parse_boolean, parse_number};
pub use registry::Registry;
pub use result::EnvResult;
pub use schema::{EnvSchema, Schema};
pub use source::Sources;
pub use tree::EnvTree;
pub use value::{Value, ValueKind};

// Re-export macro
pub use envbind_macros::define_env;

/// Loads `T` from the env file at `path` (default `<current dir>/.env`),
/// overridden by the process environment.
///
/// Problems with the file or with individual values are returned as
/// diagnostics inside the [`EnvResult`]. `Err` is returned for declaration
/// defects, and for any diagnostics when `options.throw_errors` is set.
pub fn initialize<T>(options: &EnvOptions, path: Option<&Path>) -> Result<EnvResult<T>, ConfigError>
where
    T: EnvSchema + Default + Serialize + DeserializeOwned,
{
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(source::default_env_path);

    match Sources::load(&path, options.process_env_overwrites) {
        Ok(sources) => initialize_from_sources(&sources, options),
        Err(diagnostic) => resolver::settle(EnvResult::create_failure(vec![diagnostic]), options),
    }
}

/// Loads `T` from already collected sources
pub fn initialize_from_sources<T>(
    sources: &Sources,
    options: &EnvOptions,
) -> Result<EnvResult<T>, ConfigError>
where
    T: EnvSchema + Default + Serialize + DeserializeOwned,
{
    let mut registry = T::schema().into_registry()?;
    let result = resolver::run(&mut registry, sources, options);
    registry.clear();
    result
}

/// Loading entry points for every type declared with [`define_env!`]
pub trait Load: Sized {
    /// Load with explicit options and env file
    fn initialize(options: &EnvOptions, path: Option<&Path>) -> Result<EnvResult<Self>, ConfigError>;

    /// Load from `./.env` and the process environment, panicking on errors
    fn load() -> Self;

    /// Load from `./.env` and the process environment, returning errors instead of panicking
    fn load_or_error() -> Result<Self, Vec<String>>;

    /// Registry with resolved paths, for documentation generation (without loading values)
    fn registry_for_docs() -> Result<Registry, ConfigError>;
}

impl<T> Load for T
where
    T: EnvSchema + Default + Serialize + DeserializeOwned,
{
    fn initialize(options: &EnvOptions, path: Option<&Path>) -> Result<EnvResult<Self>, ConfigError> {
        crate::initialize(options, path)
    }

    fn load() -> Self {
        match Self::load_or_error() {
            Ok(env) => env,
            Err(errors) => panic!("{}", format_config_errors(&errors)),
        }
    }

    fn load_or_error() -> Result<Self, Vec<String>> {
        match crate::initialize::<Self>(&EnvOptions::default(), None) {
            Ok(result) => result.into_result(),
            Err(ConfigError::Aborted { errors }) => Err(errors),
            Err(e) => Err(vec![e.to_string()]),
        }
    }

    fn registry_for_docs() -> Result<Registry, ConfigError> {
        T::schema().into_registry()
    }
}
