use crate::error::ConfigError;
use crate::field::{BooleanProp, NumberProp, StringProp};
use crate::registry::Registry;

/// Types that declare how they are mapped from the environment
///
/// Usually implemented by [`define_env!`](crate::define_env).
pub trait EnvSchema {
    fn schema() -> Schema;
}

/// Declaration of a configuration type: its scalar fields and nested objects
///
/// # Example
/// ```rust
/// use envbind::{NumberProp, Schema, StringProp};
///
/// let schema = Schema::new("Env")
///     .string("bcc_address", StringProp::new().key("BCC_EMAIL"))
///     .object(
///         "smtp",
///         Schema::new("Smtp")
///             .string("host", StringProp::new().key("SMTP_HOST"))
///             .number("port", NumberProp::new().key("SMTP_PORT").max(65535.0)),
///     );
///
/// let registry = schema.into_registry().unwrap();
/// assert_eq!(registry.descriptors()[1].resolved_path, ["smtp", "host"]);
/// ```
#[derive(Clone)]
pub struct Schema {
    type_name: String,
    entries: Vec<Entry>,
}

#[derive(Clone)]
enum Entry {
    String(String, StringProp),
    Number(String, NumberProp),
    Boolean(String, BooleanProp),
    Object(String, Schema),
}

impl Schema {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            entries: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn string(mut self, property: impl Into<String>, prop: StringProp) -> Self {
        self.entries.push(Entry::String(property.into(), prop));
        self
    }

    pub fn number(mut self, property: impl Into<String>, prop: NumberProp) -> Self {
        self.entries.push(Entry::Number(property.into(), prop));
        self
    }

    pub fn boolean(mut self, property: impl Into<String>, prop: BooleanProp) -> Self {
        self.entries.push(Entry::Boolean(property.into(), prop));
        self
    }

    /// Adds a property holding a nested configuration object
    pub fn object(mut self, property: impl Into<String>, nested: Schema) -> Self {
        self.entries.push(Entry::Object(property.into(), nested));
        self
    }

    /// Adds every field to `registry`, with this schema as the root scope.
    ///
    /// Each nested object is registered under its own scope, `Type@dotted.path`,
    /// so a nested type can be used by more than one property.
    pub fn register(self, registry: &mut Registry) -> Result<(), ConfigError> {
        let scope = self.type_name.clone();
        self.register_scope(registry, &scope, "")
    }

    fn register_scope(
        self,
        registry: &mut Registry,
        scope: &str,
        prefix: &str,
    ) -> Result<(), ConfigError> {
        for entry in self.entries {
            match entry {
                Entry::String(property, prop) => registry.add_string(scope, &property, prop)?,
                Entry::Number(property, prop) => registry.add_number(scope, &property, prop)?,
                Entry::Boolean(property, prop) => registry.add_boolean(scope, &property, prop)?,
                Entry::Object(property, nested) => {
                    let path = if prefix.is_empty() {
                        property.clone()
                    } else {
                        format!("{}.{}", prefix, property)
                    };
                    let nested_scope = format!("{}@{}", nested.type_name, path);
                    registry.add_object(scope, &property, &nested_scope);
                    nested.register_scope(registry, &nested_scope, &path)?;
                }
            }
        }
        Ok(())
    }

    /// Builds a registry with property paths resolved from this schema as root
    pub fn into_registry(self) -> Result<Registry, ConfigError> {
        let root = self.type_name.clone();
        let mut registry = Registry::new();
        self.register(&mut registry)?;
        registry.set_property_paths(&root)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    fn credentials() -> Schema {
        Schema::new("Credentials")
            .string("user_name", StringProp::new().key("SMTP_USER"))
            .string("password", StringProp::new().key("SMTP_PASSWORD"))
    }

    #[test]
    fn test_register_flat_schema() {
        let mut registry = Registry::new();
        Schema::new("Env")
            .string("name", StringProp::new())
            .number("age", NumberProp::new())
            .boolean("flag", BooleanProp::new())
            .register(&mut registry)
            .unwrap();

        let kinds: Vec<_> = registry.descriptors().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, [ValueKind::String, ValueKind::Number, ValueKind::Boolean]);
        assert!(registry.descriptors().iter().all(|d| d.owner == "Env"));
        assert!(registry.links().is_empty());
    }

    #[test]
    fn test_nested_objects_get_their_own_scope() {
        let mut registry = Registry::new();
        Schema::new("Env")
            .object(
                "smtp",
                Schema::new("Smtp")
                    .string("host", StringProp::new())
                    .object("credentials", credentials()),
            )
            .register(&mut registry)
            .unwrap();

        let owners: Vec<_> = registry.descriptors().iter().map(|d| d.owner.as_str()).collect();
        assert_eq!(
            owners,
            ["Smtp@smtp", "Credentials@smtp.credentials", "Credentials@smtp.credentials"]
        );
        assert_eq!(registry.links()[0].owner, "Env");
        assert_eq!(registry.links()[1].owner, "Smtp@smtp");
    }

    #[test]
    fn test_into_registry_resolves_paths() {
        let registry = Schema::new("Env")
            .string("bcc_address", StringProp::new())
            .object(
                "smtp",
                Schema::new("Smtp").object("credentials", credentials()),
            )
            .into_registry()
            .unwrap();

        let paths: Vec<_> = registry
            .descriptors()
            .iter()
            .map(|d| d.dotted_path())
            .collect();
        assert_eq!(
            paths,
            ["bcc_address", "smtp.credentials.user_name", "smtp.credentials.password"]
        );
    }

    #[test]
    fn test_nested_type_reused_under_two_properties() {
        let smtp = Schema::new("Smtp").string("host", StringProp::new());
        let registry = Schema::new("Env")
            .object("primary", smtp.clone())
            .object("backup", smtp)
            .into_registry()
            .unwrap();

        let paths: Vec<_> = registry
            .descriptors()
            .iter()
            .map(|d| d.dotted_path())
            .collect();
        assert_eq!(paths, ["primary.host", "backup.host"]);
    }

    #[test]
    fn test_invalid_pattern_fails_registration() {
        let result = Schema::new("Env")
            .string("email", StringProp::new().pattern("(["))
            .into_registry();

        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }
}
