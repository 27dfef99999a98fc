use crate::tree::EnvTree;
use crate::value::{Value, ValueKind};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Produces a fallback value when neither source has one
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Decides, from the assembled root object, whether a field is optional
pub type ConditionFn = Arc<dyn Fn(&EnvTree) -> bool + Send + Sync>;

/// Settings shared by every declaration kind
#[derive(Clone, Default)]
pub(crate) struct Common {
    key: Option<String>,
    doc: Option<String>,
    optional: bool,
    default: Option<DefaultFn>,
    optional_if: Option<ConditionFn>,
}

/// Declaration of a string field
#[derive(Clone, Default)]
pub struct StringProp {
    pub(crate) common: Common,
    pub(crate) choices: Vec<String>,
    pub(crate) pattern: Option<String>,
}

/// Declaration of a numeric field
#[derive(Clone, Default)]
pub struct NumberProp {
    pub(crate) common: Common,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
}

/// Declaration of a boolean field
#[derive(Clone, Default)]
pub struct BooleanProp {
    pub(crate) common: Common,
}

macro_rules! common_builders {
    ($prop:ty, $value:ty) => {
        impl $prop {
            pub fn new() -> Self {
                Self::default()
            }

            /// Name of the variable in the `.env` file or process environment,
            /// defaults to the property name
            pub fn key(mut self, key: impl Into<String>) -> Self {
                self.common.key = Some(key.into());
                self
            }

            /// Human-readable description, used for generated docs
            pub fn doc(mut self, doc: impl Into<String>) -> Self {
                self.common.doc = Some(doc.into());
                self
            }

            pub fn optional(mut self) -> Self {
                self.common.optional = true;
                self
            }

            /// Fallback used when no source supplies a value
            pub fn default_with<F>(mut self, supplier: F) -> Self
            where
                F: Fn() -> $value + Send + Sync + 'static,
            {
                self.common.default = Some(Arc::new(move || Value::from(supplier())));
                self
            }

            /// Re-decides optionality once every field has resolved
            pub fn optional_if<F>(mut self, condition: F) -> Self
            where
                F: Fn(&EnvTree) -> bool + Send + Sync + 'static,
            {
                self.common.optional_if = Some(Arc::new(condition));
                self
            }
        }
    };
}

common_builders!(StringProp, String);
common_builders!(NumberProp, f64);
common_builders!(BooleanProp, bool);

impl StringProp {
    /// Allowed values
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Regular expression the value must match
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

impl NumberProp {
    /// Inclusive lower bound
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

/// The normalized rules for locating, parsing and validating one field
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Scope identity of the object that owns the field
    pub owner: String,
    /// Declared property name
    pub property: String,
    /// Variable name looked up in the sources
    pub source_key: String,
    pub kind: ValueKind,
    pub description: String,
    pub is_optional: bool,
    pub choices: Vec<String>,
    pub pattern: Option<Regex>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Filled during a resolution pass
    pub resolved_value: Option<Value>,
    /// Property names from the root object down to this field
    pub resolved_path: Vec<String>,
    pub(crate) default_supplier: Option<DefaultFn>,
    pub(crate) conditional_optional: Option<ConditionFn>,
}

impl FieldDescriptor {
    pub(crate) fn new(owner: &str, property: &str, kind: ValueKind, common: Common) -> Self {
        Self {
            owner: owner.to_string(),
            property: property.to_string(),
            source_key: common.key.unwrap_or_else(|| property.to_string()),
            kind,
            description: common.doc.unwrap_or_default(),
            is_optional: common.optional,
            choices: Vec::new(),
            pattern: None,
            min: None,
            max: None,
            resolved_value: None,
            resolved_path: Vec::new(),
            default_supplier: common.default,
            conditional_optional: common.optional_if,
        }
    }

    /// `Owner.property`
    pub fn identity(&self) -> String {
        format!("{}.{}", self.owner, self.property)
    }

    /// Resolved path joined with dots, or the property name before paths are resolved
    pub fn dotted_path(&self) -> String {
        if self.resolved_path.is_empty() {
            self.property.clone()
        } else {
            self.resolved_path.join(".")
        }
    }

    pub fn default_value(&self) -> Option<Value> {
        self.default_supplier.as_ref().map(|supplier| supplier())
    }

    pub fn has_condition(&self) -> bool {
        self.conditional_optional.is_some()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("owner", &self.owner)
            .field("property", &self.property)
            .field("source_key", &self.source_key)
            .field("kind", &self.kind)
            .field("is_optional", &self.is_optional)
            .field("has_default", &self.default_supplier.is_some())
            .field("has_condition", &self.conditional_optional.is_some())
            .field("choices", &self.choices)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("min", &self.min)
            .field("max", &self.max)
            .field("resolved_value", &self.resolved_value)
            .field("resolved_path", &self.resolved_path)
            .finish()
    }
}

/// A property that holds a nested configuration object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLink {
    pub owner: String,
    pub property: String,
    pub nested_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_key_defaults_to_property() {
        let prop = StringProp::new();
        let field = FieldDescriptor::new("Env", "NODE_ENV", ValueKind::String, prop.common);

        assert_eq!(field.source_key, "NODE_ENV");
        assert_eq!(field.identity(), "Env.NODE_ENV");
        assert!(!field.is_optional);
        assert!(field.default_value().is_none());
    }

    #[test]
    fn test_common_settings_are_carried() {
        let prop = NumberProp::new()
            .key("TEST_INT")
            .doc("An integer")
            .optional()
            .default_with(|| 42.0);
        let field = FieldDescriptor::new("Env", "age", ValueKind::Number, prop.common);

        assert_eq!(field.source_key, "TEST_INT");
        assert_eq!(field.description, "An integer");
        assert!(field.is_optional);
        assert_eq!(field.default_value(), Some(Value::Number(42.0)));
    }

    #[test]
    fn test_string_constraints() {
        let prop = StringProp::new()
            .choices(["development", "production"])
            .pattern("^d");

        assert_eq!(prop.choices, vec!["development", "production"]);
        assert_eq!(prop.pattern.as_deref(), Some("^d"));
    }

    #[test]
    fn test_number_bounds() {
        let prop = NumberProp::new().min(16.0).max(99.0);
        assert_eq!(prop.min, Some(16.0));
        assert_eq!(prop.max, Some(99.0));
    }

    #[test]
    fn test_boolean_default() {
        let prop = BooleanProp::new().default_with(|| true);
        let field = FieldDescriptor::new("Env", "TEST_BOOL", ValueKind::Boolean, prop.common);
        assert_eq!(field.default_value(), Some(Value::Boolean(true)));
    }

    #[test]
    fn test_dotted_path() {
        let mut field =
            FieldDescriptor::new("Smtp", "host", ValueKind::String, StringProp::new().common);
        assert_eq!(field.dotted_path(), "host");

        field.resolved_path = vec!["smtp".to_string(), "host".to_string()];
        assert_eq!(field.dotted_path(), "smtp.host");
    }

    #[test]
    fn test_debug_hides_closures() {
        let prop = BooleanProp::new().optional_if(|_| true);
        let field = FieldDescriptor::new("Env", "flag", ValueKind::Boolean, prop.common);

        let debug_output = format!("{:?}", field);
        assert!(debug_output.contains("has_condition: true"));
        assert!(field.has_condition());
    }
}
