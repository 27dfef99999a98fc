use crate::error::ConfigError;
use crate::field::{BooleanProp, FieldDescriptor, NumberProp, ObjectLink, StringProp};
use crate::value::ValueKind;
use regex::Regex;
use std::{fs, path::Path};

/// Table of field descriptors and object links for one configuration type
///
/// Descriptors are kept in registration order, which fixes the order of
/// diagnostics. Re-adding a field with the same owner and property replaces
/// the earlier declaration in place.
///
/// # Example
/// ```rust
/// use envbind::{NumberProp, Registry, StringProp};
///
/// let mut registry = Registry::new();
/// registry.add_string("Env", "bcc", StringProp::new().key("BCC_EMAIL")).unwrap();
/// registry.add_object("Env", "smtp", "Smtp");
/// registry.add_number("Smtp", "port", NumberProp::new().key("SMTP_PORT")).unwrap();
/// registry.set_property_paths("Env").unwrap();
///
/// assert_eq!(registry.descriptors()[1].resolved_path, ["smtp", "port"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub(crate) descriptors: Vec<FieldDescriptor>,
    pub(crate) links: Vec<ObjectLink>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a string field, compiling its pattern
    pub fn add_string(
        &mut self,
        owner: &str,
        property: &str,
        prop: StringProp,
    ) -> Result<(), ConfigError> {
        let mut descriptor = FieldDescriptor::new(owner, property, ValueKind::String, prop.common);
        if let Some(pattern) = prop.pattern {
            let compiled = Regex::new(&pattern).map_err(|e| ConfigError::InvalidPattern {
                key: descriptor.source_key.clone(),
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            descriptor.pattern = Some(compiled);
        }
        descriptor.choices = prop.choices;
        self.insert(descriptor);
        Ok(())
    }

    pub fn add_number(
        &mut self,
        owner: &str,
        property: &str,
        prop: NumberProp,
    ) -> Result<(), ConfigError> {
        let mut descriptor = FieldDescriptor::new(owner, property, ValueKind::Number, prop.common);
        descriptor.min = prop.min;
        descriptor.max = prop.max;
        self.insert(descriptor);
        Ok(())
    }

    pub fn add_boolean(
        &mut self,
        owner: &str,
        property: &str,
        prop: BooleanProp,
    ) -> Result<(), ConfigError> {
        self.insert(FieldDescriptor::new(
            owner,
            property,
            ValueKind::Boolean,
            prop.common,
        ));
        Ok(())
    }

    /// Records that `owner.property` holds an object whose fields are registered under `nested_type`
    pub fn add_object(&mut self, owner: &str, property: &str, nested_type: &str) {
        let link = ObjectLink {
            owner: owner.to_string(),
            property: property.to_string(),
            nested_type: nested_type.to_string(),
        };
        match self
            .links
            .iter_mut()
            .find(|l| l.owner == owner && l.property == property)
        {
            Some(existing) => *existing = link,
            None => self.links.push(link),
        }
    }

    fn insert(&mut self, descriptor: FieldDescriptor) {
        match self
            .descriptors
            .iter_mut()
            .find(|d| d.owner == descriptor.owner && d.property == descriptor.property)
        {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    /// All descriptors in registration order
    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub(crate) fn descriptors_mut(&mut self) -> &mut [FieldDescriptor] {
        &mut self.descriptors
    }

    pub fn links(&self) -> &[ObjectLink] {
        &self.links
    }

    pub fn get(&self, owner: &str, property: &str) -> Option<&FieldDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.owner == owner && d.property == property)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Empties both the descriptor and the object link tables
    pub fn clear(&mut self) {
        self.descriptors.clear();
        self.links.clear();
    }

    /// Renders a markdown table documenting every registered variable
    pub fn render_docs(&self) -> String {
        let mut md = String::new();

        md.push_str("## Environment Variables Summary\n\n");
        md.push_str("| Variable | Property | Type | Required | Default | Constraints | Description |\n");
        md.push_str("|----------|----------|------|----------|---------|-------------|-------------|\n");
        for field in &self.descriptors {
            let required_str = if field.has_condition() {
                "Conditional"
            } else if field.is_optional || field.default_supplier.is_some() {
                "No"
            } else {
                "Yes"
            };
            let default_display = field
                .default_value()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                field.source_key,
                field.dotted_path(),
                field.kind,
                required_str,
                escape_cell(&default_display),
                escape_cell(&describe_constraints(field)),
                escape_cell(&field.description),
            ));
        }

        md
    }

    /// Writes [`render_docs`](Self::render_docs) to a file
    pub fn write_docs(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        fs::write(path, self.render_docs())
    }
}

fn describe_constraints(field: &FieldDescriptor) -> String {
    let mut parts = Vec::new();
    if !field.choices.is_empty() {
        parts.push(format!("one of: {}", field.choices.join(", ")));
    }
    if let Some(pattern) = &field.pattern {
        parts.push(format!("matches `{}`", pattern.as_str()));
    }
    if let Some(min) = field.min {
        parts.push(format!("min {}", min));
    }
    if let Some(max) = field.max {
        parts.push(format!("max {}", max));
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join("; ")
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_new() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.links().is_empty());
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = Registry::new();
        registry.add_string("Env", "b", StringProp::new()).unwrap();
        registry.add_number("Env", "a", NumberProp::new()).unwrap();
        registry.add_boolean("Env", "c", BooleanProp::new()).unwrap();

        let properties: Vec<_> = registry
            .descriptors()
            .iter()
            .map(|d| d.property.as_str())
            .collect();
        assert_eq!(properties, ["b", "a", "c"]);
        assert_eq!(registry.descriptors()[1].kind, ValueKind::Number);
    }

    #[test]
    fn test_redeclaring_replaces_in_place() {
        let mut registry = Registry::new();
        registry.add_string("Env", "a", StringProp::new().key("OLD")).unwrap();
        registry.add_string("Env", "b", StringProp::new()).unwrap();
        registry.add_string("Env", "a", StringProp::new().key("NEW")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.descriptors()[0].source_key, "NEW");
    }

    #[test]
    fn test_same_property_on_different_owners() {
        let mut registry = Registry::new();
        registry.add_string("Smtp", "host", StringProp::new().key("SMTP_HOST")).unwrap();
        registry.add_string("Imap", "host", StringProp::new().key("IMAP_HOST")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("Imap", "host").unwrap().source_key, "IMAP_HOST");
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut registry = Registry::new();
        let result = registry.add_string("Env", "email", StringProp::new().pattern("(["));

        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_number_bounds_are_normalized() {
        let mut registry = Registry::new();
        registry
            .add_number("Env", "age", NumberProp::new().min(16.0))
            .unwrap();

        let field = registry.get("Env", "age").unwrap();
        assert_eq!(field.min, Some(16.0));
        assert_eq!(field.max, None);
    }

    #[test]
    fn test_clear_empties_both_tables() {
        let mut registry = Registry::new();
        registry.add_object("Env", "smtp", "Smtp");
        registry.add_string("Smtp", "host", StringProp::new()).unwrap();

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.links().is_empty());
    }

    #[test]
    fn test_render_docs() {
        let mut registry = Registry::new();
        registry
            .add_string(
                "Env",
                "node_env",
                StringProp::new()
                    .key("NODE_ENV")
                    .doc("Runtime environment")
                    .choices(["development", "production"])
                    .default_with(|| "development".to_string()),
            )
            .unwrap();
        registry
            .add_number("Env", "age", NumberProp::new().key("AGE").min(16.0).optional_if(|_| true))
            .unwrap();

        let md = registry.render_docs();
        assert!(md.contains(
            "| NODE_ENV | node_env | string | No | development | one of: development, production | Runtime environment |"
        ));
        assert!(md.contains("| AGE | age | number | Conditional | - | min 16 |  |"));
    }

    #[test]
    fn test_render_docs_escapes_pipes() {
        let mut registry = Registry::new();
        registry
            .add_string("Env", "mode", StringProp::new().pattern("^(a|b)$"))
            .unwrap();

        assert!(registry.render_docs().contains("matches `^(a\\|b)$`"));
    }
}
