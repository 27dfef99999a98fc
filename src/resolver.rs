//! The resolution pass: read every field's raw value, coerce it, assemble the
//! root object and validate the result.

use crate::error::ConfigError;
use crate::field::FieldDescriptor;
use crate::options::EnvOptions;
use crate::parse::{parse_boolean, parse_number};
use crate::registry::Registry;
use crate::result::EnvResult;
use crate::source::{Origin, Sources};
use crate::tree::EnvTree;
use crate::value::{Value, ValueKind};
use serde::{Serialize, de::DeserializeOwned};

/// Collects diagnostics while resolving and validating the fields of a registry
pub struct Resolver<'a> {
    options: &'a EnvOptions,
    diagnostics: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(options: &'a EnvOptions) -> Self {
        Self {
            options,
            diagnostics: Vec::new(),
        }
    }

    /// Fills `resolved_value` for every field: override source, then base
    /// source, then the declared default.
    pub fn resolve(&mut self, registry: &mut Registry, sources: &Sources) {
        for descriptor in registry.descriptors_mut() {
            let raw = sources.lookup(&descriptor.source_key, self.options.process_env_overwrites);
            descriptor.resolved_value = match raw {
                Some((raw, origin)) => {
                    log::debug!(
                        "{} <- {} ({})",
                        descriptor.dotted_path(),
                        descriptor.source_key,
                        match origin {
                            Origin::Base => "env file",
                            Origin::Override => "process environment",
                        }
                    );
                    self.coerce(descriptor, raw)
                }
                None => {
                    let fallback = descriptor.default_value();
                    if fallback.is_some() {
                        log::debug!("{} <- default", descriptor.dotted_path());
                    }
                    fallback
                }
            };
        }
    }

    fn coerce(&mut self, descriptor: &FieldDescriptor, raw: &str) -> Option<Value> {
        let mut problems = Vec::new();
        let value = match descriptor.kind {
            ValueKind::String => Some(Value::String(raw.to_string())),
            ValueKind::Number => {
                match parse_number(raw, &mut problems, &self.options.number) {
                    Ok(number) => Some(Value::Number(number)),
                    // blank text is no value at all
                    Err(_) => None,
                }
            }
            ValueKind::Boolean => Some(Value::Boolean(parse_boolean(
                raw,
                &mut problems,
                self.options,
            ))),
        };
        self.diagnostics.extend(
            problems
                .into_iter()
                .map(|problem| format!("{}: {}", descriptor.source_key, problem)),
        );
        value
    }

    /// Writes every resolved value into `tree` at the field's property path
    pub fn assemble(&self, registry: &Registry, tree: &mut EnvTree) {
        for descriptor in registry.descriptors() {
            if let Some(value) = &descriptor.resolved_value {
                tree.insert(&descriptor.resolved_path, value.to_json());
            }
        }
    }

    /// Reports fields whose property path is missing from the serialized
    /// object, e.g. because of a serde rename; their values would be dropped.
    fn check_targets(&mut self, registry: &Registry, tree: &EnvTree) {
        for descriptor in registry.descriptors() {
            if !tree.contains_path(&descriptor.resolved_path) {
                self.diagnostics.push(format!(
                    "The property '{}' ({}) does not exist on the configuration object, check for serde renames",
                    descriptor.dotted_path(),
                    descriptor.source_key
                ));
            }
        }
    }

    /// Second pass, run once every field has resolved and `tree` is assembled
    pub fn validate(&mut self, registry: &mut Registry, tree: &EnvTree) {
        for descriptor in registry.descriptors_mut() {
            if let Some(condition) = &descriptor.conditional_optional {
                let optional = condition(tree);
                descriptor.is_optional = optional;
            }
            self.check(descriptor);
        }
    }

    fn check(&mut self, descriptor: &FieldDescriptor) {
        let path = descriptor.dotted_path();
        let key = &descriptor.source_key;

        match &descriptor.resolved_value {
            None => {
                if !descriptor.is_optional {
                    self.diagnostics.push(format!(
                        "The property '{}' was not marked optional but has no value for '{}' in the .env file or process environment, and no default was supplied.",
                        path, key
                    ));
                }
            }
            Some(Value::String(value)) => {
                let mode = self.options.string_case_mode();
                if !descriptor.choices.is_empty()
                    && !descriptor
                        .choices
                        .iter()
                        .any(|choice| mode.matches(value, choice))
                {
                    self.diagnostics.push(format!(
                        "The value '{}' for property '{}' ({}) must be one of: {}",
                        value,
                        path,
                        key,
                        descriptor.choices.join(", ")
                    ));
                }
                if let Some(pattern) = &descriptor.pattern
                    && !pattern.is_match(value)
                {
                    self.diagnostics.push(format!(
                        "The value '{}' for property '{}' ({}) does not match the pattern /{}/",
                        value,
                        path,
                        key,
                        pattern.as_str()
                    ));
                }
            }
            Some(Value::Number(value)) => {
                if let Some(min) = descriptor.min
                    && *value < min
                {
                    self.diagnostics.push(format!(
                        "The value {} for property '{}' ({}) is less than the minimum of {}",
                        value, path, key, min
                    ));
                }
                if let Some(max) = descriptor.max
                    && *value > max
                {
                    self.diagnostics.push(format!(
                        "The value {} for property '{}' ({}) is greater than the maximum of {}",
                        value, path, key, max
                    ));
                }
            }
            Some(Value::Boolean(_)) => {}
        }
    }

    pub fn into_diagnostics(self) -> Vec<String> {
        self.diagnostics
    }
}

/// Runs a full pass over `registry`, whose property paths must already be resolved.
///
/// The root object starts as `T::default()`; resolved values are written into
/// it before validation so `optional_if` conditions see the final values.
pub fn run<T>(
    registry: &mut Registry,
    sources: &Sources,
    options: &EnvOptions,
) -> Result<EnvResult<T>, ConfigError>
where
    T: Default + Serialize + DeserializeOwned,
{
    let mut resolver = Resolver::new(options);
    resolver.resolve(registry, sources);

    let mut tree = match EnvTree::from_object(&T::default()) {
        Ok(tree) => {
            resolver.check_targets(registry, &tree);
            tree
        }
        Err(e) => {
            resolver
                .diagnostics
                .push(format!("The configuration object could not be instantiated: {}", e));
            EnvTree::new()
        }
    };
    resolver.assemble(registry, &mut tree);
    resolver.validate(registry, &tree);

    let mut diagnostics = resolver.into_diagnostics();
    let result = if diagnostics.is_empty() {
        match tree.into_object::<T>() {
            Ok(env) => EnvResult::create_success(env),
            Err(e) => {
                diagnostics.push(format!(
                    "The loaded values could not be assigned to the configuration object: {}",
                    e
                ));
                EnvResult::create_failure(diagnostics)
            }
        }
    } else {
        EnvResult::create_failure(diagnostics)
    };

    settle(result, options)
}

/// Escalates a failed result to [`ConfigError::Aborted`] when `throw_errors` is set
pub(crate) fn settle<T>(
    result: EnvResult<T>,
    options: &EnvOptions,
) -> Result<EnvResult<T>, ConfigError> {
    if result.has_errors() {
        log::warn!("configuration loaded with {} error(s)", result.errors().len());
        if options.throw_errors {
            return Err(ConfigError::Aborted {
                errors: result.errors().to_vec(),
            });
        }
    }
    Ok(result)
}
