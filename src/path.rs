use crate::error::ConfigError;
use crate::field::{FieldDescriptor, ObjectLink};
use crate::registry::Registry;
use std::collections::HashSet;

impl Registry {
    /// Fills every descriptor's `resolved_path` with the property names leading
    /// from an object of type `root_type` down to the field.
    ///
    /// Fields owned by the root resolve to just their property name. Fields of
    /// nested objects are traced upwards through the object links until the
    /// root is reached.
    pub fn set_property_paths(&mut self, root_type: &str) -> Result<(), ConfigError> {
        let links = &self.links;
        for descriptor in self.descriptors.iter_mut() {
            let path = trace_path(links, descriptor, root_type)?;
            log::trace!("{} resolves to {}", descriptor.identity(), path.join("."));
            descriptor.resolved_path = path;
        }
        Ok(())
    }
}

fn trace_path(
    links: &[ObjectLink],
    descriptor: &FieldDescriptor,
    root_type: &str,
) -> Result<Vec<String>, ConfigError> {
    let unresolved = |reason: String| ConfigError::UnresolvedPath {
        field: descriptor.identity(),
        reason,
    };

    // built leaf-first, reversed at the end
    let mut path = vec![descriptor.property.clone()];
    let mut visited = HashSet::new();
    let mut current = descriptor.owner.as_str();

    while current != root_type {
        if !visited.insert(current) {
            return Err(unresolved(format!("object links form a cycle through '{}'", current)));
        }

        let mut parents = links.iter().filter(|link| link.nested_type == current);
        let parent = parents
            .next()
            .ok_or_else(|| unresolved(format!("no object links to '{}'", current)))?;
        if parents.next().is_some() {
            return Err(unresolved(format!(
                "more than one object links to '{}'",
                current
            )));
        }

        path.push(parent.property.clone());
        current = &parent.owner;
    }

    path.reverse();
    Ok(path)
}
