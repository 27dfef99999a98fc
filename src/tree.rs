use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value as Json};

/// The root configuration object while it is being assembled
///
/// Values are addressed by property path; lookups accept dotted paths such as
/// `smtp.credentials.user_name`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvTree {
    root: Map<String, Json>,
}

impl EnvTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an instantiated object, e.g. `T::default()`
    pub fn from_object<T: Serialize>(object: &T) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(object)? {
            Json::Object(root) => Ok(Self { root }),
            _ => Ok(Self::default()),
        }
    }

    /// Writes `value` at `path`, creating intermediate objects as needed
    pub fn insert(&mut self, path: &[String], value: Json) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };

        let mut current = &mut self.root;
        for segment in parents {
            let entry = current
                .entry(segment.clone())
                .or_insert_with(|| Json::Object(Map::new()));
            if !entry.is_object() {
                *entry = Json::Object(Map::new());
            }
            current = match entry {
                Json::Object(map) => map,
                _ => unreachable!("entry was just made an object"),
            };
        }
        current.insert(last.clone(), value);
    }

    pub fn get(&self, path: &str) -> Option<&Json> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Whether every segment of `path` names an existing property
    pub fn contains_path(&self, path: &[String]) -> bool {
        let Some((first, rest)) = path.split_first() else {
            return false;
        };
        let mut current = match self.root.get(first) {
            Some(value) => value,
            None => return false,
        };
        for segment in rest {
            match current.as_object().and_then(|map| map.get(segment)) {
                Some(value) => current = value,
                None => return false,
            }
        }
        true
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Json::as_str)
    }

    pub fn get_number(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(Json::as_f64)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Json::as_bool)
    }

    pub fn as_map(&self) -> &Map<String, Json> {
        &self.root
    }

    /// Deserializes the assembled object
    pub fn into_object<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Json::Object(self.root))
    }
}
