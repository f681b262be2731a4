use std::fmt;

/// Context attached to log lines, rendered as `key=value` pairs.
///
/// Inserting a key that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(&'static str, String)>);

impl Fields {
    pub fn new() -> Fields {
        Fields::default()
    }

    pub fn insert<V: ToString>(&mut self, key: &'static str, value: V) {
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(field) => field.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn with<V: ToString>(mut self, key: &'static str, value: V) -> Fields {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(k, _)| *k != key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(w, " ")?;
            }
            if value.is_empty() || value.contains(char::is_whitespace) {
                write!(w, "{}={:?}", key, value)?;
            } else {
                write!(w, "{}={}", key, value)?;
            }
        }
        Ok(())
    }
}
