use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Character identifier as assigned by the scene configuration ("bob", "alice").
///
/// Unlike most identifiers these are human-chosen strings, so the newtype
/// wraps a `String` and serializes transparently (it is also a JSON map key).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CharacterId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for CharacterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CharacterId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CharacterId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn character_id_serializes_as_plain_string() {
        let id = CharacterId::new("bob");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"bob\"");
    }

    #[test]
    fn character_id_works_as_map_key_with_str_lookup() {
        let mut map = BTreeMap::new();
        map.insert(CharacterId::new("alice"), 1);
        assert_eq!(map.get("alice"), Some(&1));
        assert!(map.get("bob").is_none());
    }
}
