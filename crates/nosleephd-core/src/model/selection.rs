/// Ordered set of volume paths the user picked for keep-awake treatment.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// Insertion-ordered, duplicate-free collection of volume paths.
///
/// Order is kept for display and persistence; membership checks go
/// through the hash index.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    order: Vec<String>,
    index: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path`. Returns `false` if it was already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if !self.index.insert(path.clone()) {
            return false;
        }
        self.order.push(path);
        true
    }

    /// Remove `path`. Returns `false` if it was not present.
    pub fn remove(&mut self, path: &str) -> bool {
        if !self.index.remove(path) {
            return false;
        }
        self.order.retain(|p| p != path);
        true
    }

    /// Insert or remove `path` depending on `selected`.
    pub fn set(&mut self, path: &str, selected: bool) {
        if selected {
            self.insert(path);
        } else {
            self.remove(path);
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains(path)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.order.clone()
    }
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for SelectionSet {}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for path in iter {
            set.insert(path);
        }
        set
    }
}

// Persisted as a plain list; duplicates in a hand-edited file are dropped.
impl Serialize for SelectionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.order.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SelectionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let paths = Vec::<String>::deserialize(deserializer)?;
        Ok(paths.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut set = SelectionSet::new();
        assert!(set.insert("D:\\"));
        assert!(!set.insert("D:\\"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_preserves_insertion_order() {
        let set: SelectionSet = ["E:\\", "C:\\", "D:\\"].into_iter().collect();
        assert_eq!(set.to_vec(), vec!["E:\\", "C:\\", "D:\\"]);
    }

    #[test]
    fn test_remove_and_set() {
        let mut set: SelectionSet = ["C:\\", "D:\\"].into_iter().collect();
        assert!(set.remove("C:\\"));
        assert!(!set.remove("C:\\"));
        assert!(!set.contains("C:\\"));

        set.set("F:\\", true);
        set.set("F:\\", true);
        set.set("D:\\", false);
        assert_eq!(set.to_vec(), vec!["F:\\"]);
    }

    #[test]
    fn test_deserialize_drops_duplicates() {
        let set: SelectionSet = serde_json::from_str(r#"["C:\\", "D:\\", "C:\\"]"#).unwrap();
        assert_eq!(set.to_vec(), vec!["C:\\", "D:\\"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["C:\\","D:\\"]"#);
    }
}
