use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// OSM tag selector: a feature matches when any listed key carries one of its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    tags: BTreeMap<String, BTreeSet<String>>,
}

impl TagFilter {
    #[must_use]
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut tags: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (key, value) in pairs {
            tags.entry(key.into()).or_default().insert(value.into());
        }
        Self { tags }
    }

    #[must_use]
    pub fn water() -> Self {
        Self::new([("natural", "water"), ("waterway", "riverbank")])
    }

    #[must_use]
    pub fn parks() -> Self {
        Self::new([("leisure", "park"), ("landuse", "grass")])
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    /// Sorted `key=value` list joined with `;`; both keys and values take part.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.pairs()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(";")
    }

    #[must_use]
    pub fn matches(&self, feature_tags: &BTreeMap<String, String>) -> bool {
        self.tags.iter().any(|(key, values)| {
            feature_tags
                .get(key)
                .is_some_and(|value| values.contains(value))
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_is_order_independent() {
        let a = TagFilter::new([("waterway", "riverbank"), ("natural", "water")]);
        let b = TagFilter::water();

        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(b.canonical(), "natural=water;waterway=riverbank");
    }

    #[test]
    fn canonical_form_includes_values() {
        let grass = TagFilter::new([("landuse", "grass")]);
        let forest = TagFilter::new([("landuse", "forest")]);

        assert_ne!(grass.canonical(), forest.canonical());
    }

    #[test]
    fn matches_any_listed_pair() {
        let filter = TagFilter::parks();
        let park = BTreeMap::from([("leisure".to_string(), "park".to_string())]);
        let garden = BTreeMap::from([("leisure".to_string(), "garden".to_string())]);

        assert!(filter.matches(&park));
        assert!(!filter.matches(&garden));
    }
}
