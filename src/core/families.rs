use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// Case-insensitive mapping from a canonical value to the values considered
/// compatible with it.
///
/// Lookups are directional: `is_compatible("studio", "flat")` consults the
/// entry for `studio` only. Groups built with [`CompatibilityTable::from_groups`]
/// are symmetric because every member gets an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityTable {
    entries: HashMap<String, HashSet<String>>,
}

impl CompatibilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `compatible` to the entry for `canonical`
    pub fn insert<I, S>(&mut self, canonical: &str, compatible: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = canonical.trim().to_lowercase();
        let entry = self.entries.entry(key.clone()).or_default();
        for value in compatible {
            let value = value.as_ref().trim().to_lowercase();
            if !value.is_empty() && value != key {
                entry.insert(value);
            }
        }
    }

    /// Build a directional table from `canonical -> compatible values`
    pub fn from_map<K, V, S>(map: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (canonical, compatible) in map {
            table.insert(canonical.as_ref(), compatible);
        }
        table
    }

    /// Build a symmetric table where every member of a group is compatible
    /// with every other member
    pub fn from_groups<G, S>(groups: impl IntoIterator<Item = G>) -> Self
    where
        G: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for group in groups {
            let members: Vec<String> = group
                .into_iter()
                .map(|m| m.as_ref().to_string())
                .collect();
            for member in &members {
                table.insert(member, &members);
            }
        }
        table
    }

    /// Default property-type families
    pub fn default_property_types() -> Self {
        Self::from_map(default_property_type_families())
    }

    /// True when `candidate` is listed as compatible with `preferred`, or is
    /// a case variant of a `preferred` that has an entry.
    pub fn is_compatible(&self, preferred: &str, candidate: &str) -> bool {
        let preferred = preferred.trim().to_lowercase();
        let candidate = candidate.trim().to_lowercase();
        match self.entries.get(&preferred) {
            Some(set) => preferred == candidate || set.contains(&candidate),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Hash for CompatibilityTable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let ordered: BTreeMap<&String, BTreeSet<&String>> = self
            .entries
            .iter()
            .map(|(key, values)| (key, values.iter().collect()))
            .collect();
        ordered.hash(state);
    }
}

/// Preferred type -> listed types that earn partial credit
pub fn default_property_type_families() -> Vec<(String, Vec<String>)> {
    [
        ("apartment", &["flat", "condo"][..]),
        ("flat", &["apartment", "condo"][..]),
        ("condo", &["apartment", "flat"][..]),
        ("house", &["villa", "bungalow"][..]),
        ("villa", &["house", "bungalow"][..]),
        ("bungalow", &["house", "villa"][..]),
        ("studio", &["apartment", "flat"][..]),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
    .collect()
}
