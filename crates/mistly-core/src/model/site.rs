// ── Site lookup ──

use std::collections::HashMap;

/// Site id → display name, built once per run from the site listing.
///
/// Display only; the join never keys on sites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteLookup {
    names: HashMap<String, String>,
}

impl SiteLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listed site. Sites without an id are ignored; sites
    /// without a name get `Unknown Site (<id prefix>)`.
    pub fn insert(&mut self, id: &str, name: Option<&str>) {
        if id.is_empty() {
            return;
        }
        let name = name.map_or_else(
            || format!("Unknown Site ({})", id_prefix(id)),
            str::to_owned,
        );
        self.names.insert(id.to_owned(), name);
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Display name for a site referenced by an activity record.
    ///
    /// Unlisted ids render as `Unknown Site (<id prefix>...)`; an empty id
    /// renders as `No Site`.
    pub fn display_name(&self, id: &str) -> String {
        if let Some(name) = self.get(id) {
            return name.to_owned();
        }
        if id.is_empty() {
            "No Site".to_owned()
        } else {
            format!("Unknown Site ({}...)", id_prefix(id))
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for SiteLookup {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut lookup = Self::new();
        for (id, name) in iter {
            lookup.insert(id, Some(name));
        }
        lookup
    }
}

/// First eight characters of a site id.
fn id_prefix(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(idx, _)| &id[..idx])
}
