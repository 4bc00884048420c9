//! In-progress new-column entries that are not yet part of the plan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("No draft indexes left for table {0}")]
    Exhausted(String),
}

/// Identifies a draft by its owning table and a per-table sequence number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DraftKey {
    pub table: String,
    pub index: u32,
}

impl DraftKey {
    pub fn new(table: impl Into<String>, index: u32) -> Self {
        Self {
            table: table.into(),
            index,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
}

impl Draft {
    /// A draft can be promoted only once both fields are filled in.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.typ.is_empty()
    }
}

/// Open drafts, plus the next index to hand out per table.
///
/// Indexes are never reused within a table, so a key stays unique even
/// after the draft it named has been confirmed into the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DraftsRepr", into = "DraftsRepr")]
pub struct Drafts {
    entries: BTreeMap<DraftKey, Draft>,
    next_index: BTreeMap<String, u32>,
}

impl Drafts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an empty draft for `table` and return its key.
    ///
    /// Fails once the table's index space is used up; the last index is
    /// never handed out so the counter itself cannot overflow.
    pub fn open(&mut self, table: &str) -> Result<DraftKey, DraftError> {
        let next = self.next_index.entry(table.to_string()).or_insert(0);
        let index = *next;
        *next = index
            .checked_add(1)
            .ok_or_else(|| DraftError::Exhausted(table.to_string()))?;
        let key = DraftKey::new(table, index);
        self.entries.insert(key.clone(), Draft::default());
        Ok(key)
    }

    pub fn get(&self, key: &DraftKey) -> Option<&Draft> {
        self.entries.get(key)
    }

    /// Returns false when the draft does not exist.
    pub fn set_name(&mut self, key: &DraftKey, name: &str) -> bool {
        match self.entries.get_mut(key) {
            Some(draft) => {
                draft.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Returns false when the draft does not exist.
    pub fn set_type(&mut self, key: &DraftKey, typ: &str) -> bool {
        match self.entries.get_mut(key) {
            Some(draft) => {
                draft.typ = typ.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &DraftKey) -> Option<Draft> {
        self.entries.remove(key)
    }

    /// Open drafts of one table, in creation order.
    pub fn for_table<'a>(&'a self, table: &'a str) -> impl Iterator<Item = (&'a DraftKey, &'a Draft)> {
        self.entries.iter().filter(move |(k, _)| k.table == table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Make sure future keys for `key.table` sort after `key`.
    pub(crate) fn reserve(&mut self, key: &DraftKey) -> Result<(), DraftError> {
        let after = key
            .index
            .checked_add(1)
            .ok_or_else(|| DraftError::Exhausted(key.table.clone()))?;
        let next = self.next_index.entry(key.table.clone()).or_insert(0);
        *next = (*next).max(after);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct DraftEntry {
    #[serde(flatten)]
    key: DraftKey,
    #[serde(flatten)]
    draft: Draft,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftsRepr {
    #[serde(default)]
    entries: Vec<DraftEntry>,
    #[serde(default)]
    next_index: BTreeMap<String, u32>,
}

impl TryFrom<DraftsRepr> for Drafts {
    type Error = DraftError;

    fn try_from(repr: DraftsRepr) -> Result<Self, Self::Error> {
        let mut drafts = Drafts {
            entries: BTreeMap::new(),
            next_index: repr.next_index,
        };
        for entry in repr.entries {
            drafts.reserve(&entry.key)?;
            drafts.entries.insert(entry.key, entry.draft);
        }
        Ok(drafts)
    }
}

impl From<Drafts> for DraftsRepr {
    fn from(drafts: Drafts) -> Self {
        DraftsRepr {
            entries: drafts
                .entries
                .into_iter()
                .map(|(key, draft)| DraftEntry { key, draft })
                .collect(),
            next_index: drafts.next_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_assigns_per_table_indexes() {
        let mut drafts = Drafts::new();
        assert_eq!(drafts.open("Customer").unwrap(), DraftKey::new("Customer", 0));
        assert_eq!(drafts.open("Customer").unwrap(), DraftKey::new("Customer", 1));
        assert_eq!(drafts.open("Order").unwrap(), DraftKey::new("Order", 0));
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts.for_table("Customer").count(), 2);
    }

    #[test]
    fn test_index_not_reused_after_remove() {
        let mut drafts = Drafts::new();
        let first = drafts.open("T").unwrap();
        drafts.remove(&first);
        assert_eq!(drafts.open("T").unwrap(), DraftKey::new("T", 1));
    }

    #[test]
    fn test_set_fields() {
        let mut drafts = Drafts::new();
        let key = drafts.open("T").unwrap();
        assert!(!drafts.get(&key).unwrap().is_complete());
        assert!(drafts.set_name(&key, "Email"));
        assert!(!drafts.get(&key).unwrap().is_complete());
        assert!(drafts.set_type(&key, "varchar"));
        assert!(drafts.get(&key).unwrap().is_complete());
        assert!(!drafts.set_name(&DraftKey::new("T", 9), "x"));
    }

    #[test]
    fn test_json_shape() {
        let mut drafts = Drafts::new();
        let key = drafts.open("T").unwrap();
        drafts.set_name(&key, "Email");
        let json = serde_json::to_value(&drafts).unwrap();
        assert_eq!(json["entries"][0]["table"], "T");
        assert_eq!(json["entries"][0]["index"], 0);
        assert_eq!(json["entries"][0]["name"], "Email");
        assert_eq!(json["entries"][0]["type"], "");
        assert_eq!(json["nextIndex"]["T"], 1);

        let back: Drafts = serde_json::from_value(json).unwrap();
        assert_eq!(back, drafts);
    }

    #[test]
    fn test_decode_without_counters_reserves_keys() {
        let json = r#"{ "entries": [ { "table": "T", "index": 4, "name": "", "type": "" } ] }"#;
        let mut drafts: Drafts = serde_json::from_str(json).unwrap();
        assert_eq!(drafts.open("T").unwrap(), DraftKey::new("T", 5));
    }

    #[test]
    fn test_decode_max_index_is_rejected() {
        let json = r#"{ "entries": [ { "table": "T", "index": 4294967295, "name": "", "type": "" } ] }"#;
        let err = serde_json::from_str::<Drafts>(json).unwrap_err();
        assert!(err.to_string().contains("No draft indexes left for table T"));
    }

    #[test]
    fn test_open_stops_at_last_index() {
        let json = r#"{ "nextIndex": { "T": 4294967294 } }"#;
        let mut drafts: Drafts = serde_json::from_str(json).unwrap();
        assert_eq!(drafts.open("T").unwrap(), DraftKey::new("T", u32::MAX - 1));
        assert!(matches!(drafts.open("T"), Err(DraftError::Exhausted(t)) if t == "T"));
        assert_eq!(drafts.len(), 1);
        assert!(drafts.open("Order").is_ok());
    }
}
