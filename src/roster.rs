//! Predefined NPCs
//!
//! The roster is read-only once loaded from configuration and is handed to
//! whoever needs it; nothing here is global.

use indexmap::IndexMap;

use crate::personality::PersonalityRecord;

/// A named NPC with a fixed personality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Npc {
    pub name: String,
    pub record: PersonalityRecord,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: IndexMap<String, PersonalityRecord>,
}

impl Roster {
    pub fn new(entries: IndexMap<String, PersonalityRecord>) -> Self {
        Self { entries }
    }

    /// Built-in entries used when the config file defines none
    pub fn builtin() -> IndexMap<String, PersonalityRecord> {
        IndexMap::from([
            ("blacksmith".to_string(), PersonalityRecord::new(70, 50, 60, 40, 80)),
            ("merchant".to_string(), PersonalityRecord::new(30, 70, 40, 70, 20)),
        ])
    }

    /// Look up an NPC by name, ignoring case
    pub fn get(&self, name: &str) -> Option<Npc> {
        let wanted = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(key, _)| key.to_lowercase() == wanted)
            .map(|(key, record)| Npc {
                name: key.clone(),
                record: *record,
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PersonalityRecord)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
