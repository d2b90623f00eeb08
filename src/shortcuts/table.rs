//! The binding table: single source of truth for name -> accelerator.
//!
//! Every registered action name owns exactly one `ShortcutEntry` holding
//! its current accelerator and a tag recording which registry currently
//! wires the name into live dispatch. Entries are created once, at
//! registration, and live for the process lifetime; rebinding mutates the
//! accelerator in place and persistence never creates new names.
//!
//! Storage is a `BTreeMap` so iteration is always in name order - saved
//! files and listing exports stay diff-friendly across runs.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::accel::Accelerator;

/// Which registry owns the live wiring for a name.
///
/// Key-event registrations keep `Unbound`: the tag records command-style
/// wiring only, and the key-event registry wires press/release itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BindingKind {
    #[default]
    Unbound,
    Command,
    Toggle,
}

/// One name's binding state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutEntry {
    pub accelerator: Accelerator,
    pub kind: BindingKind,
}

/// Name-keyed table of shortcut entries.
#[derive(Debug, Default)]
pub struct BindingTable {
    entries: BTreeMap<String, ShortcutEntry>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry with `kind = Unbound`, or return the existing
    /// accelerator unchanged if `name` is already present. Idempotent: two
    /// subsystems may register the same nominal default without the second
    /// clobbering the first. This is the only creation path.
    pub fn insert(&mut self, name: &str, default: Accelerator) -> &Accelerator {
        let entry = match self.entries.entry(name.to_string()) {
            Entry::Vacant(slot) => slot.insert(ShortcutEntry {
                accelerator: default,
                kind: BindingKind::Unbound,
            }),
            Entry::Occupied(slot) => slot.into_mut(),
        };
        &entry.accelerator
    }

    pub fn find(&self, name: &str) -> Option<&ShortcutEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Record which registry owns the live wiring for `name`.
    /// No-op for names that were never inserted.
    pub fn set_kind(&mut self, name: &str, kind: BindingKind) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.kind = kind;
        }
    }

    /// Overwrite the stored accelerator for `name`.
    /// No-op for names that were never inserted.
    pub fn set_accelerator(&mut self, name: &str, accelerator: Accelerator) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.accelerator = accelerator;
        }
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ShortcutEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
