//! The binding system: registration, live wiring, dispatch and rebinding.
//!
//! `BindingSystem` is the single constructed-once owner of the binding
//! table and the three action registries. The host application registers
//! its actions at startup, connects them after persistence has overwritten
//! the defaults, and then feeds raw key events into `key_press` /
//! `key_release`. Rebinding runs as a short-lived modal capture:
//! `begin_rebind` suspends dispatch for the one pending name, the host
//! offers the user's next chord via `capture_candidate`, and
//! `complete_rebind` drives the conflict scan before committing.
//!
//! Live wiring is a connected-name set rather than per-widget signal
//! handlers: dispatch looks the accelerator up by name at match time, so
//! a committed rebind is observed everywhere immediately.

use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::accel::{Accelerator, KeyCode, Mods};
use super::conflict::{scan_clashes, Clash, ConflictDecision, RebindOutcome};
use super::persistence::{self, LoadReport, PersistenceError};
use super::registry::{
    ActionRegistry, CommandEntry, KeyEventEntry, StateObserver, ToggleEntry,
};
use super::table::{BindingKind, BindingTable};

/// Proof that a rebind capture was started for one specific name.
///
/// Consumed by `complete_rebind` / `cancel_rebind`; not clonable, so a
/// capture can only be finished once.
#[derive(Debug)]
pub struct RebindToken {
    name: String,
}

impl RebindToken {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Process-wide shortcut state: table, registries, wiring and capture.
pub struct BindingSystem {
    table: BindingTable,
    commands: ActionRegistry<CommandEntry>,
    toggles: ActionRegistry<ToggleEntry>,
    key_events: ActionRegistry<KeyEventEntry>,
    connected: BTreeSet<String>,
    capture: Option<String>,
}

impl Default for BindingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingSystem {
    pub fn new() -> Self {
        Self {
            table: BindingTable::new(),
            commands: ActionRegistry::new("command"),
            toggles: ActionRegistry::new("toggle"),
            key_events: ActionRegistry::new("key event"),
            connected: BTreeSet::new(),
            capture: None,
        }
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut BindingTable {
        &mut self.table
    }

    fn assert_name_free(&self, name: &str) {
        assert!(
            !self.commands.contains(name)
                && !self.toggles.contains(name)
                && !self.key_events.contains(name),
            "action name '{}' registered twice",
            name
        );
    }

    /// Register a fire-once command with its default accelerator.
    pub fn register_command(
        &mut self,
        name: &str,
        default: Accelerator,
        action: impl Fn() + 'static,
    ) {
        self.assert_name_free(name);
        self.table.insert(name, default);
        self.commands.insert(name, CommandEntry::new(Rc::new(action)));
        self.table.set_kind(name, BindingKind::Command);
        debug!(name, accelerator = %default, "registered command");
    }

    /// Register a togglable action. `state` reads the host-side boolean
    /// back after `action` has run so observers can be notified.
    pub fn register_toggle(
        &mut self,
        name: &str,
        default: Accelerator,
        action: impl Fn() + 'static,
        state: impl Fn() -> bool + 'static,
    ) {
        self.assert_name_free(name);
        self.table.insert(name, default);
        self.toggles
            .insert(name, ToggleEntry::new(Rc::new(action), Rc::new(state)));
        self.table.set_kind(name, BindingKind::Toggle);
        debug!(name, accelerator = %default, "registered toggle");
    }

    /// Register a paired press/release handler. The table entry keeps
    /// `BindingKind::Unbound`: the kind tag records command-style wiring
    /// only, and key events are wired by their own registry.
    pub fn register_key_event(
        &mut self,
        name: &str,
        default: Accelerator,
        on_press: impl Fn() + 'static,
        on_release: impl Fn() + 'static,
    ) {
        self.assert_name_free(name);
        self.table.insert(name, default);
        self.key_events
            .insert(name, KeyEventEntry::new(Rc::new(on_press), Rc::new(on_release)));
        debug!(name, accelerator = %default, "registered key event");
    }

    /// Attach a state observer to a registered toggle.
    pub fn add_toggle_observer(&mut self, name: &str, observer: Rc<dyn StateObserver>) {
        self.toggles.find_mut(name).add_observer(observer);
    }

    /// Push a toggle's current state to its observers without firing it.
    pub fn export_toggle_state(&self, name: &str) {
        self.toggles.find(name).export_state();
    }

    // ------------------------------------------------------------------
    // Live binding connector
    // ------------------------------------------------------------------

    /// Wire `name` into dispatch according to its registered style.
    pub fn connect(&mut self, name: &str) {
        assert!(
            self.table.contains(name),
            "cannot connect unregistered action '{}'",
            name
        );
        self.connected.insert(name.to_string());
    }

    /// Remove `name` from live dispatch without touching its stored
    /// accelerator.
    pub fn disconnect(&mut self, name: &str) {
        self.connected.remove(name);
    }

    /// Wire every registered name at once; the usual startup step after
    /// persistence has overwritten the defaults.
    pub fn connect_all(&mut self) {
        let names: Vec<String> = self.table.iter().map(|(name, _)| name.to_string()).collect();
        for name in names {
            self.connected.insert(name);
        }
    }

    pub fn is_connected(&self, name: &str) -> bool {
        self.connected.contains(name)
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Find the first connected name, in table order, whose accelerator
    /// matches the chord under masked-modifier equality. A pending capture
    /// suppresses matching for that one name only.
    fn match_event(&self, key: KeyCode, mods: Mods) -> Option<(&str, BindingKind)> {
        let probe = Accelerator::new(key, mods);
        for (name, entry) in self.table.iter() {
            if self.capture.as_deref() == Some(name) {
                continue;
            }
            if !self.connected.contains(name) || !entry.accelerator.is_bound() {
                continue;
            }
            if entry.accelerator == probe {
                return Some((name, entry.kind));
            }
        }
        None
    }

    /// Dispatch a key-down event from the host. Returns true if a binding
    /// fired.
    pub fn key_press(&self, key: KeyCode, mods: Mods) -> bool {
        let Some((name, kind)) = self.match_event(key, mods) else {
            return false;
        };
        match kind {
            BindingKind::Command => self.commands.find(name).invoke(),
            BindingKind::Toggle => self.toggles.find(name).invoke(),
            BindingKind::Unbound => match self.key_events.get(name) {
                Some(entry) => entry.press(),
                None => return false,
            },
        }
        true
    }

    /// Dispatch a key-up event from the host. Only key-event pairs listen
    /// for releases.
    pub fn key_release(&self, key: KeyCode, mods: Mods) -> bool {
        let Some((name, kind)) = self.match_event(key, mods) else {
            return false;
        };
        if kind != BindingKind::Unbound {
            return false;
        }
        match self.key_events.get(name) {
            Some(entry) => {
                entry.release();
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Rebind capture
    // ------------------------------------------------------------------

    /// Enter the capture state for `name`: dispatch for that name is
    /// suspended until the rebind completes or is cancelled. Starting a
    /// new capture replaces a still-pending one.
    pub fn begin_rebind(&mut self, name: &str) -> RebindToken {
        assert!(
            self.table.contains(name),
            "cannot rebind unregistered action '{}'",
            name
        );
        if let Some(previous) = self.capture.replace(name.to_string()) {
            warn!(previous = previous.as_str(), "capture replaced while still pending");
        }
        RebindToken {
            name: name.to_string(),
        }
    }

    /// Turn a raw keypress during capture into a candidate accelerator.
    /// Bare modifier presses are not candidates; the capture keeps
    /// waiting.
    pub fn capture_candidate(&self, key: KeyCode, mods: Mods) -> Option<Accelerator> {
        if key.is_modifier() {
            return None;
        }
        Some(Accelerator::new(key, mods))
    }

    /// Abandon a pending capture, leaving all bindings as they were.
    pub fn cancel_rebind(&mut self, token: RebindToken) {
        if self.capture.as_deref() == Some(token.name.as_str()) {
            self.capture = None;
        }
    }

    /// Resolve conflicts and commit the new accelerator.
    ///
    /// Every clash is put to `decide`; an `Abort` answer leaves the table,
    /// the live wiring and every other entry exactly as they were before
    /// the scan, even if earlier clashes had already been answered with
    /// `UnbindOther`. On a clean scan the staged unbinds are applied, the
    /// candidate is rewired, and the new accelerator is written.
    pub fn complete_rebind(
        &mut self,
        token: RebindToken,
        accelerator: Accelerator,
        decide: &mut dyn FnMut(&Clash) -> ConflictDecision,
    ) -> RebindOutcome {
        assert!(
            self.capture.as_deref() == Some(token.name.as_str()),
            "completing a rebind that is not pending for '{}'",
            token.name
        );
        self.capture = None;

        let Some(unbind) = scan_clashes(&self.table, &token.name, accelerator, decide) else {
            info!(name = token.name.as_str(), "rebind aborted");
            return RebindOutcome::Aborted;
        };

        for other in &unbind {
            self.disconnect(other);
            self.table.set_accelerator(other, Accelerator::UNBOUND);
            info!(name = other.as_str(), "accelerator cleared by rebind");
        }

        let was_connected = self.connected.contains(&token.name);
        self.disconnect(&token.name);
        self.table.set_accelerator(&token.name, accelerator);
        if was_connected {
            self.connect(&token.name);
        }
        info!(name = token.name.as_str(), accelerator = %accelerator, "rebind committed");
        RebindOutcome::Committed
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Overwrite registered defaults from the saved user file, falling
    /// back to the packaged default file; see `persistence::load`.
    pub fn load_bindings(&mut self, user_dir: &Path, default_dir: &Path) -> LoadReport {
        persistence::load(&mut self.table, user_dir, default_dir)
    }

    /// Save the table to `<user_dir>/shortcuts.ini`.
    pub fn save_bindings(&self, user_dir: &Path) -> Result<(), PersistenceError> {
        persistence::save(&self.table, &user_dir.join(persistence::USER_FILE))
    }

    /// Write the human-readable `commandlist.txt` listing into `dir`.
    pub fn export_command_list(&self, dir: &Path) -> Result<(), PersistenceError> {
        persistence::export_listing(&self.table, &dir.join(persistence::LISTING_FILE))
    }
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod system_tests;
