//! Action registries: commands, toggles, and key-event pairs.
//!
//! Each registry stores the opaque handlers for one action style, keyed by
//! the same names the binding table uses. Registration is a one-time,
//! startup-phase operation: a duplicate name in the same registry is a
//! broken call graph, not a runtime condition, and fails fatally. The same
//! goes for handler lookup of a name that was never registered - call
//! sites only reach it after registration.
//!
//! Handlers are `Rc`-held zero-argument closures; the whole system is
//! single-threaded (registration, dispatch and rebinding all happen on the
//! host's event thread), so no locking is involved.

use std::collections::HashMap;
use std::rc::Rc;

/// Capability for receiving a toggle's boolean state.
///
/// Implementations live on the host UI side (a checkbox row, a pressed
/// toolbar button); the core only invokes them.
pub trait StateObserver {
    fn on_state_changed(&self, active: bool);
}

/// A fire-once action.
#[derive(Clone)]
pub struct CommandEntry {
    action: Rc<dyn Fn()>,
}

impl CommandEntry {
    pub fn new(action: Rc<dyn Fn()>) -> Self {
        Self { action }
    }

    pub fn invoke(&self) {
        (self.action)();
    }
}

/// A command with a persistent boolean state and observers to notify.
///
/// The state itself lives with the host; `state` reads it back after the
/// command has run so the new value can be pushed to every observer.
pub struct ToggleEntry {
    command: CommandEntry,
    state: Rc<dyn Fn() -> bool>,
    observers: Vec<Rc<dyn StateObserver>>,
}

impl ToggleEntry {
    pub fn new(action: Rc<dyn Fn()>, state: Rc<dyn Fn() -> bool>) -> Self {
        Self {
            command: CommandEntry::new(action),
            state,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Rc<dyn StateObserver>) {
        self.observers.push(observer);
    }

    /// Fire the command, then push the resulting state to all observers.
    pub fn invoke(&self) {
        self.command.invoke();
        self.export_state();
    }

    /// Push the current state without firing, e.g. for initial UI sync.
    pub fn export_state(&self) {
        let active = (self.state)();
        for observer in &self.observers {
            observer.on_state_changed(active);
        }
    }
}

/// Paired press/release handlers.
#[derive(Clone)]
pub struct KeyEventEntry {
    on_press: Rc<dyn Fn()>,
    on_release: Rc<dyn Fn()>,
}

impl KeyEventEntry {
    pub fn new(on_press: Rc<dyn Fn()>, on_release: Rc<dyn Fn()>) -> Self {
        Self {
            on_press,
            on_release,
        }
    }

    pub fn press(&self) {
        (self.on_press)();
    }

    pub fn release(&self) {
        (self.on_release)();
    }
}

/// Name-keyed handler store shared by the three registries.
pub struct ActionRegistry<T> {
    label: &'static str,
    entries: HashMap<String, T>,
}

impl<T> ActionRegistry<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: HashMap::new(),
        }
    }

    /// Store handlers for `name`. Panics on a duplicate name: registration
    /// happens exactly once per action.
    pub fn insert(&mut self, name: &str, entry: T) {
        assert!(
            !self.entries.contains_key(name),
            "{} '{}' registered twice",
            self.label,
            name
        );
        self.entries.insert(name.to_string(), entry);
    }

    /// Look up handlers for `name`. Panics if absent: callers only reach
    /// this after registration.
    pub fn find(&self, name: &str) -> &T {
        self.entries
            .get(name)
            .unwrap_or_else(|| panic!("{} '{}' was never registered", self.label, name))
    }

    pub fn find_mut(&mut self, name: &str) -> &mut T {
        self.entries
            .get_mut(name)
            .unwrap_or_else(|| panic!("{} '{}' was never registered", self.label, name))
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn command_invokes_action() {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let command = CommandEntry::new(Rc::new(move || counter.set(counter.get() + 1)));

        command.invoke();
        command.invoke();
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn toggle_pushes_state_to_observers() {
        struct Recorder(Cell<Option<bool>>);
        impl StateObserver for Recorder {
            fn on_state_changed(&self, active: bool) {
                self.0.set(Some(active));
            }
        }

        let state = Rc::new(Cell::new(false));
        let flip = state.clone();
        let read = state.clone();
        let mut toggle = ToggleEntry::new(
            Rc::new(move || flip.set(!flip.get())),
            Rc::new(move || read.get()),
        );

        let recorder = Rc::new(Recorder(Cell::new(None)));
        toggle.add_observer(recorder.clone());

        toggle.invoke();
        assert_eq!(recorder.0.get(), Some(true));

        toggle.invoke();
        assert_eq!(recorder.0.get(), Some(false));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_name_is_fatal() {
        let mut registry = ActionRegistry::new("command");
        registry.insert("Foo", CommandEntry::new(Rc::new(|| {})));
        registry.insert("Foo", CommandEntry::new(Rc::new(|| {})));
    }

    #[test]
    #[should_panic(expected = "was never registered")]
    fn missing_name_lookup_is_fatal() {
        let registry: ActionRegistry<CommandEntry> = ActionRegistry::new("command");
        registry.find("Missing");
    }
}
