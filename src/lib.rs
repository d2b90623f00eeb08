//! Shortcut Kit - a process-wide command/shortcut binding registry
//!
//! This library provides the keyboard-accelerator core for a host
//! application: a name-keyed table of user-invokable actions (commands,
//! toggles, and key-down/key-up pairs), each bound to a single reassignable
//! accelerator, with conflict detection during rebinds and versioned
//! persistence of the binding table across sessions.
//!
//! The host UI registers its actions at startup, feeds raw key events into
//! the dispatch entry points, and supplies the per-clash decision policy
//! when the user rebinds a shortcut. Everything visual - widgets, dialogs,
//! listing views - stays on the host's side of the boundary.

pub mod error;
pub mod logging;
pub mod shortcuts;

pub use shortcuts::{
    AccelParseError, Accelerator, BindingKind, BindingSystem, Clash, ConflictDecision, KeyCode,
    Mods, RebindOutcome, RebindToken, StateObserver,
};
