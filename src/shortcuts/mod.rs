//! Unified keyboard shortcut system.
//!
//! This module provides:
//! - Canonical accelerator text parsing and formatting
//! - The name-keyed binding table, the single source of truth
//! - Command / toggle / key-event registries with opaque handlers
//! - Live wiring and masked-modifier dispatch matching
//! - Conflict detection with a caller-supplied resolution policy
//! - Versioned save/load with a user-file/default-file fallback
//!
//! # Architecture
//!
//! All state hangs off one `BindingSystem`, constructed once at startup
//! and passed by reference to registration call sites and the dispatch
//! loop. Handlers never hold the accelerator itself; dispatch looks it up
//! by name, so a rebind is observed everywhere the moment it commits.
//!
//! # Example
//!
//! ```
//! use shortcut_kit::shortcuts::{Accelerator, BindingSystem, KeyCode, Mods};
//!
//! let mut system = BindingSystem::new();
//! system.register_command("CenterView", Accelerator::parse("Ctrl+E").unwrap(), || {
//!     // recenters the viewport
//! });
//! system.connect_all();
//!
//! assert!(system.key_press(KeyCode::Char('E'), Mods::CONTROL));
//! ```

mod accel;
mod conflict;
mod persistence;
mod registry;
mod system;
mod table;

pub use accel::{AccelParseError, Accelerator, KeyCode, Mods};

pub use table::{BindingKind, BindingTable, ShortcutEntry};

pub use registry::{CommandEntry, KeyEventEntry, StateObserver, ToggleEntry};

pub use conflict::{Clash, ConflictDecision, RebindOutcome};

pub use system::{BindingSystem, RebindToken};

pub use persistence::{
    default_user_dir, export_listing, load, load_with_version, save, save_with_version,
    LoadReport, LoadSource, PersistenceError, RejectedEntry, VersionTag, CURRENT_VERSION,
    DEFAULT_FILE, LISTING_FILE, USER_FILE,
};
