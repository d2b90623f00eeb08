//! Versioned persistence of the binding table.
//!
//! The on-disk contract is a line-oriented `key=value` text file with two
//! sections:
//!
//! ```ini
//! [Version]
//! number=1.0
//!
//! [Commands]
//! EntityColor=K
//! ConnectSelection=Ctrl+K
//! KillConnectSelection=Shift+K
//! ```
//!
//! Loading reads two files in fixed order with the first readable one
//! winning: the user's `shortcuts.ini`, then the packaged
//! `defaultkeys.ini`. Both absent is not an error - the compiled-in
//! defaults simply stay in effect. A semantic-version gate protects
//! against version skew: an incompatible file skips the whole `[Commands]`
//! section rather than applying it partially.
//!
//! File-sourced bindings are trusted and applied verbatim (duplicates
//! included, no conflict scan); persistence only ever overwrites the
//! accelerators of already-registered names and never creates new ones.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::accel::{AccelParseError, Accelerator};
use super::table::BindingTable;

/// File name of the user's saved bindings, looked for first.
pub const USER_FILE: &str = "shortcuts.ini";
/// File name of the packaged default bindings, the fallback tier.
pub const DEFAULT_FILE: &str = "defaultkeys.ini";
/// File name of the human-readable export listing.
pub const LISTING_FILE: &str = "commandlist.txt";

/// Column the accelerator text starts at in the export listing.
const LISTING_NAME_WIDTH: usize = 32;

/// Format version written by this build.
pub const CURRENT_VERSION: VersionTag = VersionTag { major: 1, minor: 0 };

/// A `major.minor` pair parsed from a file's `[Version]` section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionTag {
    pub major: u32,
    pub minor: u32,
}

impl VersionTag {
    pub fn parse(text: &str) -> Option<Self> {
        let (major, minor) = text.trim().split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    /// Forward-compatible gate: a file is accepted when its major version
    /// matches and its minor version is not newer than this build's.
    pub fn accepts(self, file: VersionTag) -> bool {
        self.major == file.major && file.minor <= self.minor
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Errors that can occur when writing binding files.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which tier a load actually read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadSource {
    UserFile(PathBuf),
    DefaultFile(PathBuf),
    /// Neither file was readable; compiled-in defaults stay in effect.
    CompiledDefaults,
}

/// One `[Commands]` entry whose value failed to decode. The entry's
/// previous accelerator was left untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedEntry {
    pub name: String,
    pub value: String,
    pub error: AccelParseError,
}

/// Diagnostics from one load.
#[derive(Clone, Debug)]
pub struct LoadReport {
    pub source: LoadSource,
    /// The file's version tag, if its header parsed at all.
    pub file_version: Option<VersionTag>,
    /// False when the version gate skipped the `[Commands]` section.
    pub version_compatible: bool,
    /// Entries whose accelerator was overwritten (or explicitly cleared).
    pub applied: usize,
    pub rejected: Vec<RejectedEntry>,
    /// Names present in the file but never registered; ignored.
    pub unknown_names: Vec<String>,
}

impl LoadReport {
    fn compiled_defaults() -> Self {
        Self {
            source: LoadSource::CompiledDefaults,
            file_version: None,
            version_compatible: true,
            applied: 0,
            rejected: Vec::new(),
            unknown_names: Vec::new(),
        }
    }
}

/// Load saved bindings into `table`, reading `<user_dir>/shortcuts.ini`
/// first and `<default_dir>/defaultkeys.ini` second; the first readable
/// file wins. Missing files are not an error.
pub fn load(table: &mut BindingTable, user_dir: &Path, default_dir: &Path) -> LoadReport {
    load_with_version(table, user_dir, default_dir, CURRENT_VERSION)
}

/// As `load`, with the running code's version made explicit.
pub fn load_with_version(
    table: &mut BindingTable,
    user_dir: &Path,
    default_dir: &Path,
    code_version: VersionTag,
) -> LoadReport {
    let user = user_dir.join(USER_FILE);
    if let Ok(content) = fs::read_to_string(&user) {
        return apply_file(table, &content, LoadSource::UserFile(user), code_version);
    }

    let fallback = default_dir.join(DEFAULT_FILE);
    if let Ok(content) = fs::read_to_string(&fallback) {
        return apply_file(
            table,
            &content,
            LoadSource::DefaultFile(fallback),
            code_version,
        );
    }

    info!("no shortcut file found, keeping compiled-in defaults");
    LoadReport::compiled_defaults()
}

fn source_path(source: &LoadSource) -> &Path {
    match source {
        LoadSource::UserFile(path) | LoadSource::DefaultFile(path) => path,
        LoadSource::CompiledDefaults => Path::new(""),
    }
}

/// Parse one file's content and apply its `[Commands]` section to the
/// table, subject to the version gate.
fn apply_file(
    table: &mut BindingTable,
    content: &str,
    source: LoadSource,
    code_version: VersionTag,
) -> LoadReport {
    let mut section = String::new();
    let mut file_version: Option<VersionTag> = None;
    let mut pairs: Vec<(&str, &str)> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = name.to_string();
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        match section.as_str() {
            "Version" if key == "number" => file_version = VersionTag::parse(value),
            "Commands" => pairs.push((key, value)),
            _ => {}
        }
    }

    let path = source_path(&source).to_path_buf();
    let compatible = file_version.is_some_and(|v| code_version.accepts(v));
    let mut report = LoadReport {
        source,
        file_version,
        version_compatible: compatible,
        applied: 0,
        rejected: Vec::new(),
        unknown_names: Vec::new(),
    };

    if !compatible {
        warn!(
            path = %path.display(),
            file_version = %file_version.map(|v| v.to_string()).unwrap_or_else(|| "missing".to_string()),
            code_version = %code_version,
            "incompatible shortcut file version, keeping defaults"
        );
        return report;
    }

    for (name, value) in pairs {
        if !table.contains(name) {
            warn!(path = %path.display(), name, "shortcut for unknown command, ignored");
            report.unknown_names.push(name.to_string());
            continue;
        }
        match Accelerator::parse(value) {
            Ok(accelerator) => {
                table.set_accelerator(name, accelerator);
                report.applied += 1;
            }
            Err(error) => {
                warn!(
                    path = %path.display(),
                    name,
                    value,
                    %error,
                    "unparseable accelerator, previous binding kept"
                );
                report.rejected.push(RejectedEntry {
                    name: name.to_string(),
                    value: value.to_string(),
                    error,
                });
            }
        }
    }

    info!(
        path = %path.display(),
        applied = report.applied,
        rejected = report.rejected.len(),
        "loaded shortcut bindings"
    );
    report
}

/// Write the whole table to `path` in the versioned format, one line per
/// entry in table order. Unbound entries still get a line with an empty
/// value, so an explicit clear survives the round trip.
pub fn save(table: &BindingTable, path: &Path) -> Result<(), PersistenceError> {
    save_with_version(table, path, CURRENT_VERSION)
}

/// As `save`, with the written version tag made explicit.
pub fn save_with_version(
    table: &BindingTable,
    path: &Path,
    version: VersionTag,
) -> Result<(), PersistenceError> {
    let mut out = String::new();
    out.push_str("[Version]\n");
    out.push_str(&format!("number={}\n\n", version));
    out.push_str("[Commands]\n");
    for (name, entry) in table.iter() {
        out.push_str(&format!("{}={}\n", name, entry.accelerator));
    }
    write_file(path, &out)
}

/// Write the human-readable listing: each name left-justified to a fixed
/// column, followed by its formatted accelerator. Display only - this
/// file is never reloaded.
pub fn export_listing(table: &BindingTable, path: &Path) -> Result<(), PersistenceError> {
    let mut out = String::new();
    for (name, entry) in table.iter() {
        out.push_str(&format!(
            "{:<width$} {}\n",
            name,
            entry.accelerator,
            width = LISTING_NAME_WIDTH
        ));
    }
    write_file(path, &out)
}

fn write_file(path: &Path, content: &str) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    fs::write(path, content).map_err(|source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Default directory for the user's `shortcuts.ini`.
pub fn default_user_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_default().join("shortcut-kit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::accel::Accelerator;
    use tempfile::tempdir;

    fn accel(text: &str) -> Accelerator {
        Accelerator::parse(text).unwrap()
    }

    fn registered_table() -> BindingTable {
        let mut table = BindingTable::new();
        table.insert("Foo", accel("K"));
        table.insert("Bar", Accelerator::UNBOUND);
        table
    }

    #[test]
    fn version_tag_parse_and_display() {
        let v = VersionTag::parse("1.0").unwrap();
        assert_eq!(v, VersionTag { major: 1, minor: 0 });
        assert_eq!(v.to_string(), "1.0");
        assert!(VersionTag::parse("1").is_none());
        assert!(VersionTag::parse("one.two").is_none());
    }

    #[test]
    fn version_gate_rules() {
        let code = VersionTag { major: 1, minor: 5 };
        assert!(code.accepts(VersionTag { major: 1, minor: 0 }));
        assert!(code.accepts(VersionTag { major: 1, minor: 5 }));
        assert!(!code.accepts(VersionTag { major: 1, minor: 6 }));
        assert!(!code.accepts(VersionTag { major: 2, minor: 0 }));
        assert!(!code.accepts(VersionTag { major: 0, minor: 5 }));
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempdir().unwrap();

        let mut table = registered_table();
        table.set_accelerator("Foo", accel("Ctrl+K"));
        save(&table, &dir.path().join(USER_FILE)).unwrap();

        // A fresh process registers the same names at their defaults.
        let mut fresh = registered_table();
        let report = load(&mut fresh, dir.path(), Path::new("/nonexistent"));

        assert!(matches!(report.source, LoadSource::UserFile(_)));
        assert!(report.version_compatible);
        assert_eq!(report.applied, 2);
        assert_eq!(fresh.find("Foo").unwrap().accelerator, accel("Ctrl+K"));
        assert!(!fresh.find("Bar").unwrap().accelerator.is_bound());
    }

    #[test]
    fn malformed_entry_keeps_default_and_is_reported() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(USER_FILE),
            "[Version]\nnumber=1.0\n\n[Commands]\nFoo=NotAKey\nBar=Ctrl+J\n",
        )
        .unwrap();

        let mut table = registered_table();
        let report = load(&mut table, dir.path(), Path::new("/nonexistent"));

        // Foo keeps its compiled default; Bar still loaded.
        assert_eq!(table.find("Foo").unwrap().accelerator, accel("K"));
        assert_eq!(table.find("Bar").unwrap().accelerator, accel("Ctrl+J"));
        assert_eq!(report.applied, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].name, "Foo");
        assert_eq!(report.rejected[0].value, "NotAKey");
    }

    #[test]
    fn incompatible_major_applies_nothing() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(USER_FILE),
            "[Version]\nnumber=2.0\n\n[Commands]\nFoo=Ctrl+K\n",
        )
        .unwrap();

        let mut table = registered_table();
        let report = load_with_version(
            &mut table,
            dir.path(),
            Path::new("/nonexistent"),
            VersionTag { major: 1, minor: 0 },
        );

        assert!(!report.version_compatible);
        assert_eq!(report.applied, 0);
        assert_eq!(table.find("Foo").unwrap().accelerator, accel("K"));
    }

    #[test]
    fn older_minor_is_accepted() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(USER_FILE),
            "[Version]\nnumber=1.0\n\n[Commands]\nFoo=Ctrl+K\n",
        )
        .unwrap();

        let mut table = registered_table();
        let report = load_with_version(
            &mut table,
            dir.path(),
            Path::new("/nonexistent"),
            VersionTag { major: 1, minor: 5 },
        );

        assert!(report.version_compatible);
        assert_eq!(table.find("Foo").unwrap().accelerator, accel("Ctrl+K"));
    }

    #[test]
    fn missing_version_section_applies_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(USER_FILE), "[Commands]\nFoo=Ctrl+K\n").unwrap();

        let mut table = registered_table();
        let report = load(&mut table, dir.path(), Path::new("/nonexistent"));

        assert!(!report.version_compatible);
        assert!(report.file_version.is_none());
        assert_eq!(table.find("Foo").unwrap().accelerator, accel("K"));
    }

    #[test]
    fn user_file_wins_over_default_file() {
        let user = tempdir().unwrap();
        let default = tempdir().unwrap();
        fs::write(
            user.path().join(USER_FILE),
            "[Version]\nnumber=1.0\n\n[Commands]\nFoo=Ctrl+K\n",
        )
        .unwrap();
        fs::write(
            default.path().join(DEFAULT_FILE),
            "[Version]\nnumber=1.0\n\n[Commands]\nFoo=Shift+K\n",
        )
        .unwrap();

        let mut table = registered_table();
        let report = load(&mut table, user.path(), default.path());

        assert!(matches!(report.source, LoadSource::UserFile(_)));
        assert_eq!(table.find("Foo").unwrap().accelerator, accel("Ctrl+K"));
    }

    #[test]
    fn default_file_used_when_user_file_absent() {
        let user = tempdir().unwrap();
        let default = tempdir().unwrap();
        fs::write(
            default.path().join(DEFAULT_FILE),
            "[Version]\nnumber=1.0\n\n[Commands]\nFoo=Shift+K\n",
        )
        .unwrap();

        let mut table = registered_table();
        let report = load(&mut table, user.path(), default.path());

        assert!(matches!(report.source, LoadSource::DefaultFile(_)));
        assert_eq!(table.find("Foo").unwrap().accelerator, accel("Shift+K"));
    }

    #[test]
    fn both_files_absent_keeps_compiled_defaults() {
        let mut table = registered_table();
        let report = load(
            &mut table,
            Path::new("/nonexistent"),
            Path::new("/nonexistent"),
        );

        assert_eq!(report.source, LoadSource::CompiledDefaults);
        assert_eq!(table.find("Foo").unwrap().accelerator, accel("K"));
    }

    #[test]
    fn unknown_names_are_ignored_not_created() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(USER_FILE),
            "[Version]\nnumber=1.0\n\n[Commands]\nGhost=Ctrl+G\n",
        )
        .unwrap();

        let mut table = registered_table();
        let report = load(&mut table, dir.path(), Path::new("/nonexistent"));

        assert_eq!(report.unknown_names, ["Ghost"]);
        assert!(table.find("Ghost").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn empty_value_clears_a_binding() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(USER_FILE),
            "[Version]\nnumber=1.0\n\n[Commands]\nFoo=\n",
        )
        .unwrap();

        let mut table = registered_table();
        load(&mut table, dir.path(), Path::new("/nonexistent"));

        assert!(!table.find("Foo").unwrap().accelerator.is_bound());
    }

    #[test]
    fn saved_file_lists_unbound_entries_with_empty_value() {
        let dir = tempdir().unwrap();
        let table = registered_table();
        let path = dir.path().join(USER_FILE);
        save(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[Version]\nnumber=1.0\n"));
        assert!(content.contains("\n[Commands]\n"));
        assert!(content.contains("Bar=\n"));
        assert!(content.contains("Foo=K\n"));
    }

    #[test]
    fn listing_is_fixed_width() {
        let dir = tempdir().unwrap();
        let mut table = registered_table();
        table.set_accelerator("Foo", accel("Ctrl+K"));
        let path = dir.path().join(LISTING_FILE);
        export_listing(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Bar"));
        assert!(lines[1].starts_with("Foo"));
        // Accelerator text starts one space past the name column.
        assert_eq!(&lines[1][LISTING_NAME_WIDTH + 1..], "Ctrl+K");
    }
}
