//! Conflict detection for rebinds.
//!
//! A conflict is two distinct names whose accelerators compare equal under
//! masked-modifier equality. The scan here is policy-agnostic: every clash
//! is surfaced to a caller-supplied decision function, which answers
//! per-clash - unbind the other action, abort the whole rebind, or
//! knowingly leave the clash in place. Nothing is ever resolved silently.
//!
//! Unbind decisions are only *staged* during the scan; the caller applies
//! them after the scan completes without an abort. An aborted rebind
//! therefore leaves the table and all live wiring exactly as they were,
//! even when earlier clashes in the same scan had already been answered
//! with unbind-other.

use tracing::debug;

use super::accel::Accelerator;
use super::table::{BindingKind, BindingTable};

/// One detected clash, presented to the decision function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clash<'a> {
    /// The other action currently holding the contested accelerator.
    pub name: &'a str,
    /// How that action is currently wired.
    pub kind: BindingKind,
    /// The contested accelerator.
    pub accelerator: Accelerator,
}

/// Per-clash answer from the caller's policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Clear the other action's accelerator and keep scanning.
    UnbindOther,
    /// Stop immediately; the rebind must not proceed.
    Abort,
    /// Leave the clash in place and keep scanning: two names will
    /// knowingly share one accelerator.
    Skip,
}

/// Result of a completed rebind attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebindOutcome {
    Committed,
    Aborted,
}

/// Scan every bound entry other than `candidate` for a clash with
/// `accelerator`, in table order, asking `decide` about each one.
///
/// Returns the names staged for unbinding, or `None` if any decision was
/// `Abort`. The table itself is not touched.
pub(crate) fn scan_clashes(
    table: &BindingTable,
    candidate: &str,
    accelerator: Accelerator,
    decide: &mut dyn FnMut(&Clash) -> ConflictDecision,
) -> Option<Vec<String>> {
    let mut unbind = Vec::new();

    for (name, entry) in table.iter() {
        if name == candidate || !entry.accelerator.is_bound() {
            continue;
        }
        if entry.accelerator != accelerator {
            continue;
        }

        let clash = Clash {
            name,
            kind: entry.kind,
            accelerator: entry.accelerator,
        };
        match decide(&clash) {
            ConflictDecision::UnbindOther => {
                debug!(name, "clash resolved: unbind other");
                unbind.push(name.to_string());
            }
            ConflictDecision::Abort => {
                debug!(name, "clash resolved: abort rebind");
                return None;
            }
            ConflictDecision::Skip => {
                debug!(name, "clash resolved: accelerator left shared");
            }
        }
    }

    Some(unbind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(entries: &[(&str, &str)]) -> BindingTable {
        let mut table = BindingTable::new();
        for (name, accel) in entries {
            table.insert(name, Accelerator::parse(accel).unwrap());
        }
        table
    }

    #[test]
    fn detects_exactly_one_clash() {
        let table = table_with(&[("A", "Ctrl+K"), ("B", "Ctrl+K"), ("C", "Shift+K")]);

        let mut seen = Vec::new();
        let staged = scan_clashes(
            &table,
            "A",
            Accelerator::parse("Ctrl+K").unwrap(),
            &mut |clash| {
                seen.push(clash.name.to_string());
                ConflictDecision::Skip
            },
        );

        assert_eq!(seen, ["B"]);
        assert_eq!(staged, Some(Vec::new()));
    }

    #[test]
    fn unbound_entries_are_skipped() {
        let table = table_with(&[("A", "K"), ("B", ""), ("C", "")]);

        let staged = scan_clashes(&table, "A", Accelerator::UNBOUND, &mut |_| {
            panic!("unbound entries must never clash")
        });
        assert_eq!(staged, Some(Vec::new()));
    }

    #[test]
    fn abort_stops_the_scan() {
        let table = table_with(&[("A", "K"), ("B", "K"), ("C", "K"), ("D", "K")]);

        let mut asked = 0;
        let staged = scan_clashes(&table, "A", Accelerator::key('K'), &mut |clash| {
            asked += 1;
            if clash.name == "C" {
                ConflictDecision::Abort
            } else {
                ConflictDecision::UnbindOther
            }
        });

        // B was answered first, then C aborted; D was never asked.
        assert_eq!(asked, 2);
        assert_eq!(staged, None);
    }

    #[test]
    fn unbind_decisions_are_staged_not_applied() {
        let table = table_with(&[("A", "K"), ("B", "K"), ("C", "K")]);

        let staged = scan_clashes(&table, "A", Accelerator::key('K'), &mut |_| {
            ConflictDecision::UnbindOther
        });

        assert_eq!(staged, Some(vec!["B".to_string(), "C".to_string()]));
        // The scan itself never mutates the table.
        assert!(table.find("B").unwrap().accelerator.is_bound());
        assert!(table.find("C").unwrap().accelerator.is_bound());
    }
}
