//! Target resolution - pure functions mapping labels to release branches
//!
//! No I/O happens here - the merge status, labels and branch list are passed
//! in, making it easy to unit test.

use crate::error::{Error, Result};
use crate::types::Branch;

/// Prefix marking a label as a backport directive
pub const BACKPORT_LABEL_PREFIX: &str = "backport ";

/// Branch name requested by a backport label, if it is one
///
/// The suffix is taken verbatim: no trimming, no case normalization.
pub fn backport_target(label: &str) -> Option<&str> {
    label.strip_prefix(BACKPORT_LABEL_PREFIX)
}

/// Whether a label is a backport directive
pub fn is_backport_label(label: &str) -> bool {
    backport_target(label).is_some()
}

/// Resolve the branches a merged PR should be backported to (PURE)
///
/// The merge status is checked first, then the label set. Labels without the
/// `backport ` prefix are ignored and candidates that match no known branch
/// are dropped silently. Targets keep label order; a label given twice yields
/// two targets.
pub fn resolve_targets<S: AsRef<str>>(
    merged: bool,
    labels: &[S],
    branches: &[Branch],
) -> Result<Vec<Branch>> {
    if !merged {
        return Err(Error::NotMerged);
    }

    if labels.is_empty() {
        return Err(Error::NoLabels);
    }

    let targets: Vec<Branch> = labels
        .iter()
        .filter_map(|label| backport_target(label.as_ref()))
        .filter_map(|name| branches.iter().find(|b| b.name == name))
        .cloned()
        .collect();

    if targets.is_empty() {
        return Err(Error::NoBranchFound(
            labels.iter().map(|l| l.as_ref().to_string()).collect(),
        ));
    }

    Ok(targets)
}
