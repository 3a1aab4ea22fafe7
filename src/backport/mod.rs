//! Backport engine for merged PRs
//!
//! Plan/execute split:
//! 1. Plan - resolve target branches from labels (`targets`, pure)
//! 2. Execute - cherry-pick onto each target and open PRs (`execute`, effectful)
//!
//! Conflicts during a cherry-pick are handed to pluggable `conflict` resolvers.

mod cherry_pick;
mod conflict;
mod execute;
mod progress;
mod request;
mod targets;

pub use cherry_pick::{CherryPickOptions, create_cherry_pick_branch};
pub use conflict::{
    BETTERER_RESULTS, ConflictResolver, RegenerableArtifact, default_resolvers, resolve_conflict,
    resolvers_from_config,
};
pub use execute::{
    BackportExecutionResult, BackportOptions, BackportPlan, TargetFailure, execute_backport,
    failure_comment, plan_backport,
};
pub use progress::{NoopProgress, ProgressCallback};
pub use request::BackportRequest;
pub use targets::{BACKPORT_LABEL_PREFIX, backport_target, is_backport_label, resolve_targets};
