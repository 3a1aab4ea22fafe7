//! backport - port merged GitHub pull requests onto release branches
//!
//! A merged PR labeled `backport <branch>` is cherry-picked onto each named
//! release branch and a new PR is opened for every target. Conflicts in known
//! generated artifacts are settled by regenerating them.

pub mod auth;
pub mod backport;
pub mod config;
pub mod error;
pub mod platform;
pub mod runner;
pub mod types;
