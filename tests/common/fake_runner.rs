//! Scripted command runner for testing
//!
//! Records every command and fails the ones it has been told to fail, so the
//! cherry-pick engine can be exercised without a real repository.

#![allow(dead_code)]

use async_trait::async_trait;
use backport::runner::{CommandError, CommandOutput, CommandRunner, render_command};
use std::collections::HashMap;
use std::sync::Mutex;

/// A failure to inject for an exact command line
#[derive(Debug, Clone)]
struct FailureRule {
    command: String,
    /// Remaining failures, `None` for always
    remaining: Option<usize>,
    /// Exit status reported by the failure
    status: i32,
}

/// Command runner that records calls and fails on demand
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<String>>,
    failures: Mutex<Vec<FailureRule>>,
    outputs: Mutex<HashMap<String, String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every run of `command` fail
    pub fn fail_on(&self, command: &str) {
        self.fail_with_status(command, 1);
    }

    /// Make every run of `command` exit with `status`
    pub fn fail_with_status(&self, command: &str, status: i32) {
        self.failures.lock().unwrap().push(FailureRule {
            command: command.to_string(),
            remaining: None,
            status,
        });
    }

    /// Make the next run of `command` fail, later runs succeed
    pub fn fail_once_on(&self, command: &str) {
        self.failures.lock().unwrap().push(FailureRule {
            command: command.to_string(),
            remaining: Some(1),
            status: 1,
        });
    }

    /// Output returned when `command` succeeds
    pub fn respond_with(&self, command: &str, output: &str) {
        self.outputs
            .lock()
            .unwrap()
            .insert(command.to_string(), output.to_string());
    }

    /// All commands run so far, rendered as command lines
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded commands starting with `prefix`
    pub fn count_starting_with(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Assert that `command` was run
    pub fn assert_called(&self, command: &str) {
        let calls = self.calls();
        assert!(
            calls.iter().any(|c| c == command),
            "Expected `{command}` to run but got: {calls:#?}"
        );
    }

    /// Assert that `command` was NOT run
    pub fn assert_not_called(&self, command: &str) {
        let calls = self.calls();
        assert!(
            !calls.iter().any(|c| c == command),
            "Expected `{command}` NOT to run but got: {calls:#?}"
        );
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
        let command = render_command(program, args);
        self.calls.lock().unwrap().push(command.clone());

        let mut failures = self.failures.lock().unwrap();
        let rule = failures
            .iter_mut()
            .find(|r| r.command == command && r.remaining != Some(0));

        match rule {
            Some(rule) => {
                if let Some(remaining) = rule.remaining.as_mut() {
                    *remaining -= 1;
                }
                Err(CommandError::Failed {
                    command,
                    status: Some(rule.status),
                    output: "scripted failure".to_string(),
                })
            }
            None => Ok(CommandOutput {
                output: self
                    .outputs
                    .lock()
                    .unwrap()
                    .get(&command)
                    .cloned()
                    .unwrap_or_default(),
            }),
        }
    }
}
