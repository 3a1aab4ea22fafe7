//! Throwaway git repositories for end-to-end engine tests
//!
//! Builds a bare `origin`, seeds it from a scratch clone, and hands out a
//! separate working clone for the engine to operate in.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Whether a usable `git` binary is on PATH
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}

/// An origin repository plus a seeding clone and a working clone
pub struct TempGitRepo {
    temp_dir: TempDir,
    origin: PathBuf,
    seed: PathBuf,
    work: PathBuf,
}

impl TempGitRepo {
    /// Create origin with a `main` branch holding one commit
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let origin = temp_dir.path().join("origin.git");
        let seed = temp_dir.path().join("seed");
        let work = temp_dir.path().join("work");

        run_git(temp_dir.path(), &["init", "--bare", "origin.git"]);
        run_git(&origin, &["config", "uploadpack.allowAnySHA1InWant", "true"]);

        run_git(temp_dir.path(), &["init", "seed"]);
        configure_identity(&seed);
        run_git(&seed, &["checkout", "-b", "main"]);
        run_git(&seed, &["remote", "add", "origin", origin.to_str().unwrap()]);

        let repo = Self {
            temp_dir,
            origin,
            seed,
            work,
        };
        repo.commit_file("README.md", "backport fixture\n", "initial commit");
        repo.push("main");
        repo
    }

    /// Write a file in the seed clone and commit it, returning the new SHA
    pub fn commit_file(&self, path: &str, content: &str, message: &str) -> String {
        std::fs::write(self.seed.join(path), content).expect("Failed to write file");
        run_git(&self.seed, &["add", path]);
        run_git(&self.seed, &["commit", "-m", message]);
        self.seed_head()
    }

    /// Switch the seed clone to `branch`, creating it from HEAD if needed
    pub fn switch(&self, branch: &str, create: bool) {
        if create {
            run_git(&self.seed, &["checkout", "-b", branch]);
        } else {
            run_git(&self.seed, &["checkout", branch]);
        }
    }

    /// Push a seed branch to origin
    pub fn push(&self, branch: &str) {
        run_git(&self.seed, &["push", "origin", branch]);
    }

    /// HEAD of the seed clone
    pub fn seed_head(&self) -> String {
        run_git(&self.seed, &["rev-parse", "HEAD"]).trim().to_string()
    }

    /// Clone origin into the working directory the engine runs in
    pub fn clone_work(&self) -> &Path {
        run_git(
            self.temp_dir.path(),
            &["clone", self.origin.to_str().unwrap(), "work"],
        );
        configure_identity(&self.work);
        &self.work
    }

    /// Path of the working clone
    pub fn work(&self) -> &Path {
        &self.work
    }

    /// Run git in the working clone and return stdout
    pub fn work_git(&self, args: &[&str]) -> String {
        run_git(&self.work, args)
    }
}

fn configure_identity(dir: &Path) {
    run_git(dir, &["config", "user.name", "Backport Test"]);
    run_git(dir, &["config", "user.email", "backport@example.com"]);
    run_git(dir, &["config", "commit.gpgsign", "false"]);
}

fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}
