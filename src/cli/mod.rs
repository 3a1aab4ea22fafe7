//! CLI commands

mod context;
mod run;
pub mod style;
mod targets;

pub use run::{RunOptions, run_backport};
pub use targets::run_targets;

use anstream::println;
use async_trait::async_trait;
use backport::backport::ProgressCallback;
use style::{Stylize, arrow};

/// Progress callback that prints to the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct CliProgress {
    indent: usize,
}

impl CliProgress {
    /// Progress lines indented under a heading
    pub const fn compact() -> Self {
        Self { indent: 2 }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        println!("{:indent$}{} {}", "", arrow(), message, indent = self.indent);
    }

    async fn on_warning(&self, message: &str) {
        println!("{:indent$}{} {}", "", arrow(), message.warn(), indent = self.indent);
    }
}
