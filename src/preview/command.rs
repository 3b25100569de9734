//! External preview commands.

use super::PreviewContent;
use crate::error::{MenuError, Result};
use std::process::Stdio;
use tokio::process::Command;

/// Placeholder replaced by the entry's preview argument.
pub const PLACEHOLDER: &str = "{}";

/// A shell-split command line with `{}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    words: Vec<String>,
}

impl CommandTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let words = shlex::split(template).ok_or_else(|| {
            MenuError::config(format!("preview command has unbalanced quotes: {}", template))
        })?;
        if words.is_empty() {
            return Err(MenuError::config("preview command is empty"));
        }
        Ok(Self { words })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The argument vector with every placeholder replaced by `argument`.
    pub fn render(&self, argument: &str) -> Vec<String> {
        self.words
            .iter()
            .map(|word| word.replace(PLACEHOLDER, argument))
            .collect()
    }
}

/// Run `argv` and turn its outcome into preview content.
///
/// The child is killed if the returned future is dropped before it finishes.
pub async fn run(argv: Vec<String>) -> PreviewContent {
    let Some((program, args)) = argv.split_first() else {
        return PreviewContent::Error("empty preview command".to_string());
    };
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            PreviewContent::Text(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::warn!("preview command {:?} exited with {}", program, output.status);
            PreviewContent::Error(stderr)
        }
        Err(err) => {
            log::warn!("preview command {:?} could not be started: {}", program, err);
            PreviewContent::Error(err.to_string())
        }
    }
}
