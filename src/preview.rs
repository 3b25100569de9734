//! Preview pane content generation.
//!
//! A preview comes either from an external command ([`command`]) or from an in-process
//! [`PreviewConverter`]. The [`runner::PreviewRunner`] executes requests off the event
//! loop and publishes only the result for the most recently highlighted entry.

pub mod command;
pub mod runner;

pub use command::CommandTemplate;
pub use runner::PreviewRunner;

use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Heading shown above the output of a failed preview.
pub const FAILURE_HEADING: &str = "The preview command failed with error message:";

/// Converts an entry's preview argument into preview text.
///
/// Implemented for closures, so `|arg: &str| Ok(arg.to_uppercase())` is a converter.
pub trait PreviewConverter: Send + Sync {
    fn convert(&self, argument: &str) -> std::result::Result<String, String>;
}

impl<F> PreviewConverter for F
where
    F: Fn(&str) -> std::result::Result<String, String> + Send + Sync,
{
    fn convert(&self, argument: &str) -> std::result::Result<String, String> {
        self(argument)
    }
}

/// Where preview text comes from, fixed at construction.
#[derive(Clone)]
pub enum PreviewSource {
    Command(CommandTemplate),
    Converter(Arc<dyn PreviewConverter>),
}

impl PreviewSource {
    /// A command template such as `"cat {}"`.
    pub fn command(template: &str) -> Result<Self> {
        Ok(PreviewSource::Command(CommandTemplate::parse(template)?))
    }

    /// An in-process converter closure.
    ///
    /// Types implementing [`PreviewConverter`] directly can be wrapped with
    /// `PreviewSource::Converter(Arc::new(..))`.
    pub fn converter<F>(converter: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<String, String> + Send + Sync + 'static,
    {
        PreviewSource::Converter(Arc::new(converter))
    }
}

impl fmt::Debug for PreviewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewSource::Command(template) => {
                f.debug_tuple("Command").field(&template.words()).finish()
            }
            PreviewSource::Converter(_) => f.write_str("Converter(..)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewContent {
    Text(String),
    /// Failure description: the command's stderr, the OS error, or the converter's message
    Error(String),
}

impl PreviewContent {
    /// The text to display in the pane.
    pub fn display_text(&self) -> String {
        match self {
            PreviewContent::Text(text) => text.clone(),
            PreviewContent::Error(message) => format!("{}\n\n{}", FAILURE_HEADING, message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PreviewContent::Error(_))
    }
}

/// Preview output tagged with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewResult {
    /// Original index of the entry the preview was computed for
    pub index: usize,
    pub generation: u64,
    pub content: PreviewContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_converters() {
        let source = PreviewSource::converter(|arg: &str| Ok(arg.to_uppercase()));
        match source {
            PreviewSource::Converter(converter) => {
                assert_eq!(converter.convert("abc"), Ok("ABC".to_string()))
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn error_content_carries_heading() {
        let content = PreviewContent::Error("No such file".to_string());
        assert!(content.is_error());
        assert_eq!(
            content.display_text(),
            "The preview command failed with error message:\n\nNo such file"
        );
    }

    #[test]
    fn command_source_rejects_bad_templates() {
        assert!(PreviewSource::command("cat {}").is_ok());
        assert!(PreviewSource::command("cat '{}").is_err());
    }
}
