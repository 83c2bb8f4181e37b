//! Tool Errors

use thiserror::Error;

/// Errors raised while turning a model tool call into a diagnostic call.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The model asked for a tool that is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The arguments do not match the tool's input schema
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
}

impl ToolError {
    pub fn invalid_arguments(tool: &str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}
