use std::fmt;

use shared::error::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service responded with status {status}: {message}")]
    Status {
        status: u16,
        code: ErrorCode,
        message: String,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid collection url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl RepositoryError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Transport(err) => err.status().map(|s| ErrorCode::from_status(s.as_u16())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected locally before any request was sent.
    Validation,
    /// A matching record is already in the cached list.
    Conflict,
    /// Missing locally or reported missing by the service.
    NotFound,
    /// Transport failure or non-success response.
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Create,
    Update,
    Delete,
    Find,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Find => "find",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error a command leaves behind in the controller's error slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CommandError {
    category: ErrorCategory,
    command: Command,
    message: String,
}

impl CommandError {
    pub fn new(category: ErrorCategory, command: Command, message: impl Into<String>) -> Self {
        Self {
            category,
            command,
            message: message.into(),
        }
    }

    pub fn validation(command: Command, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Validation, command, message)
    }

    pub fn conflict(command: Command, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Conflict, command, message)
    }

    pub fn not_found(command: Command, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::NotFound, command, message)
    }

    pub fn remote(command: Command, subject: &str, source: &RepositoryError) -> Self {
        let action = match command {
            Command::Refresh => "load",
            other => other.as_str(),
        };
        let category = match source.code() {
            Some(ErrorCode::NotFound) => ErrorCategory::NotFound,
            _ => ErrorCategory::Remote,
        };
        Self::new(
            category,
            command,
            format!("failed to {action} {subject}: {source}"),
        )
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
