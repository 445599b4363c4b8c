//! User-facing status line for the outcome of an action.

use serde::Serialize;

use tiredesk_core::{DomainError, DomainResult};
use tiredesk_sales::CheckoutReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Success,
    Warning,
    Error,
}

impl StatusLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusLevel::Success => "success",
            StatusLevel::Warning => "warning",
            StatusLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }

    /// Success text from `on_ok`, or the error's status.
    pub fn from_result<T>(result: &DomainResult<T>, on_ok: impl FnOnce(&T) -> String) -> Self {
        match result {
            Ok(value) => Self::success(on_ok(value)),
            Err(err) => Self::from(err),
        }
    }
}

/// Duplicates and empty inputs are things the user can shrug off; everything
/// else stopped the action.
impl From<&DomainError> for StatusMessage {
    fn from(err: &DomainError) -> Self {
        match err {
            DomainError::Duplicate(_) | DomainError::Empty(_) => {
                Self::warning(capitalize(&err.to_string()))
            }
            DomainError::Unauthorized => Self::error("Admin login required for this action"),
            _ => Self::error(capitalize(&err.to_string())),
        }
    }
}

impl From<&CheckoutReport> for StatusMessage {
    fn from(report: &CheckoutReport) -> Self {
        if report.is_complete() {
            Self::success(report.message())
        } else {
            Self::warning(report.message())
        }
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.text)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
