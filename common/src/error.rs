//! エラー型定義

use crate::flow::{Action, Step};
use crate::types::{OrderKey, SectionKey};
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No active inspection document")]
    NoDocument,

    #[error("Item not found: {section} #{order}")]
    NotFound { section: SectionKey, order: OrderKey },

    #[error("Invalid transition: {action:?} is not allowed from {from:?}")]
    InvalidTransition { from: Step, action: Action },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let error = Error::NotFound {
            section: SectionKey::Visual,
            order: OrderKey::Number(999),
        };
        assert_eq!(format!("{}", error), "Item not found: visual_inspection #999");
    }

    #[test]
    fn test_error_display_invalid_transition() {
        let error = Error::InvalidTransition { from: Step::Home, action: Action::Save };
        let display = format!("{}", error);
        assert!(display.contains("Save"));
        assert!(display.contains("Home"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
    }
}
