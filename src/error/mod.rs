use crate::storage::StorageError;
use crate::theme::ParseThemeModeError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

pub type BindResult<T> = std::result::Result<T, BindError>;

/// Failures raised while binding a toggle control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("invalid selector {selector:?}: expected `#` followed by an element id")]
    InvalidSelector { selector: String },
    #[error("no element found with id {id:?}")]
    ElementNotFound { id: String },
    #[error("element {id:?} is not a button")]
    NotAButtonElement { id: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    ParseMode(#[from] ParseThemeModeError),
    #[error("usage: themekeeper [show | toggle | set <light|dark>] ({reason})")]
    Usage { reason: String },
}
