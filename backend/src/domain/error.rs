//! Domain-level error envelope.
//!
//! These errors are transport agnostic. The settings CLI prints them as JSON;
//! any other adapter maps them to its own protocol.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::lifecycle::LifecycleError;
use super::ports::{EntityStoreError, PermissionLookupError};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The action is not permitted on this record.
    Forbidden,
    /// The referenced record does not exist.
    NotFound,
    /// The request conflicts with the current state of the collection.
    Conflict,
    /// A collaborator such as the store is unreachable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

impl ErrorCode {
    fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid request",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::ServiceUnavailable => "service unavailable",
            Self::InternalError => "internal error",
        }
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use clinic_backend::domain::{DomainError, ErrorCode};
///
/// let err = DomainError::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(try_from = "DomainErrorDto", into = "DomainErrorDto")]
pub struct DomainError {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainErrorValidationError {
    EmptyMessage,
}

impl fmt::Display for DomainErrorValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for DomainErrorValidationError {}

impl DomainError {
    /// Create a new error. A blank message is replaced by a generic one for
    /// the code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: code.fallback_message().to_owned(),
            details: None,
        })
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, DomainErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(DomainErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use clinic_backend::domain::{DomainError, ErrorCode};
    /// use serde_json::json;
    ///
    /// let err = DomainError::new(ErrorCode::InvalidRequest, "bad")
    ///     .with_details(json!({ "field": "name" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DomainError {}

impl From<EntityStoreError> for DomainError {
    fn from(value: EntityStoreError) -> Self {
        let message = value.to_string();
        match value {
            EntityStoreError::Connection { .. } => Self::service_unavailable(message),
            EntityStoreError::UnsupportedVersion { supported, actual } => Self::internal(message)
                .with_details(json!({
                    "code": "unsupported_version",
                    "supportedVersion": supported,
                    "actualVersion": actual,
                })),
            EntityStoreError::Read { .. }
            | EntityStoreError::Write { .. }
            | EntityStoreError::Malformed { .. } => Self::internal(message),
        }
    }
}

impl From<LifecycleError> for DomainError {
    fn from(value: LifecycleError) -> Self {
        let message = value.to_string();
        let reason = value.reason();
        match value {
            LifecycleError::NotFound { reference } => Self::not_found(message)
                .with_details(json!({ "code": reason, "reference": reference })),
            LifecycleError::AmbiguousMatch { reference, matches } => Self::conflict(message)
                .with_details(json!({
                    "code": reason,
                    "reference": reference,
                    "matches": matches,
                })),
            LifecycleError::ProtectedEntity { code } | LifecycleError::DefaultEntity { code } => {
                Self::forbidden(message).with_details(json!({ "code": reason, "entityCode": code }))
            }
            LifecycleError::NotDeleted { code } => {
                Self::conflict(message).with_details(json!({ "code": reason, "entityCode": code }))
            }
            LifecycleError::ReorderMismatch { .. } => {
                Self::conflict(message).with_details(json!({ "code": reason }))
            }
            LifecycleError::Validation(_) => {
                Self::invalid_request(message).with_details(json!({ "code": reason }))
            }
            LifecycleError::Store(error) => Self::from(error),
        }
    }
}

impl From<PermissionLookupError> for DomainError {
    fn from(value: PermissionLookupError) -> Self {
        match value {
            PermissionLookupError::Unavailable { .. } => {
                Self::service_unavailable(value.to_string())
            }
            PermissionLookupError::Rejected { .. } => Self::invalid_request(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<DomainError> for DomainErrorDto {
    fn from(value: DomainError) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<DomainErrorDto> for DomainError {
    type Error = DomainErrorValidationError;

    fn try_from(value: DomainErrorDto) -> Result<Self, Self::Error> {
        let DomainErrorDto {
            code,
            message,
            details,
        } = value;

        let mut error = DomainError::try_new(code, message)?;
        error.details = details;
        Ok(error)
    }
}
