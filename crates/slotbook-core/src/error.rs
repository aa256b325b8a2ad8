// ── Core error types ──
//
// User-facing errors from slotbook-core. Room-service failures never leak
// as HTTP errors: every `slotbook_api::Error` is folded into
// `ProvisioningError` and surfaces as `CoreError::Provisioning`.

use thiserror::Error;

use crate::provision::ProvisioningError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Request errors ───────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Business rejections ──────────────────────────────────────────
    #[error("Cannot {operation} {entity_type} {identifier}: currently {current}")]
    InvalidState {
        entity_type: String,
        identifier: String,
        current: String,
        operation: String,
    },

    #[error("Already booked: {identifier}")]
    AlreadyBooked { identifier: String },

    #[error("Package {identifier} has no remaining sessions")]
    Exhausted { identifier: String },

    #[error("Insufficient funds for {consumer}: balance {balance}, required {required}")]
    InsufficientFunds {
        consumer: String,
        balance: u64,
        required: u64,
    },

    #[error("Group session {identifier} is full (capacity {capacity})")]
    CapacityReached { identifier: String, capacity: u32 },

    // ── Collaborator failures ────────────────────────────────────────
    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    /// A compensation step could not restore the pre-attempt state.
    #[error("Consistency failure: {message}")]
    Consistency { message: String },

    // ── Lifecycle / configuration ────────────────────────────────────
    #[error("Booking controller is not running")]
    ControllerStopped,

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` for typed business rejections: the request was well-formed
    /// but the current state does not allow it. Nothing was mutated.
    pub fn is_business_rejection(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed { .. }
                | Self::NotFound { .. }
                | Self::InvalidState { .. }
                | Self::AlreadyBooked { .. }
                | Self::Exhausted { .. }
                | Self::InsufficientFunds { .. }
                | Self::CapacityReached { .. }
        )
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn invalid_state(
        entity_type: &str,
        identifier: impl ToString,
        current: impl ToString,
        operation: &str,
    ) -> Self {
        Self::InvalidState {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_string(),
            current: current.to_string(),
            operation: operation.to_owned(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<slotbook_api::Error> for CoreError {
    fn from(err: slotbook_api::Error) -> Self {
        match err {
            slotbook_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid room service URL: {e}"),
            },
            other => CoreError::Provisioning(ProvisioningError::from(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rejections_are_classified() {
        assert!(CoreError::validation("missing slot").is_business_rejection());
        assert!(
            CoreError::InsufficientFunds {
                consumer: "u1".into(),
                balance: 5,
                required: 10,
            }
            .is_business_rejection()
        );
        assert!(
            !CoreError::Consistency {
                message: "slot vanished".into()
            }
            .is_business_rejection()
        );
        assert!(
            !CoreError::Provisioning(ProvisioningError::Timeout { timeout_ms: 10 })
                .is_business_rejection()
        );
    }

    #[test]
    fn api_errors_become_provisioning_failures() {
        let err = CoreError::from(slotbook_api::Error::Api {
            message: "boom".into(),
            code: None,
            status: 502,
        });
        assert!(matches!(err, CoreError::Provisioning(_)));
    }
}
