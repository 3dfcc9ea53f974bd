//! Error types for script validation

use thiserror::Error;

/// Internal failure categories for script validation.
///
/// The top-level [`evaluate`](crate::evaluate) entry point collapses every
/// variant into a plain reject; the distinctions exist for telemetry and
/// for tests that pin down where a script fails.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptError {
    #[error("push data extends past the end of the script")]
    ParseUnderflow,

    #[error("operation requires more stack items than are present")]
    StackUnderflow,

    #[error("ELSE or ENDIF without an open IF, or IF left open at end of script")]
    UnbalancedConditional,

    #[error("disabled, reserved, or unknown opcode executed")]
    DisabledOpcode,

    #[error("numeric operand longer than 4 bytes")]
    NumericOverflow,

    #[error("VERIFY-class operation found a false condition")]
    VerifyFailed,

    #[error("signature verification failed")]
    SignatureCheckFailed,

    #[error("input script feeding a script-hash output is not push-only")]
    NonPushInput,
}

pub type Result<T> = std::result::Result<T, ScriptError>;
