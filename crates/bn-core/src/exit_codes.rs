//! Exit codes for the bn-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0: success
//! - 10-19: User/input errors (fix the arguments, network, or evidence)
//! - 20-29: Internal errors (bugs, should be reported)

use bn_common::{Error, ErrorCategory};

/// Exit codes for bn-core operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    // ========================================================================
    // User / Input Errors (10-19)
    // ========================================================================
    /// Invalid arguments (bad evidence syntax, unknown preset, no network)
    ArgsError = 10,

    /// Network file missing, malformed, structurally invalid, or incomplete
    NetworkError = 11,

    /// Query does not fit the network
    QueryError = 12,

    /// Evidence has probability zero under the model
    ZeroEvidence = 13,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Check if this exit code is a user/input error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Check if this exit code is an internal error (codes 20-29).
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::NetworkError => "ERR_NETWORK",
            ExitCode::QueryError => "ERR_QUERY",
            ExitCode::ZeroEvidence => "ERR_ZERO_EVIDENCE",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for an application error.
    pub fn for_error(err: &Error) -> ExitCode {
        match err {
            Error::UnknownPreset(_) | Error::NoNetwork | Error::InvalidArgument(_) => {
                ExitCode::ArgsError
            }
            Error::ZeroEvidence { .. } => ExitCode::ZeroEvidence,
            // A gap found during evaluation is a defect of the network file.
            Error::MissingTableEntry(_) => ExitCode::NetworkError,
            Error::Json(_) => ExitCode::InternalError,
            _ => match err.category() {
                ErrorCategory::Config | ErrorCategory::Structure => ExitCode::NetworkError,
                ErrorCategory::Query => ExitCode::QueryError,
                ErrorCategory::Io => ExitCode::IoError,
            },
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        ExitCode::for_error(err)
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Clean.as_i32(), 0);
        assert_eq!(ExitCode::ArgsError.as_i32(), 10);
        assert_eq!(ExitCode::NetworkError.as_i32(), 11);
        assert_eq!(ExitCode::QueryError.as_i32(), 12);
        assert_eq!(ExitCode::ZeroEvidence.as_i32(), 13);
        assert_eq!(ExitCode::InternalError.as_i32(), 20);
        assert_eq!(ExitCode::IoError.as_i32(), 21);
    }

    #[test]
    fn test_exit_code_ranges() {
        assert!(ExitCode::Clean.is_success());
        assert!(!ExitCode::Clean.is_user_error());
        assert!(ExitCode::ZeroEvidence.is_user_error());
        assert!(!ExitCode::QueryError.is_internal_error());
        assert!(ExitCode::IoError.is_internal_error());
    }

    #[test]
    fn test_errors_map_to_exit_codes() {
        let cases = [
            (Error::NoNetwork, ExitCode::ArgsError),
            (Error::UnknownPreset("fog".into()), ExitCode::ArgsError),
            (Error::InvalidArgument("A".into()), ExitCode::ArgsError),
            (
                Error::InvalidNetworkFile {
                    path: "n.json".into(),
                    message: "bad".into(),
                },
                ExitCode::NetworkError,
            ),
            (Error::Structural("dup".into()), ExitCode::NetworkError),
            (Error::IncompleteTable("row".into()), ExitCode::NetworkError),
            (Error::MissingTableEntry("row".into()), ExitCode::NetworkError),
            (Error::InvalidQuery("q".into()), ExitCode::QueryError),
            (Error::MissingAssignment("A".into()), ExitCode::QueryError),
            (
                Error::ZeroEvidence {
                    evidence: "A=sim".into(),
                },
                ExitCode::ZeroEvidence,
            ),
        ];
        for (err, expected) in &cases {
            assert_eq!(ExitCode::from(err), *expected, "{:?}", err);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::QueryError.to_string(), "ERR_QUERY (12)");
    }
}
