//! Exit codes for the bayes-lab CLI.
//!
//! Ranges:
//! - 0: success
//! - 10-19: user/environment errors (recoverable by user action)
//! - 20-29: internal errors (bugs, should be reported)

/// Exit codes for bayes-lab commands.
///
/// These codes are a stable contract for scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    // User / environment errors (10-19)
    /// Invalid arguments or out-of-range rates
    ArgsError = 10,

    /// Settings file missing, malformed, or semantically invalid
    ConfigError = 11,

    /// Named scenario not in the catalog
    ScenarioNotFound = 12,

    // Internal errors (20-29)
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Codes 10-19.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Codes 20-29.
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Error code name (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::ScenarioNotFound => "ERR_SCENARIO",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&bl_common::Error> for ExitCode {
    fn from(err: &bl_common::Error) -> Self {
        use bl_common::Error;
        match err {
            Error::Config(_) | Error::InvalidConfig(_) | Error::SchemaValidation(_) => {
                ExitCode::ConfigError
            }
            Error::InvalidRate { .. } | Error::InvalidArgument(_) => ExitCode::ArgsError,
            Error::ScenarioNotFound { .. } => ExitCode::ScenarioNotFound,
            Error::DuplicateScenario { .. } => ExitCode::ConfigError,
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::InternalError,
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
