use std::process::ExitCode;

use super::report::ExtractSummary;

/// How a command ended, mapped onto the process exit code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Nothing to report beyond warnings.
    Success,
    /// The run finished, but an error diagnostic was reported or an input
    /// could not be read.
    Failure,
    /// The run could not start: bad configuration, invalid pattern, I/O.
    Error,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::Error => 2,
        }
    }
}

impl From<&ExtractSummary> for ExitStatus {
    fn from(summary: &ExtractSummary) -> Self {
        if summary.error_count > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(error_count: usize, warning_count: usize) -> ExtractSummary {
        ExtractSummary {
            message_count: 3,
            file_count: 2,
            error_count,
            warning_count,
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Failure.code(), 1);
        assert_eq!(ExitStatus::Error.code(), 2);
    }

    #[test]
    fn test_warnings_alone_succeed() {
        assert_eq!(ExitStatus::from(&summary(0, 4)), ExitStatus::Success);
        assert_eq!(ExitStatus::from(&summary(1, 0)), ExitStatus::Failure);
    }
}
