/// Application-level error carrying the process exit code.
///
/// Exit codes:
/// - 2: input, configuration or file I/O problems
/// - 3: no viable staging solution for a specimen
/// - 4: internal numerical failures (e.g. unusable calibration data)
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Why the descriptor extraction could not produce a solution.
///
/// These are expected outcomes for poorly digitized outlines, not bugs: the
/// caller should ask for a new set of points.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingError {
    #[error("round {round}: found {peaks} peak(s) and {valleys} valley(s), need at least one of each")]
    InsufficientExtrema {
        round: usize,
        peaks: usize,
        valleys: usize,
    },
    #[error("round {round}: no circle fits the peak points")]
    DegenerateCircleFit { round: usize },
    #[error("outline has no usable extent")]
    DegenerateOutline,
}

impl StagingError {
    /// The descriptor triple reported in place of a solution.
    pub fn canonical_triple(&self) -> [f64; 3] {
        [0.0; 3]
    }
}

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        AppError::new(
            3,
            format!("Could not find a solution ({err}). Try again with new points!"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_errors_map_to_no_solution_exit_code() {
        let err: AppError = StagingError::DegenerateCircleFit { round: 2 }.into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("round 2"));
    }
}
