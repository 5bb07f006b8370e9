use crate::domain::NodeId;

/// Application-level error: a message plus the process exit code.
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

/// Errors raised by the estimator and its model collaborators.
///
/// Some variants only ever describe a single candidate (they are scored as
/// impossible instead of being returned); see [`EstimationError::is_per_candidate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimationError {
    #[error("at least 2 observers are required, got {found}")]
    InsufficientObservers { found: usize },

    #[error("only {selected} usable non-reference observer(s), need at least {required}")]
    InsufficientSelectedObservers { selected: usize, required: usize },

    #[error("covariance matrix is singular")]
    SingularCovariance,

    #[error("only {usable} realisation(s) reach the candidate from every selected observer, need at least 2")]
    DegenerateEnsemble { usable: usize },

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("observer {0} is not a node of the graph")]
    UnknownObserver(NodeId),

    #[error("observation time for node {0} is not finite")]
    NonFiniteObservation(NodeId),

    #[error("reference node {0} is not an observer")]
    UnknownReference(NodeId),

    #[error("edge ({a}, {b}) has invalid delay {delay}")]
    InvalidDelay { a: NodeId, b: NodeId, delay: f64 },

    #[error("edge ({0}, {1}) is not part of the graph")]
    UnknownEdge(NodeId, NodeId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("every graph node is an observer, no candidate left to score")]
    NoCandidates,

    #[error("no candidate has a finite log-likelihood")]
    NoFeasibleCandidate,
}

impl EstimationError {
    /// True for failures that only rule out one candidate.
    pub fn is_per_candidate(&self) -> bool {
        matches!(
            self,
            EstimationError::InsufficientSelectedObservers { .. }
                | EstimationError::SingularCovariance
                | EstimationError::DegenerateEnsemble { .. }
                | EstimationError::DimensionMismatch(_)
        )
    }
}

impl From<EstimationError> for AppError {
    fn from(err: EstimationError) -> Self {
        let exit_code = match &err {
            EstimationError::NoFeasibleCandidate => 4,
            EstimationError::InvalidConfig(_)
            | EstimationError::InvalidDelay { .. }
            | EstimationError::UnknownEdge(..) => 2,
            _ => 3,
        };
        AppError::new(exit_code, format!("Estimation failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_map_to_exit_codes() {
        let app: AppError = EstimationError::InsufficientObservers { found: 1 }.into();
        assert_eq!(app.exit_code(), 3);
        assert!(app.to_string().contains("at least 2 observers"));

        let app: AppError = EstimationError::NoFeasibleCandidate.into();
        assert_eq!(app.exit_code(), 4);
    }

    #[test]
    fn per_candidate_classification() {
        assert!(EstimationError::SingularCovariance.is_per_candidate());
        assert!(EstimationError::DegenerateEnsemble { usable: 1 }.is_per_candidate());
        assert!(!EstimationError::NoCandidates.is_per_candidate());
        assert!(!EstimationError::UnknownObserver(3).is_per_candidate());
    }
}
