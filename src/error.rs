//! Error types for the analysis-design engine

use thiserror::Error;

/// The stage of a convergence run in which an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Model construction / topology validation
    Validation,
    /// Load case and combination generation
    Loads,
    /// Stiffness assembly, solve, force recovery
    Analysis,
    /// Member design and escalation
    Design,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Validation => write!(f, "validation"),
            Stage::Loads => write!(f, "load generation"),
            Stage::Analysis => write!(f, "analysis"),
            Stage::Design => write!(f, "design"),
        }
    }
}

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Node '{0}' not found in model")]
    NodeNotFound(String),

    #[error("Element '{0}' not found in model")]
    ElementNotFound(String),

    #[error("Material '{0}' not found in model")]
    MaterialNotFound(String),

    #[error("Section '{0}' not found in model")]
    SectionNotFound(String),

    #[error("Load combination '{0}' not found in model")]
    LoadCombinationNotFound(String),

    #[error("Duplicate name '{0}' already exists")]
    DuplicateName(String),

    #[error("Malformed topology: {0}")]
    Topology(String),

    #[error("Load case of kind '{kind}' is mandated by the {code} combination set but was not supplied")]
    IncompleteLoadData { kind: String, code: String },

    #[error("Singular system: structure is kinematically unstable at node '{node}' DOF {dof}")]
    SingularSystem { node: String, dof: usize },

    #[error("Solver residual {residual:.3e} exceeds tolerance {tolerance:.1e} after refinement")]
    SolverConvergence { residual: f64, tolerance: f64 },

    #[error("Design did not converge after {cycles} cycles: {reason}")]
    NonConvergent { cycles: usize, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    /// The run stage this error terminates. Callers receive exactly one
    /// terminal error per failed run; this names the failing stage.
    pub fn stage(&self) -> Stage {
        match self {
            EngineError::NodeNotFound(_)
            | EngineError::ElementNotFound(_)
            | EngineError::MaterialNotFound(_)
            | EngineError::SectionNotFound(_)
            | EngineError::DuplicateName(_)
            | EngineError::Topology(_)
            | EngineError::InvalidInput(_) => Stage::Validation,
            EngineError::IncompleteLoadData { .. }
            | EngineError::LoadCombinationNotFound(_) => Stage::Loads,
            EngineError::SingularSystem { .. } | EngineError::SolverConvergence { .. } => {
                Stage::Analysis
            }
            EngineError::NonConvergent { .. } => Stage::Design,
        }
    }

    /// Whether the error reflects structurally wrong input data (surfaced
    /// immediately, never retried) as opposed to a numerical or design
    /// outcome reached after bounded retries.
    pub fn is_data_error(&self) -> bool {
        matches!(self.stage(), Stage::Validation | Stage::Loads)
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
