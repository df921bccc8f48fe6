//! Error types shared across the node graph, trainers and snapshot I/O.

/// Errors raised by network construction, evaluation and persistence
#[derive(Debug)]
pub enum NetworkError {
    /// Weight/bias vectors do not match the declared input arity
    WeightBiasMismatch {
        num_inputs: usize,
        weights: usize,
        biases: usize,
    },
    /// A non-input node was wired with the wrong number of parents
    ParentCountMismatch { expected: usize, found: usize },
    /// Activation selector is not one of the supported names
    UnknownActivation(String),
    /// `evaluate` was called with a wrong-length input vector
    InputLength { expected: usize, found: usize },
    /// Grid or snapshot shape does not match the live network
    Shape(String),
    /// Gradient training toward a zero goal: the relative-tolerance stop
    /// and the percent-reached report both divide by the goal
    ZeroGoal,
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WeightBiasMismatch {
                num_inputs,
                weights,
                biases,
            } => write!(
                f,
                "length of weights ({}) and biases ({}) does not equal num_inputs ({})",
                weights, biases, num_inputs
            ),
            Self::ParentCountMismatch { expected, found } => write!(
                f,
                "length of parents ({}) does not match number of inputs ({})",
                found, expected
            ),
            Self::UnknownActivation(name) => write!(
                f,
                "unknown activation '{}': options are 'relu' and 'sigmoid'",
                name
            ),
            Self::InputLength { expected, found } => {
                write!(f, "wrong number of inputs: expected {}, got {}", expected, found)
            }
            Self::Shape(msg) => write!(f, "shape mismatch: {}", msg),
            Self::ZeroGoal => write!(f, "gradient training requires a non-zero goal"),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for NetworkError {}

impl From<std::io::Error> for NetworkError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
