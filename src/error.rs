use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use ndarray::ShapeError;
use rand_distr::{NormalError, uniform::Error as UniformError};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, FactorErr>;

/// The factorization crate's error type.
#[derive(Debug)]
pub enum FactorErr {
    InvalidRatingsShape {
        rows: usize,
        cols: usize,
    },
    InvalidId {
        column: &'static str,
        value: f64,
    },
    IdOutOfRange {
        kind: &'static str,
        id: usize,
        len: usize,
    },
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidConfig(String),
    Initializer(String),
    Shape(ShapeError),
    Io(io::Error),
    MissingGlobalStep,
    NotTrained,
    EmptyEvaluation,
}

impl Display for FactorErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactorErr::InvalidRatingsShape { rows, cols } => write!(
                f,
                "ratings must be a non-empty array with 3 columns (user, item, rating), got {rows}x{cols}"
            ),
            FactorErr::InvalidId { column, value } => {
                write!(f, "{column} column holds {value}, which is not a valid id")
            }
            FactorErr::IdOutOfRange { kind, id, len } => {
                write!(f, "{kind} id {id} is out of range, there are only {len}")
            }
            FactorErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
            FactorErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            FactorErr::Initializer(msg) => write!(f, "initializer error: {msg}"),
            FactorErr::Shape(e) => write!(f, "shape error: {e}"),
            FactorErr::Io(e) => write!(f, "io error: {e}"),
            FactorErr::MissingGlobalStep => {
                write!(f, "a global step must exist before building the train op")
            }
            FactorErr::NotTrained => write!(f, "model has no trained parameters"),
            FactorErr::EmptyEvaluation => write!(f, "cannot compute rmse over zero ratings"),
        }
    }
}

impl Error for FactorErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FactorErr::Shape(e) => Some(e),
            FactorErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for FactorErr {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}

impl From<io::Error> for FactorErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<NormalError> for FactorErr {
    fn from(value: NormalError) -> Self {
        Self::Initializer(value.to_string())
    }
}

impl From<UniformError> for FactorErr {
    fn from(value: UniformError) -> Self {
        Self::Initializer(value.to_string())
    }
}

impl From<serde_json::Error> for FactorErr {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidConfig(value.to_string())
    }
}
