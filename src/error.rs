//! Error type shared by the instance loaders, the operators and the controller.

use std::fmt;

/// Errors surfaced by the crate.
///
/// Infeasible moves and missing supplies are not errors: they are folded into
/// the fitness landscape as penalties or reported shortfall.
#[derive(Debug)]
pub enum Error {
    /// The problem instance cannot be searched (no locations, malformed matrices,
    /// demand for a category without a consumption rate, ...).
    InvalidInstance(String),
    /// An algorithm parameter is out of range.
    InvalidConfig(String),
    /// Rejection sampling found no legal cell within the attempt budget.
    SamplingStall { attempts: usize },
    /// The weighted sampler rejected the selection weights.
    Selection(String),
    /// Reading an instance file failed.
    Io(std::io::Error),
    /// Decoding an instance file failed.
    Parse(serde_json::Error),
}

/// A type alias for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInstance(msg) => write!(f, "invalid instance: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Error::SamplingStall { attempts } => {
                write!(f, "no legal cell found after {} sampling attempts", attempts)
            }
            Error::Selection(msg) => write!(f, "parent selection failed: {}", msg),
            Error::Io(err) => write!(f, "i/o error: {}", err),
            Error::Parse(err) => write!(f, "cannot parse instance: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err)
    }
}

impl From<rand::distributions::WeightedError> for Error {
    fn from(err: rand::distributions::WeightedError) -> Self {
        Error::Selection(err.to_string())
    }
}
