use std::fmt;
use std::io;

/// Failure while processing a command stream.
///
/// Offsets are byte positions into the input where the offending token
/// starts.
#[derive(Debug)]
pub enum DriverError {
    /// A command other than `k` or `q`.
    UnknownCommand { offset: usize },
    /// A missing argument, or one that does not parse as the element type.
    WrongInput { offset: usize },
    Io(io::Error),
}

impl DriverError {
    pub fn offset(&self) -> Option<usize> {
        match self {
            DriverError::UnknownCommand { offset } | DriverError::WrongInput { offset } => {
                Some(*offset)
            }
            DriverError::Io(_) => None,
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DriverError::UnknownCommand { offset } => write!(f, "Unknown command at byte {}", offset),
            DriverError::WrongInput { offset } => write!(f, "Wrong input at byte {}", offset),
            DriverError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DriverError {
    fn from(e: io::Error) -> Self {
        DriverError::Io(e)
    }
}
