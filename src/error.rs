//! Error type shared by the whole crate.

use std::fmt;
use std::io;

/// Hard failures caused by malformed input. Constraint violations found
/// during search are never reported here; they are fitness penalties.
#[derive(Debug)]
pub enum RoutingError {
    /// The distance oracle has no entry for a pair the search needed.
    MissingDistance { from: String, to: String },
    /// No vehicles were supplied, so no route can ever be feasible.
    NoVehicles,
    /// A delivery or depot refers to a city that is not part of the problem.
    UnknownCity { city: String },
    /// Two cities share a coordinate, which breaks the coordinate -> city mapping.
    DuplicateCoordinate { x: i64, y: i64 },
    /// The same city name was listed twice.
    DuplicateCity { city: String },
    /// Two vehicles carry the same identifier.
    DuplicateVehicle { vehicle_id: String },
    /// A configuration value is out of range.
    InvalidParameter { name: &'static str, reason: String },
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::MissingDistance { from, to } => {
                write!(f, "No distance known between '{}' and '{}'", from, to)
            }
            RoutingError::NoVehicles => write!(f, "At least one vehicle is required"),
            RoutingError::UnknownCity { city } => write!(f, "Unknown city '{}'", city),
            RoutingError::DuplicateCoordinate { x, y } => {
                write!(f, "Coordinate ({}, {}) is used by more than one city", x, y)
            }
            RoutingError::DuplicateCity { city } => write!(f, "City '{}' is listed twice", city),
            RoutingError::DuplicateVehicle { vehicle_id } => {
                write!(f, "Vehicle id '{}' is used by more than one vehicle", vehicle_id)
            }
            RoutingError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            RoutingError::Io(err) => write!(f, "I/O error: {}", err),
            RoutingError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for RoutingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoutingError::Io(err) => Some(err),
            RoutingError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RoutingError {
    fn from(err: io::Error) -> Self {
        RoutingError::Io(err)
    }
}

impl From<serde_json::Error> for RoutingError {
    fn from(err: serde_json::Error) -> Self {
        RoutingError::Json(err)
    }
}

pub type Result<T> = std::result::Result<T, RoutingError>;
