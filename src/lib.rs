//! # Delivery GA
//!
//! Genetic-algorithm search for low-cost delivery routes over a set of
//! cities, under vehicle capacity and range limits.
//!
//! Two searches share the same problem model and operators:
//!
//! - [`TspEngine`]: one tour over every city, advanced one generation per
//!   [`TspEngine::step`] call for as long as the caller wants.
//! - [`VrpEngine`]: cities partitioned over several vehicles, with a bounded
//!   generation budget per [`VrpEngine::solve`] call, stagnation restarts and a
//!   final feasibility repair.
//!
//! Distances come from a [`problem::DistanceOracle`]; a missing pair is a hard
//! error, while constraint violations are modelled as fitness penalties.

pub mod config;
pub mod error;
pub mod fitness;
pub mod genetic;
pub mod individual;
pub mod population;
pub mod problem;
pub mod solution;
pub mod tsp;
pub mod utils;
pub mod vrp;

pub use crate::config::{Config, VrpConfig};
pub use crate::error::{Result, RoutingError};
pub use crate::problem::Problem;
pub use crate::tsp::{GenerationResult, TspEngine};
pub use crate::vrp::{VrpEngine, VrpOutcome};
