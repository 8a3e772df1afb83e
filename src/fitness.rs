//! Route measures and the single-vehicle fitness function.

use crate::config::{Config, PriorityTable};
use crate::error::Result;
use crate::problem::{Problem, Vehicle};
use serde::{Deserialize, Serialize};

/// Length of the closed tour over `tour`, wrap-around leg included.
pub fn tour_distance(problem: &Problem, tour: &[usize]) -> Result<f64> {
    let mut total = 0.0;

    for i in 0..tour.len() {
        total += problem.distance(tour[i], tour[(i + 1) % tour.len()])?;
    }

    Ok(total)
}

/// Length of a route. With a depot the route starts and ends there; without
/// one it is a closed tour over its own stops.
pub fn route_distance(problem: &Problem, route: &[usize], depot: Option<usize>) -> Result<f64> {
    let (first, last) = match (route.first(), route.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Ok(0.0),
    };

    match depot {
        Some(depot) => {
            let mut total = problem.distance(depot, first)?;
            for pair in route.windows(2) {
                total += problem.distance(pair[0], pair[1])?;
            }
            total += problem.distance(last, depot)?;
            Ok(total)
        }
        None => tour_distance(problem, route),
    }
}

/// Total delivery weight of the cities on a route.
pub fn route_weight(problem: &Problem, route: &[usize]) -> f64 {
    route.iter().map(|&city| problem.city_weight(city)).sum()
}

/// Weighted lateness of the deliveries on a route.
///
/// A delivery at position `p` of `n` stops contributes `p / n` times the
/// table weight of its priority, so urgent deliveries placed late cost most.
pub fn priority_penalty(problem: &Problem, route: &[usize], table: &PriorityTable) -> f64 {
    let stops = route.len() as f64;
    let mut penalty = 0.0;

    for (position, &city) in route.iter().enumerate() {
        let lateness = position as f64 / stops;
        for delivery in problem.deliveries(city) {
            penalty += lateness * table.weight(delivery.priority);
        }
    }

    penalty
}

/// The cheapest vehicle per km that can cover the given load and distance.
pub fn select_vehicle(vehicles: &[Vehicle], weight: f64, distance: f64) -> Option<&Vehicle> {
    vehicles
        .iter()
        .filter(|v| v.can_cover(weight, distance))
        .min_by(|a, b| {
            a.cost_per_km
                .partial_cmp(&b.cost_per_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Breakdown of a single-vehicle tour's fitness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TourEvaluation {
    pub fitness: f64,
    pub distance: f64,
    pub weight: f64,
    pub priority_penalty: f64,
    pub feasibility_penalty: f64,
}

impl TourEvaluation {
    /// Whether some vehicle can run this tour.
    pub fn is_feasible(&self) -> bool {
        self.feasibility_penalty == 0.0
    }
}

/// Penalty for a tour no vehicle can cover: a fixed amount plus, optionally,
/// a per-unit charge on the excess over the most permissive vehicle.
fn feasibility_penalty(problem: &Problem, config: &Config, weight: f64, distance: f64) -> f64 {
    let vehicles = problem.vehicles();
    if vehicles.iter().any(|v| v.can_cover(weight, distance)) {
        return 0.0;
    }

    let mut penalty = config.infeasible_penalty;

    if let Some(per_unit) = config.graduated_penalty {
        let max_weight = vehicles.iter().map(|v| v.max_weight).fold(0.0, f64::max);
        let max_distance = vehicles.iter().map(|v| v.max_distance).fold(0.0, f64::max);
        let excess = (weight - max_weight).max(0.0) + (distance - max_distance).max(0.0);
        penalty += per_unit * excess;
    }

    penalty
}

/// Evaluate a single-vehicle tour: distance + weighted priority penalty +
/// feasibility term. Lower is better.
pub fn evaluate_tour(problem: &Problem, config: &Config, tour: &[usize]) -> Result<TourEvaluation> {
    let distance = tour_distance(problem, tour)?;
    let weight = route_weight(problem, tour);
    let priority = priority_penalty(problem, tour, &config.priority_table);
    let feasibility = feasibility_penalty(problem, config, weight, distance);

    Ok(TourEvaluation {
        fitness: distance + config.priority_weight * priority + feasibility,
        distance,
        weight,
        priority_penalty: priority,
        feasibility_penalty: feasibility,
    })
}
