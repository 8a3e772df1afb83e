//! Multi-vehicle fitness.

use crate::config::VrpConfig;
use crate::problem::Problem;
use crate::solution::Solution;
use std::collections::HashSet;

/// Fitness of any solution that dispatches one vehicle on two routes.
pub const DUPLICATE_VEHICLE_FITNESS: f64 = f64::MAX;

/// Scores solutions whose route statistics are up to date.
///
/// Any solution with a weight or distance violation scores strictly above
/// `feasible_ceiling`, an upper bound on the fitness of every feasible
/// solution of the problem, so infeasible never beats feasible.
#[derive(Debug, Clone)]
pub struct VrpEvaluator {
    config: VrpConfig,
    city_count: usize,
    min_vehicles: usize,
    feasible_ceiling: f64,
}

impl VrpEvaluator {
    pub fn new(problem: &Problem, config: &VrpConfig) -> Self {
        let weights = &config.weights;
        let vehicle_count = problem.vehicles().len() as f64;

        // Each vehicle drives at most one route, at most its full range.
        let max_cost: f64 = problem
            .vehicles()
            .iter()
            .map(|v| v.max_distance * v.cost_per_km + config.dispatch_fee)
            .sum();

        // Lateness is below 1 and the priority weight at most triples.
        let max_priority: f64 = (0..problem.city_count())
            .flat_map(|city| problem.deliveries(city))
            .map(|d| config.priority_table.weight(d.priority))
            .sum::<f64>()
            * weights.priority
            * 3.0;

        let max_vehicle_penalty = vehicle_count * (weights.vehicle_count + weights.vehicle_use);
        let max_uncovered = problem.city_count() as f64 * weights.uncovered_city;

        VrpEvaluator {
            config: config.clone(),
            city_count: problem.city_count(),
            min_vehicles: (problem.city_count() / 10).max(1),
            feasible_ceiling: max_cost + max_priority + max_vehicle_penalty + max_uncovered,
        }
    }

    /// Upper bound on the fitness of any feasible solution.
    pub fn feasible_ceiling(&self) -> f64 {
        self.feasible_ceiling
    }

    /// Weight of the priority term at `progress` (0 at the first generation,
    /// approaching 1 at the last).
    pub fn priority_weight(&self, progress: f64) -> f64 {
        self.config.weights.priority * (1.0 + 2.0 * progress.clamp(0.0, 1.0))
    }

    /// Vehicle-count penalty; one or two active vehicles are discounted.
    pub fn vehicle_penalty(&self, active_routes: usize) -> f64 {
        let weights = &self.config.weights;
        let mut penalty = active_routes as f64 * weights.vehicle_count;

        match active_routes {
            1 => penalty *= 0.3,
            2 => penalty *= 0.7,
            _ => {}
        }

        if active_routes > self.min_vehicles {
            penalty += (active_routes - self.min_vehicles) as f64 * weights.vehicle_use;
        }

        penalty
    }

    /// Score a solution. Lower is better.
    pub fn evaluate(&self, solution: &Solution, progress: f64) -> f64 {
        let weights = &self.config.weights;

        let mut fitness = 0.0;
        let mut used_vehicles = HashSet::new();
        let mut covered = HashSet::new();
        let mut active_routes = 0;
        let mut violations = 0;
        let mut feasible_cost = 0.0;
        let mut priority_score = 0.0;

        for route in solution.active_routes() {
            active_routes += 1;

            if !used_vehicles.insert(route.vehicle) {
                return DUPLICATE_VEHICLE_FITNESS;
            }

            if route.weight_violation > 0.0 {
                violations += 1;
                fitness += route.weight_violation.powi(2) * weights.weight_violation;
            }
            if route.distance_violation > 0.0 {
                violations += 1;
                fitness += route.distance_violation.powi(2) * weights.distance_violation;
            }

            if route.is_feasible {
                feasible_cost += route.cost;
            }
            priority_score += route.priority_score;
            covered.extend(route.cities.iter().copied());
        }

        let missing = (0..self.city_count).filter(|c| !covered.contains(c)).count();
        fitness += missing as f64 * weights.uncovered_city;

        if violations > 0 {
            fitness += self.feasible_ceiling;
            fitness += violations as f64 * weights.capacity_violation * 1000.0;
            fitness += feasible_cost * 100.0;
        } else {
            fitness += feasible_cost;
            fitness += priority_score * self.priority_weight(progress);
            fitness += self.vehicle_penalty(active_routes);
        }

        fitness
    }
}
