//! Route-partition representation for the multi-vehicle search.

use crate::config::VrpConfig;
use crate::error::Result;
use crate::fitness::{priority_penalty, route_distance, route_weight};
use crate::problem::Problem;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One vehicle's ordered sequence of cities, with statistics derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Index of the vehicle in `Problem::vehicles`
    pub vehicle: usize,
    /// The cities to visit, in order
    pub cities: Vec<usize>,
    /// Total distance, depot legs included when the problem has a depot
    pub distance: f64,
    /// Total delivery weight
    pub weight: f64,
    /// `distance * cost_per_km + dispatch_fee`
    pub cost: f64,
    /// Weighted lateness of the deliveries on this route
    pub priority_score: f64,
    /// Weight above the vehicle's capacity
    pub weight_violation: f64,
    /// Distance above the vehicle's range
    pub distance_violation: f64,
    pub is_feasible: bool,
}

impl Route {
    /// Create a route with stale statistics; call `calculate_stats` before use.
    pub fn new(vehicle: usize, cities: Vec<usize>) -> Self {
        Route {
            vehicle,
            cities,
            distance: 0.0,
            weight: 0.0,
            cost: 0.0,
            priority_score: 0.0,
            weight_violation: 0.0,
            distance_violation: 0.0,
            is_feasible: true,
        }
    }

    /// Recompute every statistic from the city sequence.
    pub fn calculate_stats(&mut self, problem: &Problem, config: &VrpConfig) -> Result<()> {
        if self.cities.is_empty() {
            *self = Route::new(self.vehicle, Vec::new());
            return Ok(());
        }

        let vehicle = &problem.vehicles()[self.vehicle];

        self.distance = route_distance(problem, &self.cities, problem.depot())?;
        self.weight = route_weight(problem, &self.cities);
        self.cost = self.distance * vehicle.cost_per_km + config.dispatch_fee;
        self.weight_violation = (self.weight - vehicle.max_weight).max(0.0);
        self.distance_violation = (self.distance - vehicle.max_distance).max(0.0);
        self.is_feasible = self.weight_violation == 0.0 && self.distance_violation == 0.0;
        self.priority_score = priority_penalty(problem, &self.cities, &config.priority_table);

        Ok(())
    }

    /// Check if the route is empty.
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// The larger of the two constraint violations.
    pub fn worst_violation(&self) -> f64 {
        self.weight_violation.max(self.distance_violation)
    }

    /// Number of deliveries with priority 0, 1 and 2-or-lower on this route.
    pub fn priority_counts(&self, problem: &Problem) -> [usize; 3] {
        let mut counts = [0; 3];
        for &city in &self.cities {
            for delivery in problem.deliveries(city) {
                counts[(delivery.priority as usize).min(2)] += 1;
            }
        }
        counts
    }

    /// Mean relative position (`p / n`) of the priority-0 deliveries, if any.
    pub fn urgent_position(&self, problem: &Problem) -> Option<f64> {
        let stops = self.cities.len() as f64;
        let positions: Vec<f64> = self
            .cities
            .iter()
            .enumerate()
            .flat_map(|(p, &city)| {
                problem
                    .deliveries(city)
                    .iter()
                    .filter(|d| d.priority == 0)
                    .map(move |_| p as f64 / stops)
            })
            .collect();

        if positions.is_empty() {
            None
        } else {
            Some(positions.iter().sum::<f64>() / positions.len() as f64)
        }
    }
}

/// A complete multi-vehicle solution: a set of routes, each on its own vehicle.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Solution {
    /// The list of routes
    pub routes: Vec<Route>,
    /// Fitness from the last evaluation; lower is better
    pub fitness: f64,
}

impl Solution {
    /// Create a solution from a set of routes.
    pub fn new(routes: Vec<Route>) -> Self {
        Solution {
            routes,
            fitness: 0.0,
        }
    }

    /// Recompute the statistics of every route.
    pub fn calculate_stats(&mut self, problem: &Problem, config: &VrpConfig) -> Result<()> {
        for route in &mut self.routes {
            route.calculate_stats(problem, config)?;
        }
        Ok(())
    }

    /// The non-empty routes.
    pub fn active_routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(|r| !r.is_empty())
    }

    /// Get the number of non-empty routes.
    pub fn get_route_count(&self) -> usize {
        self.active_routes().count()
    }

    /// Check that no vehicle drives two non-empty routes.
    pub fn has_unique_vehicles(&self) -> bool {
        let mut seen = HashSet::new();
        self.active_routes().all(|r| seen.insert(r.vehicle))
    }

    /// Every active route is within its vehicle's limits and no vehicle is reused.
    pub fn is_feasible(&self) -> bool {
        self.active_routes().all(|r| r.is_feasible) && self.has_unique_vehicles()
    }

    /// Whether any route currently violates weight or distance.
    pub fn has_violations(&self) -> bool {
        self.active_routes().any(|r| !r.is_feasible)
    }

    /// The set of cities visited by any route.
    pub fn covered_cities(&self) -> HashSet<usize> {
        self.routes.iter().flat_map(|r| r.cities.iter().copied()).collect()
    }

    /// Every one of the problem's cities is visited.
    pub fn covers_all(&self, problem: &Problem) -> bool {
        let covered = self.covered_cities();
        (0..problem.city_count()).all(|city| covered.contains(&city))
    }

    pub fn total_cost(&self) -> f64 {
        self.active_routes().map(|r| r.cost).sum()
    }

    pub fn total_distance(&self) -> f64 {
        self.active_routes().map(|r| r.distance).sum()
    }

    pub fn total_weight(&self) -> f64 {
        self.active_routes().map(|r| r.weight).sum()
    }

    /// Drop routes that visit no city.
    pub fn remove_empty_routes(&mut self) {
        self.routes.retain(|r| !r.is_empty());
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution:")?;
        writeln!(f, "  Fitness: {:.2}", self.fitness)?;
        writeln!(f, "  Cost: {:.2}", self.total_cost())?;
        writeln!(f, "  Distance: {:.2}", self.total_distance())?;
        writeln!(f, "  Feasible: {}", self.is_feasible())?;
        writeln!(f, "  Routes: {}", self.get_route_count())?;

        for (i, route) in self.routes.iter().enumerate() {
            writeln!(
                f,
                "  Route {} (vehicle {}): {:?} (Weight: {:.2}, Distance: {:.2})",
                i, route.vehicle, route.cities, route.weight, route.distance
            )?;
        }

        Ok(())
    }
}
