//! Result export and reporting helpers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::error::Result;
use crate::problem::Problem;
use crate::solution::{Route, Solution};
use crate::tsp::TspEngine;
use crate::vrp::VrpOutcome;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// One exported route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteExport {
    pub vehicle_id: String,
    pub vehicle_name: String,
    pub cities: Vec<String>,
    pub distance: f64,
    pub weight: f64,
    pub cost: f64,
    pub feasible: bool,
    /// Deliveries with priority 0, 1 and 2-or-lower
    pub priority_counts: [usize; 3],
}

impl RouteExport {
    pub fn new(route: &Route, problem: &Problem) -> Self {
        let vehicle = &problem.vehicles()[route.vehicle];
        RouteExport {
            vehicle_id: vehicle.id.clone(),
            vehicle_name: vehicle.name.clone(),
            cities: route
                .cities
                .iter()
                .map(|&c| problem.node(c).name.clone())
                .collect(),
            distance: route.distance,
            weight: route.weight,
            cost: route.cost,
            feasible: route.is_feasible,
            priority_counts: route.priority_counts(problem),
        }
    }
}

/// Exported multi-vehicle result.
#[derive(Debug, Clone, Serialize)]
pub struct VrpExport {
    pub problem: String,
    pub depot: Option<String>,
    pub total_cost: f64,
    pub total_distance: f64,
    pub total_weight: f64,
    pub feasible: bool,
    pub routes: Vec<RouteExport>,
    pub cost_history: Vec<f64>,
    pub distance_history: Vec<f64>,
}

impl VrpExport {
    pub fn new(outcome: &VrpOutcome, problem: &Problem) -> Self {
        let solution = &outcome.solution;
        VrpExport {
            problem: problem.name.clone(),
            depot: problem.depot().map(|d| problem.node(d).name.clone()),
            total_cost: solution.total_cost(),
            total_distance: solution.total_distance(),
            total_weight: solution.total_weight(),
            feasible: solution.is_feasible(),
            routes: solution
                .active_routes()
                .map(|r| RouteExport::new(r, problem))
                .collect(),
            cost_history: outcome.cost_history.clone(),
            distance_history: outcome.distance_history.clone(),
        }
    }
}

/// Exported single-vehicle result.
#[derive(Debug, Clone, Serialize)]
pub struct TspExport {
    pub problem: String,
    pub generations: usize,
    pub route: Vec<String>,
    pub fitness: f64,
    pub distance: f64,
    pub weight: f64,
    /// Cheapest vehicle able to run the tour, if any
    pub vehicle_id: Option<String>,
    pub fitness_history: Vec<f64>,
    pub distance_history: Vec<f64>,
}

impl TspExport {
    /// Export the incumbent; `None` before the first generation.
    pub fn new(engine: &TspEngine) -> Option<Self> {
        let best = engine.best.as_ref()?;
        let evaluation = best.evaluation?;

        Some(TspExport {
            problem: engine.problem.name.clone(),
            generations: engine.generation,
            route: engine
                .best_route_names()
                .into_iter()
                .map(String::from)
                .collect(),
            fitness: evaluation.fitness,
            distance: evaluation.distance,
            weight: evaluation.weight,
            vehicle_id: engine.best_vehicle().map(|v| v.id.clone()),
            fitness_history: engine.fitness_history.clone(),
            distance_history: engine.distance_history.clone(),
        })
    }
}

/// Write any export as pretty-printed JSON.
pub fn save_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Save a multi-vehicle solution as a plain text summary.
pub fn save_solution<P: AsRef<Path>>(
    solution: &Solution,
    problem: &Problem,
    path: P,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "VRP Solution for instance: {}", problem.name)?;
    writeln!(file, "Total Cost: {:.2}", solution.total_cost())?;
    writeln!(file, "Total Distance: {:.2}", solution.total_distance())?;
    writeln!(file, "Is Feasible: {}", solution.is_feasible())?;
    writeln!(file, "Number of Routes: {}", solution.get_route_count())?;
    writeln!(file)?;

    let depot = problem.depot().map(|d| problem.node(d).name.as_str());

    for (i, route) in solution.active_routes().enumerate() {
        let vehicle = &problem.vehicles()[route.vehicle];
        write!(file, "Route #{} ({}): ", i + 1, vehicle.name)?;

        let mut stops: Vec<&str> = route
            .cities
            .iter()
            .map(|&c| problem.node(c).name.as_str())
            .collect();
        if let Some(depot) = depot {
            stops.insert(0, depot);
            stops.push(depot);
        }
        writeln!(file, "{}", stops.join(" -> "))?;

        writeln!(file, "  Distance: {:.2} / {:.2}", route.distance, vehicle.max_distance)?;
        writeln!(file, "  Weight: {:.2} / {:.2}", route.weight, vehicle.max_weight)?;
        writeln!(file, "  Cost: {:.2}", route.cost)?;
        writeln!(file)?;
    }

    Ok(())
}

/// Statistics about a multi-vehicle search.
pub struct SearchStatistics {
    pub generations: usize,
    pub runtime: Duration,
    pub best_solution_cost: f64,
    pub best_solution_distance: f64,
    pub best_solution_is_feasible: bool,
    pub best_solution_routes: usize,
    pub restarts: usize,
    pub feasible_generation: Option<usize>,
}

impl SearchStatistics {
    pub fn from_outcome(outcome: &VrpOutcome) -> Self {
        SearchStatistics {
            generations: outcome.generations,
            runtime: outcome.runtime,
            best_solution_cost: outcome.solution.total_cost(),
            best_solution_distance: outcome.solution.total_distance(),
            best_solution_is_feasible: outcome.solution.is_feasible(),
            best_solution_routes: outcome.solution.get_route_count(),
            restarts: outcome.restarts,
            feasible_generation: outcome.feasible_generation,
        }
    }

    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "Search Statistics:
- Generations: {}
- Runtime: {}
- Best Solution Cost: {:.2}
- Best Solution Distance: {:.2}
- Best Solution Feasible: {}
- Best Solution Routes: {}
- Restarts: {}
- First Feasible Generation: {}",
            self.generations,
            format_duration(self.runtime),
            self.best_solution_cost,
            self.best_solution_distance,
            self.best_solution_is_feasible,
            self.best_solution_routes,
            self.restarts,
            self.feasible_generation
                .map_or_else(|| "none".to_string(), |g| g.to_string())
        )
    }
}
