//! Final repair of the incumbent and priority reordering.

use crate::config::VrpConfig;
use crate::error::Result;
use crate::problem::Problem;
use crate::solution::{Route, Solution};
use log::{info, warn};
use std::collections::HashSet;

/// Redistribute every city first-fit by weight.
///
/// Vehicles are filled largest first, each taking the pending cities that
/// still fit. Leftovers go to the route with the most spare capacity that
/// can take them, then to a fresh route on an unused vehicle, and as a last
/// resort to the route with the most spare capacity regardless of fit, so
/// that no city is ever dropped.
pub fn force_feasibility(solution: &Solution, problem: &Problem, config: &VrpConfig) -> Result<Solution> {
    let mut seen = HashSet::new();
    let mut pending: Vec<usize> = solution
        .routes
        .iter()
        .flat_map(|r| r.cities.iter().copied())
        .chain(0..problem.city_count())
        .filter(|&city| seen.insert(city))
        .collect();

    let vehicles = problem.vehicles();
    let by_capacity = problem.vehicles_by_capacity();
    let mut routes: Vec<Route> = Vec::new();

    for &vehicle in &by_capacity {
        if pending.is_empty() {
            break;
        }

        let mut load = 0.0;
        let mut cities = Vec::new();
        pending.retain(|&city| {
            let weight = problem.city_weight(city);
            if load + weight <= vehicles[vehicle].max_weight {
                load += weight;
                cities.push(city);
                false
            } else {
                true
            }
        });

        if !cities.is_empty() {
            routes.push(Route::new(vehicle, cities));
        }
    }

    let spare = |route: &Route| vehicles[route.vehicle].max_weight - route_load(problem, route);

    for city in pending {
        let weight = problem.city_weight(city);

        let fitting = routes
            .iter()
            .enumerate()
            .filter(|(_, r)| spare(r) >= weight)
            .max_by(|(_, a), (_, b)| spare(a).total_cmp(&spare(b)))
            .map(|(i, _)| i);

        if let Some(i) = fitting {
            routes[i].cities.push(city);
            continue;
        }

        let used: HashSet<usize> = routes.iter().map(|r| r.vehicle).collect();
        if let Some(&vehicle) = by_capacity.iter().find(|v| !used.contains(v)) {
            routes.push(Route::new(vehicle, vec![city]));
            continue;
        }

        warn!("City {} cannot be placed within any vehicle's capacity", problem.node(city).name);
        if let Some(route) = routes.iter_mut().max_by(|a, b| spare(a).total_cmp(&spare(b))) {
            route.cities.push(city);
        }
    }

    let mut repaired = Solution::new(routes);
    repaired.calculate_stats(problem, config)?;
    Ok(repaired)
}

fn route_load(problem: &Problem, route: &Route) -> f64 {
    route.cities.iter().map(|&c| problem.city_weight(c)).sum()
}

/// Stable-sort a route's cities by their most urgent delivery priority.
/// Cities without deliveries go last.
pub fn reorder_by_priority(route: &mut Route, problem: &Problem) {
    route
        .cities
        .sort_by_key(|&city| problem.city_priority(city).map_or(u16::MAX, u16::from));
}

/// Repair the incumbent if it is infeasible or misses cities, reorder every
/// route by priority and drop empty routes.
pub fn finalize(solution: &Solution, problem: &Problem, config: &VrpConfig) -> Result<Solution> {
    let mut finished = if !solution.is_feasible() || !solution.covers_all(problem) {
        info!("Applying feasibility repair to the best solution");
        force_feasibility(solution, problem, config)?
    } else {
        solution.clone()
    };

    finished.remove_empty_routes();
    for route in &mut finished.routes {
        reorder_by_priority(route, problem);
        route.calculate_stats(problem, config)?;
    }

    Ok(finished)
}
