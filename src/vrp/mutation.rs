//! Feasibility-biased mutation of route partitions.

use crate::config::VrpConfig;
use crate::error::Result;
use crate::problem::Problem;
use crate::solution::{Route, Solution};
use rand::seq::index;
use rand::Rng;
use std::cmp::Ordering;

fn by_value(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Mutate a candidate. Each operator fires with its own probability scaled by
/// the base mutation rate, which is boosted while any route violates a
/// constraint. Route statistics are refreshed on entry and after a split.
pub fn feasibility_mutation<R: Rng + ?Sized>(
    mut solution: Solution,
    problem: &Problem,
    config: &VrpConfig,
    rng: &mut R,
) -> Result<Solution> {
    solution.calculate_stats(problem, config)?;

    let mut rate = config.base_mutation_rate;
    if solution.has_violations() {
        rate = (rate * config.violation_mutation_boost).min(config.max_mutation_rate);
    }
    let rates = &config.mutation_rates;

    if rng.gen::<f64>() < rates.split_route * rate {
        split_overloaded(&mut solution, problem, config)?;
    }
    if rng.gen::<f64>() < rates.move_city * rate {
        move_heaviest_city(&mut solution, problem);
    }
    if rng.gen::<f64>() < rates.swap_between_routes * rate {
        swap_between_routes(&mut solution, rng);
    }
    if rng.gen::<f64>() < rates.swap_within_route * rate {
        swap_within_routes(&mut solution, rng);
    }
    if rng.gen::<f64>() < rates.reverse_segment * rate {
        reverse_segments(&mut solution, rng);
    }

    Ok(solution)
}

/// Bisect the worst-violating route, moving its back half to a new route on
/// the same vehicle. Skipped once the solution has `max_routes` routes.
pub fn split_overloaded(solution: &mut Solution, problem: &Problem, config: &VrpConfig) -> Result<()> {
    if solution.routes.len() >= config.max_routes {
        return Ok(());
    }

    let worst = solution
        .routes
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_feasible && !r.is_empty())
        .max_by(|(_, a), (_, b)| by_value(a.worst_violation(), b.worst_violation()))
        .map(|(i, _)| i);

    let index = match worst {
        Some(index) if solution.routes[index].len() >= 3 => index,
        _ => return Ok(()),
    };

    let route = &mut solution.routes[index];
    let back = route.cities.split_off(route.cities.len() / 2);
    let vehicle = route.vehicle;
    route.calculate_stats(problem, config)?;

    let mut new_route = Route::new(vehicle, back);
    new_route.calculate_stats(problem, config)?;
    solution.routes.push(new_route);

    Ok(())
}

/// Move the heaviest city of the most overweight route to the lightest route.
pub fn move_heaviest_city(solution: &mut Solution, problem: &Problem) {
    let active: Vec<usize> = (0..solution.routes.len())
        .filter(|&i| !solution.routes[i].is_empty())
        .collect();
    if active.len() < 2 {
        return;
    }

    let source = active
        .iter()
        .copied()
        .filter(|&i| solution.routes[i].weight_violation > 0.0)
        .max_by(|&a, &b| {
            by_value(
                solution.routes[a].weight_violation,
                solution.routes[b].weight_violation,
            )
        });
    let target = active
        .iter()
        .copied()
        .min_by(|&a, &b| by_value(solution.routes[a].weight, solution.routes[b].weight));

    let (source, target) = match (source, target) {
        (Some(s), Some(t)) if s != t => (s, t),
        _ => return,
    };

    let cities = &solution.routes[source].cities;
    let heaviest = (0..cities.len()).max_by(|&a, &b| {
        by_value(problem.city_weight(cities[a]), problem.city_weight(cities[b]))
    });

    if let Some(position) = heaviest {
        let city = solution.routes[source].cities.remove(position);
        solution.routes[target].cities.push(city);
    }
}

/// Exchange one random city between two random non-empty routes. Each city
/// is appended to the end of its new route.
pub fn swap_between_routes<R: Rng + ?Sized>(solution: &mut Solution, rng: &mut R) {
    let active: Vec<usize> = (0..solution.routes.len())
        .filter(|&i| !solution.routes[i].is_empty())
        .collect();
    if active.len() < 2 {
        return;
    }

    let picks = index::sample(rng, active.len(), 2);
    let (r1, r2) = (active[picks.index(0)], active[picks.index(1)]);

    let p1 = rng.gen_range(0..solution.routes[r1].len());
    let p2 = rng.gen_range(0..solution.routes[r2].len());
    let c1 = solution.routes[r1].cities.remove(p1);
    let c2 = solution.routes[r2].cities.remove(p2);
    solution.routes[r1].cities.push(c2);
    solution.routes[r2].cities.push(c1);
}

/// Swap two random stops inside every route with at least two stops.
pub fn swap_within_routes<R: Rng + ?Sized>(solution: &mut Solution, rng: &mut R) {
    for route in solution.routes.iter_mut().filter(|r| r.len() >= 2) {
        let picks = index::sample(rng, route.len(), 2);
        route.cities.swap(picks.index(0), picks.index(1));
    }
}

/// Reverse a random interior segment of every route with at least four
/// stops. The first and last stops stay in place.
pub fn reverse_segments<R: Rng + ?Sized>(solution: &mut Solution, rng: &mut R) {
    for route in solution.routes.iter_mut().filter(|r| r.len() >= 4) {
        let interior = route.len() - 2;
        let picks = index::sample(rng, interior, 2);
        let (i, j) = (picks.index(0) + 1, picks.index(1) + 1);
        let (i, j) = (i.min(j), i.max(j));
        route.cities[i..j].reverse();
    }
}
