//! Vehicle-assignment crossover for route partitions.

use crate::solution::{Route, Solution};
use rand::Rng;
use std::collections::{HashMap, HashSet};

fn assignments(parent: &Solution) -> HashMap<usize, usize> {
    parent
        .routes
        .iter()
        .flat_map(|r| r.cities.iter().map(move |&city| (city, r.vehicle)))
        .collect()
}

/// Build a child whose vehicles are the union of both parents' vehicles.
///
/// Each city goes to the vehicle that served it in a parent, picked by coin
/// flip when both parents route it. Cities of `0..city_count` that neither
/// parent routes are appended to the child route with the fewest stops.
/// Cities keep the visiting order of `parent_a`, followed by cities only
/// `parent_b` routes, in its order.
pub fn adaptive_crossover<R: Rng + ?Sized>(
    parent_a: &Solution,
    parent_b: &Solution,
    city_count: usize,
    rng: &mut R,
) -> Solution {
    let mut routes: Vec<Route> = Vec::new();
    let mut slot_of: HashMap<usize, usize> = HashMap::new();
    for route in parent_a.routes.iter().chain(&parent_b.routes) {
        slot_of.entry(route.vehicle).or_insert_with(|| {
            routes.push(Route::new(route.vehicle, Vec::new()));
            routes.len() - 1
        });
    }

    let owner_a = assignments(parent_a);
    let owner_b = assignments(parent_b);

    let mut seen = HashSet::new();
    let order: Vec<usize> = parent_a
        .routes
        .iter()
        .chain(&parent_b.routes)
        .flat_map(|r| r.cities.iter().copied())
        .filter(|&city| seen.insert(city))
        .collect();

    for city in order {
        let vehicle = match (owner_a.get(&city), owner_b.get(&city)) {
            (Some(&a), Some(&b)) => {
                if rng.gen_bool(0.5) {
                    a
                } else {
                    b
                }
            }
            (Some(&a), None) => a,
            (None, Some(&b)) => b,
            (None, None) => continue,
        };
        routes[slot_of[&vehicle]].cities.push(city);
    }

    routes.retain(|r| !r.is_empty());

    for city in 0..city_count {
        if seen.contains(&city) {
            continue;
        }
        if let Some(shortest) = routes.iter_mut().min_by_key(|r| r.cities.len()) {
            shortest.cities.push(city);
        }
    }

    Solution::new(routes)
}
