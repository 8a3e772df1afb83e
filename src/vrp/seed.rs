//! Construction of initial and restart populations.

use crate::problem::Problem;
use crate::solution::{Route, Solution};
use rand::seq::{index, SliceRandom};
use rand::Rng;

/// Deal `cities` round-robin over `vehicles`.
pub fn round_robin(vehicles: &[usize], cities: &[usize]) -> Solution {
    let mut routes: Vec<Route> = vehicles.iter().map(|&v| Route::new(v, Vec::new())).collect();
    if routes.is_empty() {
        return Solution::default();
    }

    for (i, &city) in cities.iter().enumerate() {
        let slot = i % routes.len();
        routes[slot].cities.push(city);
    }

    Solution::new(routes)
}

/// Everything on the largest vehicle.
pub fn single_vehicle(problem: &Problem) -> Solution {
    let by_capacity = problem.vehicles_by_capacity();
    let cities: Vec<usize> = (0..problem.city_count()).collect();
    Solution::new(vec![Route::new(by_capacity[0], cities)])
}

/// First half of the cities on the largest vehicle, second half on the next.
pub fn two_vehicle_split(problem: &Problem) -> Solution {
    let by_capacity = problem.vehicles_by_capacity();
    if by_capacity.len() < 2 {
        return single_vehicle(problem);
    }

    let cities: Vec<usize> = (0..problem.city_count()).collect();
    let (front, back) = cities.split_at(cities.len() / 2);

    Solution::new(vec![
        Route::new(by_capacity[0], front.to_vec()),
        Route::new(by_capacity[1], back.to_vec()),
    ])
}

/// One to three random vehicles, cities shuffled and dealt round-robin.
pub fn random_partition<R: Rng + ?Sized>(problem: &Problem, rng: &mut R) -> Solution {
    let vehicle_count = problem.vehicles().len();
    let amount = rng.gen_range(1..=3).min(vehicle_count);
    let vehicles = index::sample(rng, vehicle_count, amount).into_vec();

    let mut cities: Vec<usize> = (0..problem.city_count()).collect();
    cities.shuffle(rng);

    round_robin(&vehicles, &cities)
}

/// One route per priority group (most urgent first), each on the next
/// largest free vehicle. Groups left without a vehicle join the last route.
pub fn by_priority(problem: &Problem) -> Solution {
    let mut groups: Vec<(u8, Vec<usize>)> = Vec::new();
    for city in 0..problem.city_count() {
        let priority = problem.city_priority(city).unwrap_or(u8::MAX);
        match groups.iter_mut().find(|(p, _)| *p == priority) {
            Some((_, cities)) => cities.push(city),
            None => groups.push((priority, vec![city])),
        }
    }
    groups.sort_by_key(|(p, _)| *p);

    let mut free = problem.vehicles_by_capacity().into_iter();
    let mut routes: Vec<Route> = Vec::new();

    for (_, cities) in groups {
        match free.next() {
            Some(vehicle) => routes.push(Route::new(vehicle, cities)),
            None => {
                if let Some(last) = routes.last_mut() {
                    last.cities.extend(cities);
                }
            }
        }
    }

    Solution::new(routes)
}

/// Number of vehicles a restart spreads the load over: enough that the
/// combined capacity can hold every delivery, at least two and at least one
/// per two cities, plus one more per previous restart.
pub fn restart_vehicle_count(problem: &Problem, previous_restarts: usize) -> usize {
    let by_capacity = problem.vehicles_by_capacity();
    let total_weight = problem.total_weight();

    let mut capacity = 0.0;
    let mut by_weight = by_capacity.len();
    for (i, &vehicle) in by_capacity.iter().enumerate() {
        capacity += problem.vehicles()[vehicle].max_weight;
        if capacity >= total_weight {
            by_weight = i + 1;
            break;
        }
    }

    let base = by_weight.max(2).max(problem.city_count() / 2);
    (base + previous_restarts).min(by_capacity.len())
}

/// The initial population: a third single-vehicle, a third two-vehicle
/// splits, the rest random partitions, one of which is replaced by the
/// priority-grouped construction.
pub fn initial_population<R: Rng + ?Sized>(
    problem: &Problem,
    size: usize,
    rng: &mut R,
) -> Vec<Solution> {
    let mut population: Vec<Solution> = (0..size)
        .map(|i| {
            if i < size / 3 {
                single_vehicle(problem)
            } else if i < 2 * size / 3 {
                two_vehicle_split(problem)
            } else {
                random_partition(problem, rng)
            }
        })
        .collect();

    if size >= 3 {
        population[size - 1] = by_priority(problem);
    }

    population
}

/// A restart population spreading cities evenly over `vehicle_count` of the
/// largest vehicles, each individual with its own city order.
pub fn restart_population<R: Rng + ?Sized>(
    problem: &Problem,
    size: usize,
    vehicle_count: usize,
    rng: &mut R,
) -> Vec<Solution> {
    let vehicles: Vec<usize> = problem
        .vehicles_by_capacity()
        .into_iter()
        .take(vehicle_count.max(1))
        .collect();
    let mut cities: Vec<usize> = (0..problem.city_count()).collect();

    (0..size)
        .map(|i| {
            if i > 0 {
                cities.shuffle(rng);
            }
            round_robin(&vehicles, &cities)
        })
        .collect()
}
