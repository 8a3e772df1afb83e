//! Tests for the multi-vehicle search: seeding, operators, repair and the engine.

use delivery_ga::config::{Config, VrpConfig};
use delivery_ga::error::RoutingError;
use delivery_ga::fitness::evaluate_tour;
use delivery_ga::problem::{City, Delivery, DistanceTable, Problem, Vehicle};
use delivery_ga::solution::{Route, Solution};
use delivery_ga::vrp::crossover::adaptive_crossover;
use delivery_ga::vrp::evaluator::{VrpEvaluator, DUPLICATE_VEHICLE_FITNESS};
use delivery_ga::vrp::mutation::{
    feasibility_mutation, move_heaviest_city, reverse_segments, split_overloaded,
    swap_between_routes, swap_within_routes,
};
use delivery_ga::vrp::repair::{finalize, force_feasibility, reorder_by_priority};
use delivery_ga::vrp::seed;
use delivery_ga::vrp::VrpEngine;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// `count` cities on a line, ten apart, each with one delivery of `weight`,
/// and `vehicles` identical vehicles of capacity 100.
fn create_test_problem(count: i64, weight: f64, vehicles: usize) -> Problem {
    let cities: Vec<City> = (0..count).map(|i| City::new(format!("C{}", i), i * 10, 0)).collect();
    let deliveries: Vec<Delivery> = (0..count)
        .map(|i| Delivery::new(i as u32, format!("C{}", i), 0, weight))
        .collect();
    let vehicles: Vec<Vehicle> = (0..vehicles)
        .map(|i| Vehicle::new(format!("V{}", i), 100.0, 10_000.0, 1.0))
        .collect();
    let oracle = |a: &str, b: &str| -> Option<f64> {
        let a: f64 = a.strip_prefix('C')?.parse().ok()?;
        let b: f64 = b.strip_prefix('C')?.parse().ok()?;
        Some((a - b).abs() * 10.0)
    };

    Problem::new("Line", cities, deliveries, vehicles, &oracle, None).unwrap()
}

/// One city per entry of `weights`, same layout as `create_test_problem`,
/// served by three vehicles of capacity 100.
fn create_weighted_problem(weights: &[f64]) -> Problem {
    let cities: Vec<City> = (0..weights.len() as i64)
        .map(|i| City::new(format!("C{}", i), i * 10, 0))
        .collect();
    let deliveries: Vec<Delivery> = weights
        .iter()
        .enumerate()
        .map(|(i, &weight)| Delivery::new(i as u32, format!("C{}", i), 0, weight))
        .collect();
    let vehicles: Vec<Vehicle> = (0..3)
        .map(|i| Vehicle::new(format!("V{}", i), 100.0, 10_000.0, 1.0))
        .collect();
    let oracle = |a: &str, b: &str| -> Option<f64> {
        let a: f64 = a.strip_prefix('C')?.parse().ok()?;
        let b: f64 = b.strip_prefix('C')?.parse().ok()?;
        Some((a - b).abs() * 10.0)
    };

    Problem::new("Weighted", cities, deliveries, vehicles, &oracle, None).unwrap()
}

fn assert_covers_each_city_once(solution: &Solution, city_count: usize) {
    let mut visits: Vec<usize> = solution.routes.iter().flat_map(|r| r.cities.clone()).collect();
    visits.sort_unstable();
    assert_eq!(visits, (0..city_count).collect::<Vec<_>>());
}

#[test]
fn test_two_cities_split_over_two_vehicles() {
    let problem = create_test_problem(2, 60.0, 2);

    // A single tour needs more capacity than any one vehicle has.
    let tour = evaluate_tour(&problem, &Config::default(), &[0, 1]).unwrap();
    assert!(!tour.is_feasible());
    assert!(tour.feasibility_penalty > 0.0);

    let config = VrpConfig::default().with_population_size(30).with_seed(1);
    let mut engine = VrpEngine::new(problem, config.clone());
    let outcome = engine.solve().unwrap();

    let solution = &outcome.solution;
    assert!(solution.is_feasible());
    assert_eq!(solution.get_route_count(), 2);
    assert_covers_each_city_once(solution, 2);
    assert!(outcome.feasible_generation.is_some());

    let evaluator = VrpEvaluator::new(&engine.problem, &config);
    for vehicle in 0..2 {
        let mut one_route = Solution::new(vec![Route::new(vehicle, vec![0, 1])]);
        one_route.calculate_stats(&engine.problem, &config).unwrap();
        assert!(solution.fitness < evaluator.evaluate(&one_route, 1.0));
    }
}

#[test]
fn test_feasible_search_converges_early() {
    let problem = create_test_problem(2, 60.0, 2);
    let config = VrpConfig::default()
        .with_population_size(20)
        .with_generations(200)
        .with_seed(2);
    let outcome = VrpEngine::new(problem, config).solve().unwrap();

    assert!(outcome.converged);
    assert!(outcome.generations < 200);
    assert_eq!(outcome.restarts, 0);
    assert_eq!(outcome.cost_history.len(), outcome.generations);
    assert_eq!(outcome.distance_history.len(), outcome.generations);
}

#[test]
fn test_stagnation_triggers_restarts_and_terminates() {
    // One city heavier than any vehicle: nothing is ever feasible.
    let problem = create_test_problem(1, 150.0, 2);
    let config = VrpConfig::default()
        .with_population_size(10)
        .with_generations(100)
        .with_seed(3);
    let outcome = VrpEngine::new(problem, config).solve().unwrap();

    assert!(outcome.restarts >= 1);
    assert_eq!(outcome.generations, 100);
    assert!(!outcome.converged);
    assert!(outcome.feasible_generation.is_none());
    assert!(!outcome.solution.is_feasible());
    assert_covers_each_city_once(&outcome.solution, 1);
}

#[test]
fn test_restart_spreads_an_overloaded_layout_over_more_vehicles() {
    // 240 units need three of the four vehicles. Without mutation, a
    // population of three starts from layouts on the two largest vehicles
    // and crossover never brings in a third, so only a restart can help.
    let problem = create_test_problem(6, 40.0, 4);
    let config = VrpConfig::default()
        .with_population_size(3)
        .with_generations(200)
        .with_base_mutation_rate(0.0)
        .with_stagnation_limits(5, 40)
        .with_seed(21);

    let mut single = seed::single_vehicle(&problem);
    single.calculate_stats(&problem, &config).unwrap();
    assert!(!single.is_feasible());

    let outcome = VrpEngine::new(problem, config).solve().unwrap();

    assert!(outcome.restarts >= 1);
    let feasible_generation = outcome.feasible_generation.unwrap();
    assert!(feasible_generation > 5);
    let solution = &outcome.solution;
    assert!(solution.is_feasible());
    assert!(solution.has_unique_vehicles());
    assert!(solution.get_route_count() > 1);
    assert_covers_each_city_once(solution, 6);
}

#[test]
fn test_zero_generation_budget_is_rejected() {
    let problem = create_test_problem(4, 30.0, 2);
    let config = VrpConfig::default().with_generations(0);
    let result = VrpEngine::new(problem, config).solve();

    assert!(matches!(
        result,
        Err(RoutingError::InvalidParameter { name: "generations", .. })
    ));
}

#[test]
fn test_crowded_instance_ends_feasible() {
    let problem = create_test_problem(4, 60.0, 4);
    let config = VrpConfig::default()
        .with_population_size(20)
        .with_generations(200)
        .with_seed(4);
    let outcome = VrpEngine::new(problem, config).solve().unwrap();

    let solution = &outcome.solution;
    assert!(solution.is_feasible());
    assert!(solution.has_unique_vehicles());
    assert_eq!(solution.get_route_count(), 4);
    assert_covers_each_city_once(solution, 4);
}

#[test]
fn test_final_solution_covers_every_city_once() {
    let problem = create_test_problem(9, 15.0, 3);
    let config = VrpConfig::default()
        .with_population_size(30)
        .with_generations(60)
        .with_seed(5);
    let outcome = VrpEngine::new(problem, config).solve().unwrap();

    assert!(outcome.solution.has_unique_vehicles());
    assert!(outcome.solution.routes.iter().all(|r| !r.is_empty()));
    assert_covers_each_city_once(&outcome.solution, 9);
}

#[test]
fn test_same_seed_gives_same_outcome() {
    let problem = create_test_problem(6, 30.0, 3);
    let config = VrpConfig::default()
        .with_population_size(20)
        .with_generations(30)
        .with_seed(6);

    let first = VrpEngine::new(problem.clone(), config.clone()).solve().unwrap();
    let second = VrpEngine::new(problem, config).solve().unwrap();

    assert_eq!(first.cost_history, second.cost_history);
    assert_eq!(first.solution.routes, second.solution.routes);
}

#[test]
fn test_no_vehicles_is_an_error() {
    let problem = create_test_problem(3, 10.0, 0);
    let result = VrpEngine::new(problem, VrpConfig::default()).solve();

    assert!(matches!(result, Err(RoutingError::NoVehicles)));
}

#[test]
fn test_invalid_config_is_rejected() {
    let problem = create_test_problem(3, 10.0, 2);
    let config = VrpConfig::default().with_population_size(2);

    assert!(VrpEngine::new(problem, config).solve().is_err());
}

#[test]
fn test_zero_cities_returns_empty_solution() {
    let problem = create_test_problem(0, 10.0, 2);
    let outcome = VrpEngine::new(problem, VrpConfig::default()).solve().unwrap();

    assert!(outcome.solution.routes.is_empty());
    assert_eq!(outcome.generations, 0);
    assert!(outcome.cost_history.is_empty());
}

#[test]
fn test_initial_population_shape() {
    let problem = create_test_problem(6, 10.0, 4);
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let population = seed::initial_population(&problem, 9, &mut rng);

    assert_eq!(population.len(), 9);
    for solution in &population[..3] {
        assert_eq!(solution.get_route_count(), 1);
    }
    for solution in &population[3..6] {
        assert_eq!(solution.get_route_count(), 2);
    }
    for solution in &population {
        assert_covers_each_city_once(solution, 6);
        assert!(solution.has_unique_vehicles());
    }
}

#[test]
fn test_by_priority_groups_routes() {
    let problem = Problem::new(
        "Priorities",
        vec![City::new("A", 0, 0), City::new("B", 1, 0), City::new("C", 2, 0), City::new("D", 3, 0)],
        vec![
            Delivery::new(1, "A", 1, 1.0),
            Delivery::new(2, "B", 0, 1.0),
            Delivery::new(3, "C", 1, 1.0),
        ],
        vec![Vehicle::new("big", 50.0, 100.0, 1.0), Vehicle::new("bigger", 80.0, 100.0, 1.0)],
        &DistanceTable::new(),
        None,
    )
    .unwrap();

    let solution = seed::by_priority(&problem);

    // Priority 0 on the largest vehicle, priority 1 on the next; D has no
    // delivery and joins the last route once vehicles run out.
    assert_eq!(solution.routes.len(), 2);
    assert_eq!(solution.routes[0].vehicle, 1);
    assert_eq!(solution.routes[0].cities, vec![1]);
    assert_eq!(solution.routes[1].vehicle, 0);
    assert_eq!(solution.routes[1].cities, vec![0, 2, 3]);
}

#[test]
fn test_restart_vehicle_count_escalates() {
    let problem = create_test_problem(4, 60.0, 4);

    // 240 units need three vehicles of 100.
    assert_eq!(seed::restart_vehicle_count(&problem, 0), 3);
    assert_eq!(seed::restart_vehicle_count(&problem, 1), 4);
    assert_eq!(seed::restart_vehicle_count(&problem, 5), 4);
}

#[test]
fn test_restart_population_spreads_cities() {
    let problem = create_test_problem(4, 60.0, 4);
    let config = VrpConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let population = seed::restart_population(&problem, 5, 4, &mut rng);

    assert_eq!(population.len(), 5);
    for mut solution in population {
        solution.calculate_stats(&problem, &config).unwrap();
        assert_eq!(solution.get_route_count(), 4);
        assert!(solution.is_feasible());
        assert_covers_each_city_once(&solution, 4);
    }
}

#[test]
fn test_adaptive_crossover_keeps_cities_and_vehicles_unique() {
    let problem = create_test_problem(8, 10.0, 4);
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    for _ in 0..50 {
        let a = seed::random_partition(&problem, &mut rng);
        let b = seed::random_partition(&problem, &mut rng);
        let child = adaptive_crossover(&a, &b, problem.city_count(), &mut rng);

        assert!(child.has_unique_vehicles());
        assert!(child.routes.iter().all(|r| !r.is_empty()));
        assert_covers_each_city_once(&child, 8);
    }
}

#[test]
fn test_feasibility_mutation_keeps_cities() {
    let problem = create_test_problem(8, 30.0, 4);
    let config = VrpConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(10);

    let mut solution = seed::single_vehicle(&problem);
    for _ in 0..100 {
        solution = feasibility_mutation(solution, &problem, &config, &mut rng).unwrap();
        assert_covers_each_city_once(&solution, 8);
        assert!(solution.routes.len() <= config.max_routes);
    }
}

#[test]
fn test_split_overloaded_reuses_the_vehicle() {
    let problem = create_test_problem(4, 60.0, 2);
    let config = VrpConfig::default();
    let mut solution = Solution::new(vec![Route::new(0, vec![0, 1, 2, 3])]);
    solution.calculate_stats(&problem, &config).unwrap();

    split_overloaded(&mut solution, &problem, &config).unwrap();

    assert_eq!(solution.routes.len(), 2);
    assert_eq!(solution.routes[0].cities, vec![0, 1]);
    assert_eq!(solution.routes[1].cities, vec![2, 3]);
    assert_eq!(solution.routes[1].vehicle, 0);
    assert_eq!(solution.routes[1].weight, 120.0);

    let evaluator = VrpEvaluator::new(&problem, &config);
    assert_eq!(evaluator.evaluate(&solution, 0.0), DUPLICATE_VEHICLE_FITNESS);
}

#[test]
fn test_split_overloaded_skips_short_routes() {
    let problem = create_test_problem(2, 60.0, 2);
    let config = VrpConfig::default();
    let mut solution = Solution::new(vec![Route::new(0, vec![0, 1])]);
    solution.calculate_stats(&problem, &config).unwrap();

    split_overloaded(&mut solution, &problem, &config).unwrap();

    assert_eq!(solution.routes.len(), 1);
}

#[test]
fn test_route_level_mutations() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let mut solution = Solution::new(vec![
        Route::new(0, vec![0, 1, 2, 3, 4, 5]),
        Route::new(1, vec![6, 7]),
    ]);
    reverse_segments(&mut solution, &mut rng);
    assert_eq!(solution.routes[0].cities[0], 0);
    assert_eq!(solution.routes[0].cities[5], 5);
    assert_eq!(solution.routes[1].cities, vec![6, 7]);

    swap_between_routes(&mut solution, &mut rng);
    assert_eq!(solution.routes[0].len(), 6);
    assert_eq!(solution.routes[1].len(), 2);
    assert_covers_each_city_once(&solution, 8);
}

#[test]
fn test_move_heaviest_city_relieves_the_most_overweight_route() {
    let problem = create_weighted_problem(&[50.0, 70.0, 10.0, 20.0]);
    let config = VrpConfig::default();
    let mut solution = Solution::new(vec![
        Route::new(0, vec![0, 1]),
        Route::new(1, vec![2]),
        Route::new(2, vec![3]),
    ]);
    solution.calculate_stats(&problem, &config).unwrap();
    assert_eq!(solution.routes[0].weight_violation, 20.0);

    move_heaviest_city(&mut solution, &problem);

    assert_eq!(solution.routes[0].cities, vec![0]);
    assert_eq!(solution.routes[1].cities, vec![2, 1]);
    assert_eq!(solution.routes[2].cities, vec![3]);
}

#[test]
fn test_move_heaviest_city_leaves_feasible_routes_alone() {
    let problem = create_weighted_problem(&[50.0, 70.0, 10.0, 20.0]);
    let config = VrpConfig::default();
    let mut solution = Solution::new(vec![
        Route::new(0, vec![0]),
        Route::new(1, vec![1]),
        Route::new(2, vec![2, 3]),
    ]);
    solution.calculate_stats(&problem, &config).unwrap();
    let before = solution.clone();

    move_heaviest_city(&mut solution, &problem);

    for (after, before) in solution.routes.iter().zip(&before.routes) {
        assert_eq!(after.cities, before.cities);
    }
}

#[test]
fn test_swap_within_routes() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let mut solution = Solution::new(vec![
        Route::new(0, vec![0, 1, 2]),
        Route::new(1, vec![3, 4]),
        Route::new(2, vec![5]),
    ]);

    swap_within_routes(&mut solution, &mut rng);

    let moved = (0..3).filter(|&i| solution.routes[0].cities[i] != i).count();
    assert_eq!(moved, 2);
    assert_eq!(solution.routes[1].cities, vec![4, 3]);
    assert_eq!(solution.routes[2].cities, vec![5]);
    assert_covers_each_city_once(&solution, 6);
}

#[test]
fn test_force_feasibility_first_fit() {
    let problem = create_test_problem(4, 60.0, 4);
    let config = VrpConfig::default();
    let solution = Solution::new(vec![Route::new(0, vec![0, 1, 2, 3])]);

    let repaired = force_feasibility(&solution, &problem, &config).unwrap();

    assert!(repaired.is_feasible());
    assert_eq!(repaired.get_route_count(), 4);
    assert_covers_each_city_once(&repaired, 4);
}

#[test]
fn test_force_feasibility_never_drops_cities() {
    let problem = create_test_problem(3, 60.0, 2);
    let config = VrpConfig::default();
    let solution = Solution::new(vec![Route::new(0, vec![0])]);

    let repaired = force_feasibility(&solution, &problem, &config).unwrap();

    assert!(!repaired.is_feasible());
    assert!(repaired.has_unique_vehicles());
    assert_covers_each_city_once(&repaired, 3);
}

#[test]
fn test_reorder_by_priority() {
    let problem = Problem::new(
        "Priorities",
        vec![City::new("A", 0, 0), City::new("B", 1, 0), City::new("C", 2, 0), City::new("D", 3, 0)],
        vec![
            Delivery::new(1, "A", 2, 1.0),
            Delivery::new(2, "C", 0, 1.0),
            Delivery::new(3, "D", 1, 1.0),
            Delivery::new(4, "D", 2, 1.0),
        ],
        vec![Vehicle::new("van", 50.0, 100.0, 1.0)],
        &DistanceTable::new(),
        None,
    )
    .unwrap();

    let mut route = Route::new(0, vec![0, 1, 2, 3]);
    reorder_by_priority(&mut route, &problem);

    assert_eq!(route.cities, vec![2, 3, 0, 1]);
}

#[test]
fn test_finalize_orders_and_refreshes() {
    let problem = create_test_problem(3, 10.0, 2);
    let config = VrpConfig::default();
    let mut solution = Solution::new(vec![Route::new(0, vec![2, 0, 1]), Route::new(1, Vec::new())]);
    solution.calculate_stats(&problem, &config).unwrap();

    let finished = finalize(&solution, &problem, &config).unwrap();

    assert_eq!(finished.routes.len(), 1);
    // Equal priorities keep their order.
    assert_eq!(finished.routes[0].cities, vec![2, 0, 1]);
    assert_eq!(finished.routes[0].distance, 40.0);
    assert!(finished.is_feasible());
}

#[test]
fn test_finalize_repairs_missing_cities() {
    let problem = create_test_problem(3, 10.0, 2);
    let config = VrpConfig::default();
    let mut solution = Solution::new(vec![Route::new(1, vec![2])]);
    solution.calculate_stats(&problem, &config).unwrap();

    let finished = finalize(&solution, &problem, &config).unwrap();

    let covered: HashSet<usize> = finished.covered_cities();
    assert_eq!(covered.len(), 3);
    assert!(finished.is_feasible());
}
