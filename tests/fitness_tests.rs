//! Tests for route measures and the single-vehicle fitness.

use delivery_ga::config::{Config, PriorityTable};
use delivery_ga::fitness::{
    evaluate_tour, priority_penalty, route_distance, route_weight, select_vehicle, tour_distance,
};
use delivery_ga::problem::{City, Delivery, DistanceTable, Problem, Vehicle};

/// Triangle A-B-C with sides 10, 15 and 20.
fn create_test_problem(deliveries: Vec<Delivery>, vehicles: Vec<Vehicle>) -> Problem {
    Problem::new(
        "Triangle",
        vec![City::new("A", 0, 0), City::new("B", 10, 0), City::new("C", 10, 10)],
        deliveries,
        vehicles,
        &DistanceTable::new()
            .with("A", "B", 10.0)
            .with("B", "C", 15.0)
            .with("C", "A", 20.0),
        None,
    )
    .unwrap()
}

fn roomy_vehicle() -> Vehicle {
    Vehicle::new("roomy", 1000.0, 1000.0, 1.0)
}

#[test]
fn test_tour_distance_is_closed() {
    let problem = create_test_problem(Vec::new(), vec![roomy_vehicle()]);

    assert_eq!(tour_distance(&problem, &[0, 1, 2]).unwrap(), 45.0);
    assert_eq!(tour_distance(&problem, &[2, 1, 0]).unwrap(), 45.0);
    // Two cities: out and back.
    assert_eq!(tour_distance(&problem, &[0, 1]).unwrap(), 20.0);
    assert_eq!(tour_distance(&problem, &[1]).unwrap(), 0.0);
    assert_eq!(tour_distance(&problem, &[]).unwrap(), 0.0);
}

#[test]
fn test_route_distance_with_and_without_depot() {
    let problem = create_test_problem(Vec::new(), vec![roomy_vehicle()]);

    // Depot A, route B -> C: A-B + B-C + C-A.
    assert_eq!(route_distance(&problem, &[1, 2], Some(0)).unwrap(), 45.0);
    // Depot A, route B: A-B + B-A.
    assert_eq!(route_distance(&problem, &[1], Some(0)).unwrap(), 20.0);
    assert_eq!(route_distance(&problem, &[1, 2], None).unwrap(), 30.0);
    assert_eq!(route_distance(&problem, &[], Some(0)).unwrap(), 0.0);
}

#[test]
fn test_priority_penalty_grows_with_lateness() {
    let problem = create_test_problem(
        vec![Delivery::new(1, "A", 0, 1.0), Delivery::new(2, "C", 2, 1.0)],
        vec![roomy_vehicle()],
    );
    let table = PriorityTable::tsp();

    // A first (lateness 0), C last (lateness 2/3): 2/3 * 50.
    let early = priority_penalty(&problem, &[0, 1, 2], &table);
    assert!((early - 100.0 / 3.0).abs() < 1e-9);

    // A last: 2/3 * 1000, C first: 0.
    let late = priority_penalty(&problem, &[2, 1, 0], &table);
    assert!((late - 2000.0 / 3.0).abs() < 1e-9);
    assert!(late > early);
}

#[test]
fn test_priority_table_clamps_to_last_entry() {
    let table = PriorityTable::tsp();

    assert_eq!(table.weight(0), 1000.0);
    assert_eq!(table.weight(2), 50.0);
    assert_eq!(table.weight(7), 50.0);
    assert_eq!(table.max_weight(), 1000.0);
}

#[test]
fn test_feasible_tour_fitness_is_distance() {
    let problem = create_test_problem(Vec::new(), vec![roomy_vehicle()]);
    let evaluation = evaluate_tour(&problem, &Config::default(), &[0, 1, 2]).unwrap();

    assert_eq!(evaluation.fitness, 45.0);
    assert_eq!(evaluation.distance, 45.0);
    assert!(evaluation.is_feasible());
}

#[test]
fn test_infeasible_tour_pays_fixed_penalty() {
    let problem = create_test_problem(
        vec![Delivery::new(1, "B", 0, 30.0)],
        vec![Vehicle::new("tiny", 10.0, 1000.0, 1.0)],
    );
    let config = Config::default().with_priority_weight(0.0);
    let evaluation = evaluate_tour(&problem, &config, &[0, 1, 2]).unwrap();

    assert!(!evaluation.is_feasible());
    assert_eq!(evaluation.feasibility_penalty, config.infeasible_penalty);
    assert_eq!(evaluation.fitness, 45.0 + config.infeasible_penalty);
}

#[test]
fn test_graduated_penalty_charges_excess() {
    let problem = create_test_problem(
        vec![Delivery::new(1, "B", 0, 30.0)],
        vec![Vehicle::new("tiny", 10.0, 40.0, 1.0), Vehicle::new("short", 20.0, 30.0, 1.0)],
    );
    let config = Config::default()
        .with_priority_weight(0.0)
        .with_graduated_penalty(2.0);
    let evaluation = evaluate_tour(&problem, &config, &[0, 1, 2]).unwrap();

    // Excess over the most permissive limits: weight 30 - 20, distance 45 - 40.
    let expected = config.infeasible_penalty + 2.0 * (10.0 + 5.0);
    assert_eq!(evaluation.feasibility_penalty, expected);
}

#[test]
fn test_missing_distance_propagates() {
    let problem = Problem::new(
        "Gap",
        vec![City::new("A", 0, 0), City::new("B", 1, 0)],
        Vec::new(),
        vec![roomy_vehicle()],
        &DistanceTable::new(),
        None,
    )
    .unwrap();

    assert!(evaluate_tour(&problem, &Config::default(), &[0, 1]).is_err());
}

#[test]
fn test_select_vehicle_prefers_cheapest_feasible() {
    let vehicles = vec![
        Vehicle::new("cheap_small", 10.0, 100.0, 0.5),
        Vehicle::new("mid", 50.0, 100.0, 1.0),
        Vehicle::new("expensive", 100.0, 100.0, 3.0),
    ];

    assert_eq!(select_vehicle(&vehicles, 5.0, 50.0).unwrap().id, "cheap_small");
    assert_eq!(select_vehicle(&vehicles, 40.0, 50.0).unwrap().id, "mid");
    assert_eq!(select_vehicle(&vehicles, 80.0, 50.0).unwrap().id, "expensive");
    assert!(select_vehicle(&vehicles, 80.0, 150.0).is_none());
}

#[test]
fn test_route_weight() {
    let problem = create_test_problem(
        vec![
            Delivery::new(1, "A", 0, 1.5),
            Delivery::new(2, "A", 1, 2.5),
            Delivery::new(3, "C", 1, 6.0),
        ],
        vec![roomy_vehicle()],
    );

    assert_eq!(route_weight(&problem, &[0, 1]), 4.0);
    assert_eq!(route_weight(&problem, &[0, 1, 2]), 10.0);
}
