//! Configuration parameters for the TSP and VRP searches.

use crate::error::{Result, RoutingError};
use crate::genetic::{CrossoverKind, MutationKind, SelectionKind};
use serde::{Deserialize, Serialize};

/// Lateness weights indexed by delivery priority. Priorities past the end of
/// the table use its last entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityTable(pub Vec<f64>);

impl PriorityTable {
    /// Weights used by the single-vehicle search.
    pub fn tsp() -> Self {
        PriorityTable(vec![1000.0, 300.0, 50.0])
    }

    /// Weights used per route by the multi-vehicle search.
    pub fn vrp() -> Self {
        PriorityTable(vec![100.0, 30.0, 10.0])
    }

    pub fn weight(&self, priority: u8) -> f64 {
        match self.0.get(priority as usize) {
            Some(&w) => w,
            None => self.0.last().copied().unwrap_or(0.0),
        }
    }

    /// The largest weight in the table.
    pub fn max_weight(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }
}

/// Configuration settings for the single-vehicle (TSP) search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of individuals per generation
    pub population_size: usize,
    /// Probability handed to the mutation operator
    pub mutation_rate: f64,
    /// Multiplier of the priority penalty in the fitness
    pub priority_weight: f64,
    /// Lateness weight per priority
    pub priority_table: PriorityTable,
    /// Fixed penalty when no vehicle can cover a tour
    pub infeasible_penalty: f64,
    /// Optional per-unit penalty on weight/distance excess over the most permissive vehicle
    pub graduated_penalty: Option<f64>,
    pub selection: SelectionKind,
    pub crossover: CrossoverKind,
    pub mutation: MutationKind,
    /// Seed for the random number generator; entropy when unset
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            population_size: 100,
            mutation_rate: 0.4,
            priority_weight: 20.0,
            priority_table: PriorityTable::tsp(),
            infeasible_penalty: 20_000.0,
            graduated_penalty: None,
            selection: SelectionKind::Tournament(3),
            crossover: CrossoverKind::Order,
            mutation: MutationKind::Swap,
            seed: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Set the priority weight.
    pub fn with_priority_weight(mut self, weight: f64) -> Self {
        self.priority_weight = weight;
        self
    }

    /// Enable the graduated excess penalty.
    pub fn with_graduated_penalty(mut self, per_unit: f64) -> Self {
        self.graduated_penalty = Some(per_unit);
        self
    }

    pub fn with_selection(mut self, selection: SelectionKind) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_crossover(mut self, crossover: CrossoverKind) -> Self {
        self.crossover = crossover;
        self
    }

    pub fn with_mutation(mut self, mutation: MutationKind) -> Self {
        self.mutation = mutation;
        self
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(RoutingError::InvalidParameter {
                name: "population_size",
                reason: format!("must be at least 2, got {}", self.population_size),
            });
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(RoutingError::InvalidParameter {
                name: "mutation_rate",
                reason: format!("must lie in [0, 1], got {}", self.mutation_rate),
            });
        }
        if let SelectionKind::Tournament(0) = self.selection {
            return Err(RoutingError::InvalidParameter {
                name: "selection",
                reason: "tournament size must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Objective weights of the multi-vehicle fitness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Reported alongside the history; not part of the objective
    pub distance: f64,
    pub priority: f64,
    pub vehicle_count: f64,
    pub vehicle_use: f64,
    pub uncovered_city: f64,
    pub capacity_violation: f64,
    pub weight_violation: f64,
    pub distance_violation: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        PenaltyWeights {
            distance: 0.1,
            priority: 50.0,
            vehicle_count: 800.0,
            vehicle_use: 300.0,
            uncovered_city: 50_000.0,
            capacity_violation: 100_000.0,
            weight_violation: 200_000.0,
            distance_violation: 200_000.0,
        }
    }
}

/// Probabilities of the individual feasibility mutations, before scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationRates {
    pub swap_between_routes: f64,
    pub move_city: f64,
    pub swap_within_route: f64,
    pub reverse_segment: f64,
    pub split_route: f64,
}

impl Default for MutationRates {
    fn default() -> Self {
        MutationRates {
            swap_between_routes: 0.4,
            move_city: 0.4,
            swap_within_route: 0.5,
            reverse_segment: 0.3,
            split_route: 0.2,
        }
    }
}

/// Configuration settings for the multi-vehicle (VRP) search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VrpConfig {
    pub population_size: usize,
    /// Generation budget of one `solve` call
    pub generations: usize,
    pub base_mutation_rate: f64,
    /// Multiplier of the mutation rate while a candidate violates a constraint
    pub violation_mutation_boost: f64,
    pub max_mutation_rate: f64,
    /// Share of the population carried over unchanged (at least two)
    pub elite_fraction: f64,
    pub tournament_size: usize,
    /// Tournament candidates are drawn from this many best solutions
    pub tournament_pool: usize,
    /// Fitness multiplier applied to feasible candidates when ranking a tournament
    pub feasible_tournament_bias: f64,
    /// Generations without improvement before a restart, while nothing feasible is known
    pub restart_stagnation: usize,
    /// Generations without improvement before stopping, once a feasible solution is known
    pub converged_stagnation: usize,
    /// Upper bound of routes a split mutation may create
    pub max_routes: usize,
    /// Fixed cost of dispatching one vehicle
    pub dispatch_fee: f64,
    pub priority_table: PriorityTable,
    pub weights: PenaltyWeights,
    pub mutation_rates: MutationRates,
    pub seed: Option<u64>,
}

impl Default for VrpConfig {
    fn default() -> Self {
        VrpConfig {
            population_size: 100,
            generations: 100,
            base_mutation_rate: 0.4,
            violation_mutation_boost: 3.0,
            max_mutation_rate: 0.9,
            elite_fraction: 0.2,
            tournament_size: 5,
            tournament_pool: 50,
            feasible_tournament_bias: 0.3,
            restart_stagnation: 30,
            converged_stagnation: 40,
            max_routes: 10,
            dispatch_fee: 800.0,
            priority_table: PriorityTable::vrp(),
            weights: PenaltyWeights::default(),
            mutation_rates: MutationRates::default(),
            seed: None,
        }
    }
}

impl VrpConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        VrpConfig::default()
    }

    /// Set the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the generation budget.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Set the base mutation rate.
    pub fn with_base_mutation_rate(mut self, rate: f64) -> Self {
        self.base_mutation_rate = rate;
        self
    }

    /// Set the stagnation thresholds for restart and convergence.
    pub fn with_stagnation_limits(mut self, restart: usize, converged: usize) -> Self {
        self.restart_stagnation = restart;
        self.converged_stagnation = converged;
        self
    }

    pub fn with_mutation_rates(mut self, rates: MutationRates) -> Self {
        self.mutation_rates = rates;
        self
    }

    pub fn with_weights(mut self, weights: PenaltyWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of solutions carried over unchanged each generation.
    pub fn elite_size(&self) -> usize {
        ((self.population_size as f64 * self.elite_fraction) as usize)
            .max(2)
            .min(self.population_size)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 3 {
            return Err(RoutingError::InvalidParameter {
                name: "population_size",
                reason: format!("must be at least 3, got {}", self.population_size),
            });
        }
        if self.tournament_size < 2 {
            return Err(RoutingError::InvalidParameter {
                name: "tournament_size",
                reason: format!("must be at least 2, got {}", self.tournament_size),
            });
        }
        if self.tournament_pool == 0 {
            return Err(RoutingError::InvalidParameter {
                name: "tournament_pool",
                reason: "must be positive".to_string(),
            });
        }
        if self.generations == 0 {
            return Err(RoutingError::InvalidParameter {
                name: "generations",
                reason: "must be positive".to_string(),
            });
        }
        for (name, value) in [
            ("elite_fraction", self.elite_fraction),
            ("base_mutation_rate", self.base_mutation_rate),
            ("max_mutation_rate", self.max_mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RoutingError::InvalidParameter {
                    name,
                    reason: format!("must lie in [0, 1], got {}", value),
                });
            }
        }
        if !(self.feasible_tournament_bias > 0.0 && self.feasible_tournament_bias <= 1.0) {
            return Err(RoutingError::InvalidParameter {
                name: "feasible_tournament_bias",
                reason: format!("must lie in (0, 1], got {}", self.feasible_tournament_bias),
            });
        }
        Ok(())
    }
}
