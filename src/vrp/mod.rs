//! Multi-vehicle search over route partitions.
//!
//! One call to [`VrpEngine::solve`] runs a generation-bounded search:
//! seed, then repeat evaluate / track incumbent / watch stagnation /
//! reproduce until the budget is spent or the search converges, and finally
//! repair and priority-reorder the incumbent.

pub mod crossover;
pub mod evaluator;
pub mod mutation;
pub mod repair;
pub mod seed;

use crate::config::VrpConfig;
use crate::error::{Result, RoutingError};
use crate::problem::Problem;
use crate::solution::Solution;
use log::{debug, info};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use self::crossover::adaptive_crossover;
use self::evaluator::VrpEvaluator;
use self::mutation::feasibility_mutation;
use self::repair::finalize;

/// Result of one `solve` call.
#[derive(Debug, Clone)]
pub struct VrpOutcome {
    /// Finalized non-empty routes with fresh statistics
    pub solution: Solution,
    /// Total cost of the incumbent, per generation
    pub cost_history: Vec<f64>,
    /// Total distance of the incumbent, per generation
    pub distance_history: Vec<f64>,
    /// Generations actually run
    pub generations: usize,
    /// Restarts forced by stagnation without a feasible solution
    pub restarts: usize,
    /// First generation whose incumbent was feasible
    pub feasible_generation: Option<usize>,
    /// Stopped early after stagnating on a feasible incumbent
    pub converged: bool,
    pub runtime: Duration,
}

impl VrpOutcome {
    fn empty() -> Self {
        VrpOutcome {
            solution: Solution::default(),
            cost_history: Vec::new(),
            distance_history: Vec::new(),
            generations: 0,
            restarts: 0,
            feasible_generation: None,
            converged: false,
            runtime: Duration::from_secs(0),
        }
    }
}

/// The main structure driving the multi-vehicle search.
pub struct VrpEngine {
    pub problem: Arc<Problem>,
    pub config: VrpConfig,
    rng: ChaCha8Rng,
}

impl VrpEngine {
    /// Create a new engine for the given problem and configuration.
    pub fn new(problem: impl Into<Arc<Problem>>, config: VrpConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        VrpEngine {
            problem: problem.into(),
            config,
            rng,
        }
    }

    /// Run one bounded search and return the finalized incumbent.
    ///
    /// Calling `solve` again starts a fresh search that continues the same
    /// random stream.
    pub fn solve(&mut self) -> Result<VrpOutcome> {
        let start_time = Instant::now();
        let problem = Arc::clone(&self.problem);
        let config = self.config.clone();

        if problem.vehicles().is_empty() {
            return Err(RoutingError::NoVehicles);
        }
        config.validate()?;
        if problem.city_count() == 0 {
            return Ok(VrpOutcome::empty());
        }

        info!(
            "Solving VRP with {} cities and {} vehicles{}",
            problem.city_count(),
            problem.vehicles().len(),
            problem
                .depot()
                .map(|d| format!(", depot {}", problem.node(d).name))
                .unwrap_or_default()
        );

        let config = &config;
        let evaluator = VrpEvaluator::new(&problem, config);
        let mut population = seed::initial_population(&problem, config.population_size, &mut self.rng);

        let mut outcome = VrpOutcome::empty();
        let mut best: Option<Solution> = None;
        let mut stagnation = 0;

        for generation in 0..config.generations {
            outcome.generations = generation + 1;
            let progress = generation as f64 / config.generations as f64;

            let mut scored = Vec::with_capacity(population.len());
            for mut solution in population {
                solution.calculate_stats(&problem, config)?;
                solution.fitness = evaluator.evaluate(&solution, progress);
                scored.push(solution);
            }
            scored.sort_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap_or(Ordering::Equal));

            let leader = &scored[0];
            let improved = best.as_ref().map_or(true, |b| leader.fitness < b.fitness);
            if improved {
                best = Some(leader.clone());
                stagnation = 0;

                let feasible = leader.is_feasible();
                if feasible && outcome.feasible_generation.is_none() {
                    outcome.feasible_generation = Some(generation);
                    info!("Feasible solution found at generation {}", generation);
                }
                if generation % 10 == 0 || generation < 20 {
                    debug!(
                        "Gen {:3} | fitness {:.0} | vehicles {} | feasible {}",
                        generation,
                        leader.fitness,
                        leader.get_route_count(),
                        feasible
                    );
                }
            } else {
                stagnation += 1;
            }

            if let Some(best) = &best {
                outcome.cost_history.push(best.total_cost());
                outcome.distance_history.push(best.total_distance());
            }

            if generation % 20 == 0 {
                debug!(
                    "Feasible: {}/{} | stagnation: {}",
                    scored.iter().filter(|s| s.is_feasible()).count(),
                    scored.len(),
                    stagnation
                );
            }

            if stagnation > config.restart_stagnation && outcome.feasible_generation.is_none() {
                let vehicle_count = seed::restart_vehicle_count(&problem, outcome.restarts);
                info!(
                    "Restarting population at generation {} over {} vehicles",
                    generation, vehicle_count
                );
                population = seed::restart_population(
                    &problem,
                    config.population_size,
                    vehicle_count,
                    &mut self.rng,
                );
                outcome.restarts += 1;
                stagnation = 0;
                continue;
            }

            if outcome.feasible_generation.is_some() && stagnation > config.converged_stagnation {
                info!("Converged at generation {}", generation);
                outcome.converged = true;
                break;
            }

            population = self.reproduce(&scored)?;
        }

        if let Some(best) = best {
            let mut solution = finalize(&best, &problem, config)?;
            solution.fitness = evaluator.evaluate(&solution, 1.0);
            outcome.solution = solution;
        }
        outcome.runtime = start_time.elapsed();

        info!(
            "Best solution: {} vehicles, cost {:.2}, distance {:.1}, feasible {}",
            outcome.solution.get_route_count(),
            outcome.solution.total_cost(),
            outcome.solution.total_distance(),
            outcome.solution.is_feasible()
        );
        for (i, route) in outcome.solution.routes.iter().enumerate() {
            let [p0, p1, p2] = route.priority_counts(&problem);
            info!(
                "  Route {} ({}): P0={} P1={} P2={}{}",
                i + 1,
                problem.vehicles()[route.vehicle].name,
                p0,
                p1,
                p2,
                route
                    .urgent_position(&problem)
                    .map(|p| format!(", mean P0 position {:.2}", p))
                    .unwrap_or_default()
            );
        }

        Ok(outcome)
    }

    /// Tournament over the best `tournament_pool` solutions, sampled with
    /// replacement. Feasible candidates rank with their fitness scaled by
    /// `feasible_tournament_bias`. Returns the two best of the tournament.
    fn tournament<'a>(&mut self, scored: &'a [Solution]) -> (&'a Solution, &'a Solution) {
        let pool = self.config.tournament_pool.min(scored.len());
        let bias = self.config.feasible_tournament_bias;

        let mut entrants: Vec<(f64, usize)> = (0..self.config.tournament_size)
            .map(|_| {
                let i = self.rng.gen_range(0..pool);
                let score = if scored[i].is_feasible() {
                    scored[i].fitness * bias
                } else {
                    scored[i].fitness
                };
                (score, i)
            })
            .collect();
        entrants.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        (&scored[entrants[0].1], &scored[entrants[1].1])
    }

    /// Carry the elite over unchanged and breed the rest.
    fn reproduce(&mut self, scored: &[Solution]) -> Result<Vec<Solution>> {
        let size = self.config.population_size;
        let mut next: Vec<Solution> = scored.iter().take(self.config.elite_size()).cloned().collect();

        while next.len() < size {
            let (parent_a, parent_b) = self.tournament(scored);
            let child = adaptive_crossover(parent_a, parent_b, self.problem.city_count(), &mut self.rng);
            let child = feasibility_mutation(child, &self.problem, &self.config, &mut self.rng)?;
            next.push(child);
        }

        Ok(next)
    }
}
