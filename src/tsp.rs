//! Single-vehicle search driven one generation at a time.
//!
//! The engine has no generation cap of its own: the caller invokes
//! [`TspEngine::step`] from its own loop and stops whenever it wants.

use crate::config::Config;
use crate::error::{Result, RoutingError};
use crate::fitness::select_vehicle;
use crate::individual::Individual;
use crate::population::Population;
use crate::problem::{Problem, Vehicle};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Summary of one completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationResult {
    /// 1-based index of the generation just evaluated
    pub generation: usize,
    /// Fitness of this generation's best tour
    pub best_fitness: f64,
    /// Distance of this generation's best tour
    pub best_distance: f64,
    /// Whether the incumbent improved in this generation
    pub improved: bool,
}

pub struct TspEngine {
    pub problem: Arc<Problem>,
    pub config: Config,
    pub population: Population,
    /// Best tour seen so far
    pub best: Option<Individual>,
    pub generation: usize,
    pub fitness_history: Vec<f64>,
    pub distance_history: Vec<f64>,
    rng: ChaCha8Rng,
    start_time: Instant,
}

impl TspEngine {
    /// Create a new engine with a random initial population.
    pub fn new(problem: impl Into<Arc<Problem>>, config: Config) -> Result<Self> {
        let problem = problem.into();
        config.validate()?;
        if problem.vehicles().is_empty() {
            return Err(RoutingError::NoVehicles);
        }

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let population = Self::seed_population(&problem, &config, &mut rng);

        Ok(TspEngine {
            problem,
            config,
            population,
            best: None,
            generation: 0,
            fitness_history: Vec::new(),
            distance_history: Vec::new(),
            rng,
            start_time: Instant::now(),
        })
    }

    fn seed_population(problem: &Problem, config: &Config, rng: &mut ChaCha8Rng) -> Population {
        if problem.city_count() == 0 {
            Population { individuals: Vec::new() }
        } else {
            Population::random(problem.city_count(), config.population_size, rng)
        }
    }

    /// Discard the population, history and incumbent and start over.
    pub fn reset(&mut self) {
        self.population = Self::seed_population(&self.problem, &self.config, &mut self.rng);
        self.best = None;
        self.generation = 0;
        self.fitness_history.clear();
        self.distance_history.clear();
        self.start_time = Instant::now();
        info!("Population reset");
    }

    /// Evaluate the current generation, update incumbent and history, then
    /// breed the next generation.
    pub fn step(&mut self) -> Result<GenerationResult> {
        self.generation += 1;

        self.population.evaluate(&self.problem, &self.config)?;

        let (best_fitness, best_distance) = match self.population.best() {
            Some(best) => (best.fitness(), best.distance().unwrap_or(0.0)),
            None => {
                return Ok(GenerationResult {
                    generation: self.generation,
                    best_fitness: 0.0,
                    best_distance: 0.0,
                    improved: false,
                })
            }
        };
        self.fitness_history.push(best_fitness);
        self.distance_history.push(best_distance);

        let improved = self.best.as_ref().map_or(true, |b| best_fitness < b.fitness());
        if improved {
            self.best = self.population.best().cloned();
            debug!(
                "Generation {}: new best fitness {:.2} (distance {:.1})",
                self.generation, best_fitness, best_distance
            );
        }

        if self.generation % 50 == 0 {
            info!(
                "Generation {}: fitness={:.2}, distance={:.1}, vehicle={}",
                self.generation,
                best_fitness,
                best_distance,
                self.best_vehicle().map_or("none", |v| v.name.as_str())
            );
        }

        self.population = self.population.next_generation(&self.config, &mut self.rng);

        Ok(GenerationResult {
            generation: self.generation,
            best_fitness,
            best_distance,
            improved,
        })
    }

    /// Run a fixed number of generations and return the incumbent.
    pub fn run_for(&mut self, generations: usize) -> Result<Option<&Individual>> {
        for _ in 0..generations {
            self.step()?;
        }
        Ok(self.best.as_ref())
    }

    /// The cheapest vehicle able to run the incumbent tour.
    pub fn best_vehicle(&self) -> Option<&Vehicle> {
        let evaluation = self.best.as_ref()?.evaluation?;
        select_vehicle(self.problem.vehicles(), evaluation.weight, evaluation.distance)
    }

    /// Incumbent tour as city names.
    pub fn best_route_names(&self) -> Vec<&str> {
        self.best.as_ref().map_or_else(Vec::new, |best| {
            best.tour
                .iter()
                .map(|&city| self.problem.node(city).name.as_str())
                .collect()
        })
    }

    /// Wall time since the engine was created or reset.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
