//! Population management for the single-vehicle search.

use crate::config::Config;
use crate::error::Result;
use crate::individual::Individual;
use crate::problem::Problem;
use rand::Rng;
use std::cmp::Ordering;

/// A generation of tours, kept in ascending fitness order once evaluated.
#[derive(Debug, Clone)]
pub struct Population {
    pub individuals: Vec<Individual>,
}

impl Population {
    /// Initialize the population with random tours.
    pub fn random<R: Rng + ?Sized>(city_count: usize, size: usize, rng: &mut R) -> Self {
        Population {
            individuals: (0..size)
                .map(|_| Individual::random(city_count, rng))
                .collect(),
        }
    }

    /// Evaluate every individual, then stable-sort by ascending fitness.
    pub fn evaluate(&mut self, problem: &Problem, config: &Config) -> Result<()> {
        for individual in self.individuals.iter_mut() {
            individual.evaluate(problem, config)?;
        }

        self.individuals.sort_by(|a, b| {
            a.fitness()
                .partial_cmp(&b.fitness())
                .unwrap_or(Ordering::Equal)
        });

        Ok(())
    }

    /// Fitness values, parallel to `individuals`.
    pub fn fitness_values(&self) -> Vec<f64> {
        self.individuals.iter().map(Individual::fitness).collect()
    }

    /// The rank-0 individual.
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Select two parents with the configured strategy.
    pub fn select_parents<R: Rng + ?Sized>(
        &self,
        config: &Config,
        fitness: &[f64],
        rng: &mut R,
    ) -> (&Individual, &Individual) {
        let (a, b) = config.selection.select(fitness, rng);
        (&self.individuals[a], &self.individuals[b])
    }

    /// Build the next generation: the rank-0 individual survives unchanged and
    /// the rest is bred through selection, crossover and mutation.
    ///
    /// Must be called on an evaluated, sorted population.
    pub fn next_generation<R: Rng + ?Sized>(&self, config: &Config, rng: &mut R) -> Population {
        let size = config.population_size;
        let mut individuals = Vec::with_capacity(size);

        let elite = match self.best() {
            Some(best) => best,
            None => return Population { individuals },
        };
        individuals.push(elite.clone());

        let city_count = elite.tour.len();
        let fitness = self.fitness_values();

        while individuals.len() < size {
            let (parent1, parent2) = self.select_parents(config, &fitness, rng);
            let mut tour = config.crossover.crossover(&parent1.tour, &parent2.tour, rng);
            config.mutation.mutate(&mut tour, config.mutation_rate, rng);

            let child = Individual::new(tour);
            debug_assert!(child.is_permutation(city_count));
            individuals.push(child);
        }

        Population { individuals }
    }
}
