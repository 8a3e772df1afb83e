//! Individual representation for the single-vehicle search.

use crate::config::Config;
use crate::error::Result;
use crate::fitness::{evaluate_tour, TourEvaluation};
use crate::problem::Problem;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;

/// An individual in the single-vehicle population: a permutation of all city
/// indices plus its last evaluation.
#[derive(Debug, Clone)]
pub struct Individual {
    /// The order in which cities are visited
    pub tour: Vec<usize>,
    /// Fitness breakdown, absent until evaluated
    pub evaluation: Option<TourEvaluation>,
}

impl Individual {
    /// Create a new, unevaluated individual from a tour.
    pub fn new(tour: Vec<usize>) -> Self {
        Individual {
            tour,
            evaluation: None,
        }
    }

    /// A uniformly shuffled tour over `city_count` cities.
    pub fn random<R: Rng + ?Sized>(city_count: usize, rng: &mut R) -> Self {
        let mut tour: Vec<usize> = (0..city_count).collect();
        tour.shuffle(rng);
        Individual::new(tour)
    }

    /// Evaluate the tour and cache the result.
    pub fn evaluate(&mut self, problem: &Problem, config: &Config) -> Result<f64> {
        let evaluation = evaluate_tour(problem, config, &self.tour)?;
        self.evaluation = Some(evaluation);
        Ok(evaluation.fitness)
    }

    /// Cached fitness; unevaluated individuals rank last.
    pub fn fitness(&self) -> f64 {
        self.evaluation.map_or(f64::INFINITY, |e| e.fitness)
    }

    /// Cached tour distance, if evaluated.
    pub fn distance(&self) -> Option<f64> {
        self.evaluation.map(|e| e.distance)
    }

    /// Check that the tour visits each of `city_count` cities exactly once.
    pub fn is_permutation(&self, city_count: usize) -> bool {
        if self.tour.len() != city_count {
            return false;
        }

        let mut seen = HashSet::with_capacity(city_count);
        self.tour
            .iter()
            .all(|&city| city < city_count && seen.insert(city))
    }
}

impl PartialEq for Individual {
    fn eq(&self, other: &Self) -> bool {
        self.fitness() == other.fitness()
    }
}

impl PartialOrd for Individual {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.fitness().partial_cmp(&other.fitness())
    }
}
