//! Genetic operators over city permutations.
//!
//! The operator families are closed: each one is an enum whose variants
//! dispatch to a plain function in the matching submodule. Selection returns
//! population indices, crossover builds a new permutation, and mutation edits
//! a permutation in place. Every crossover and mutation keeps the permutation
//! invariant: the child holds exactly the genes of its parents, once each.

pub mod crossover;
pub mod mutation;
pub mod selection;

use crate::error::RoutingError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parent selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionKind {
    /// Sample k individuals without replacement, keep the two best.
    Tournament(usize),
    /// Fitness-proportional on inverted fitness.
    Roulette,
    /// Proportional to rank position.
    Rank,
}

impl SelectionKind {
    /// Pick two parents. Returns their indices into `fitness`.
    pub fn select<R: Rng + ?Sized>(&self, fitness: &[f64], rng: &mut R) -> (usize, usize) {
        match *self {
            SelectionKind::Tournament(k) => selection::tournament(fitness, k, rng),
            SelectionKind::Roulette => selection::roulette(fitness, rng),
            SelectionKind::Rank => selection::rank(fitness, rng),
        }
    }
}

/// Permutation crossover operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverKind {
    /// Order crossover (OX).
    Order,
    /// Partially mapped crossover (PMX).
    PartiallyMapped,
    /// Cycle crossover (CX).
    Cycle,
}

impl CrossoverKind {
    /// Produce one child from two permutations of the same gene set.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> Vec<usize> {
        match self {
            CrossoverKind::Order => crossover::order(parent1, parent2, rng),
            CrossoverKind::PartiallyMapped => crossover::partially_mapped(parent1, parent2, rng),
            CrossoverKind::Cycle => crossover::cycle(parent1, parent2),
        }
    }
}

/// Permutation mutation operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Swap,
    Inversion,
    Scramble,
}

impl MutationKind {
    /// Mutate `tour` in place with the given probability.
    pub fn mutate<R: Rng + ?Sized>(&self, tour: &mut [usize], probability: f64, rng: &mut R) {
        match self {
            MutationKind::Swap => mutation::swap(tour, probability, rng),
            MutationKind::Inversion => mutation::inversion(tour, probability, rng),
            MutationKind::Scramble => mutation::scramble(tour, probability, rng),
        }
    }
}

fn unknown_key(name: &'static str, key: &str) -> RoutingError {
    RoutingError::InvalidParameter {
        name,
        reason: format!("unknown key '{}'", key),
    }
}

impl FromStr for SelectionKind {
    type Err = RoutingError;

    /// Parses `tournament`, `tournament:<k>`, `roulette` or `rank`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.split_once(':') {
            Some(("tournament", k)) => k
                .parse::<usize>()
                .ok()
                .filter(|&k| k > 0)
                .map(SelectionKind::Tournament)
                .ok_or_else(|| unknown_key("selection", s)),
            Some(_) => Err(unknown_key("selection", s)),
            None => match key.as_str() {
                "tournament" => Ok(SelectionKind::Tournament(3)),
                "roulette" => Ok(SelectionKind::Roulette),
                "rank" => Ok(SelectionKind::Rank),
                _ => Err(unknown_key("selection", s)),
            },
        }
    }
}

impl FromStr for CrossoverKind {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ox" => Ok(CrossoverKind::Order),
            "pmx" => Ok(CrossoverKind::PartiallyMapped),
            "cx" => Ok(CrossoverKind::Cycle),
            _ => Err(unknown_key("crossover", s)),
        }
    }
}

impl FromStr for MutationKind {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swap" => Ok(MutationKind::Swap),
            "inversion" => Ok(MutationKind::Inversion),
            "scramble" => Ok(MutationKind::Scramble),
            _ => Err(unknown_key("mutation", s)),
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionKind::Tournament(k) => write!(f, "tournament:{}", k),
            SelectionKind::Roulette => write!(f, "roulette"),
            SelectionKind::Rank => write!(f, "rank"),
        }
    }
}

impl fmt::Display for CrossoverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            CrossoverKind::Order => "ox",
            CrossoverKind::PartiallyMapped => "pmx",
            CrossoverKind::Cycle => "cx",
        };
        write!(f, "{}", key)
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            MutationKind::Swap => "swap",
            MutationKind::Inversion => "inversion",
            MutationKind::Scramble => "scramble",
        };
        write!(f, "{}", key)
    }
}
