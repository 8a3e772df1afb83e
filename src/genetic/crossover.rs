//! Permutation crossovers: OX, PMX and CX.

use rand::seq::index;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Pick a slice `[a, b)` with `a < b`.
fn cut_points<R: Rng + ?Sized>(size: usize, rng: &mut R) -> (usize, usize) {
    let cuts = index::sample(rng, size, 2);
    let (a, b) = (cuts.index(0), cuts.index(1));
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn positions(tour: &[usize]) -> HashMap<usize, usize> {
    tour.iter().enumerate().map(|(i, &gene)| (gene, i)).collect()
}

fn same_genes(parent1: &[usize], parent2: &[usize]) -> bool {
    let mut a = parent1.to_vec();
    let mut b = parent2.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Order crossover (OX).
///
/// Copies `parent1[a..b]` verbatim, then fills the remaining positions,
/// starting at `b` and wrapping, with the genes of `parent2` in its visiting
/// order from `b` onwards, skipping genes already present.
pub fn order<R: Rng + ?Sized>(parent1: &[usize], parent2: &[usize], rng: &mut R) -> Vec<usize> {
    let size = parent1.len();
    if size < 2 {
        return parent1.to_vec();
    }

    let (a, b) = cut_points(size, rng);
    order_with_cuts(parent1, parent2, a, b)
}

pub(crate) fn order_with_cuts(parent1: &[usize], parent2: &[usize], a: usize, b: usize) -> Vec<usize> {
    let size = parent1.len();
    let mut child = parent1.to_vec();
    let used: HashSet<usize> = parent1[a..b].iter().copied().collect();

    let mut slot = b % size;
    for offset in 0..size {
        let gene = parent2[(b + offset) % size];
        if used.contains(&gene) {
            continue;
        }
        child[slot] = gene;
        slot = (slot + 1) % size;
    }

    child
}

/// Partially mapped crossover (PMX).
///
/// # Panics
///
/// Panics if the parents are not permutations of the same genes.
pub fn partially_mapped<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    let size = parent1.len();
    if size < 2 {
        return parent1.to_vec();
    }

    let (a, b) = cut_points(size, rng);
    partially_mapped_with_cuts(parent1, parent2, a, b)
}

pub(crate) fn partially_mapped_with_cuts(
    parent1: &[usize],
    parent2: &[usize],
    a: usize,
    b: usize,
) -> Vec<usize> {
    debug_assert!(same_genes(parent1, parent2), "parents must share their genes");
    let size = parent1.len();
    let in_parent2 = positions(parent2);

    let mut child: Vec<Option<usize>> = vec![None; size];
    let mut placed = HashSet::with_capacity(size);
    for i in a..b {
        child[i] = Some(parent1[i]);
        placed.insert(parent1[i]);
    }

    // Genes of parent2's slice that parent1's slice displaced follow the
    // parent1 <-> parent2 mapping until they land outside the slice.
    for i in a..b {
        let gene = parent2[i];
        if placed.contains(&gene) {
            continue;
        }

        let mut idx = i;
        loop {
            idx = in_parent2[&parent1[idx]];
            if child[idx].is_none() {
                child[idx] = Some(gene);
                placed.insert(gene);
                break;
            }
        }
    }

    child
        .into_iter()
        .enumerate()
        .map(|(i, gene)| gene.unwrap_or(parent2[i]))
        .collect()
}

/// Cycle crossover (CX).
///
/// Follows the cycle starting at index 0 ("the gene of parent2 at this
/// position sits where in parent1?") copying parent1's genes along it. All
/// other positions come from parent2.
///
/// # Panics
///
/// Panics if the parents are not permutations of the same genes.
pub fn cycle(parent1: &[usize], parent2: &[usize]) -> Vec<usize> {
    debug_assert!(same_genes(parent1, parent2), "parents must share their genes");
    let size = parent1.len();
    if size == 0 {
        return Vec::new();
    }

    let in_parent1 = positions(parent1);
    let mut child = parent2.to_vec();

    let start = 0;
    let mut idx = start;
    loop {
        child[idx] = parent1[idx];
        idx = in_parent1[&parent2[idx]];
        if idx == start {
            break;
        }
    }

    child
}
