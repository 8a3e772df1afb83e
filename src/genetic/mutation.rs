//! Permutation mutations: swap, inversion and scramble.

use rand::seq::{index, SliceRandom};
use rand::Rng;

/// For each position, with probability `probability`, swap it with another
/// uniformly chosen position.
pub fn swap<R: Rng + ?Sized>(tour: &mut [usize], probability: f64, rng: &mut R) {
    let size = tour.len();
    if size < 2 {
        return;
    }

    for i in 0..size {
        if rng.gen::<f64>() < probability {
            let mut j = rng.gen_range(0..size - 1);
            if j >= i {
                j += 1;
            }
            tour.swap(i, j);
        }
    }
}

fn segment<R: Rng + ?Sized>(size: usize, rng: &mut R) -> (usize, usize) {
    let picks = index::sample(rng, size, 2);
    let (i, j) = (picks.index(0), picks.index(1));
    (i.min(j), i.max(j))
}

/// With probability `probability`, reverse `tour[i..j]` for two random indices.
pub fn inversion<R: Rng + ?Sized>(tour: &mut [usize], probability: f64, rng: &mut R) {
    if tour.len() < 2 || rng.gen::<f64>() >= probability {
        return;
    }

    let (i, j) = segment(tour.len(), rng);
    tour[i..j].reverse();
}

/// With probability `probability`, shuffle `tour[i..j]` for two random indices.
pub fn scramble<R: Rng + ?Sized>(tour: &mut [usize], probability: f64, rng: &mut R) {
    if tour.len() < 2 || rng.gen::<f64>() >= probability {
        return;
    }

    let (i, j) = segment(tour.len(), rng);
    tour[i..j].shuffle(rng);
}
