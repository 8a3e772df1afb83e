//! Parent selection over a fitness array (lower is better).

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::index;
use rand::Rng;
use std::cmp::Ordering;

fn ascending(fitness: &[f64], a: usize, b: usize) -> Ordering {
    fitness[a].partial_cmp(&fitness[b]).unwrap_or(Ordering::Equal)
}

/// Sample `k` individuals without replacement and return the two best of them.
///
/// With a single sampled individual, it is returned as both parents.
pub fn tournament<R: Rng + ?Sized>(fitness: &[f64], k: usize, rng: &mut R) -> (usize, usize) {
    assert!(!fitness.is_empty(), "Cannot select from empty population");

    let amount = k.clamp(1, fitness.len());
    let mut sampled = index::sample(rng, fitness.len(), amount).into_vec();
    sampled.sort_by(|&a, &b| ascending(fitness, a, b));

    match sampled.as_slice() {
        [only] => (*only, *only),
        [first, second, ..] => (*first, *second),
        [] => unreachable!(),
    }
}

/// Draw two individuals with replacement, weighted by how far their fitness
/// lies below the worst one. Falls back to uniform weights when every
/// individual scores the same.
pub fn roulette<R: Rng + ?Sized>(fitness: &[f64], rng: &mut R) -> (usize, usize) {
    assert!(!fitness.is_empty(), "Cannot select from empty population");

    let worst = fitness.iter().copied().fold(f64::MIN, f64::max);
    let weights: Vec<f64> = fitness.iter().map(|&f| worst - f).collect();

    draw_two(&weights, rng)
}

/// Draw two individuals with replacement, weighted by rank: the best of `n`
/// gets weight `n`, the worst gets weight 1.
pub fn rank<R: Rng + ?Sized>(fitness: &[f64], rng: &mut R) -> (usize, usize) {
    assert!(!fitness.is_empty(), "Cannot select from empty population");

    let n = fitness.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| ascending(fitness, a, b));

    let weights: Vec<f64> = (0..n).map(|position| (n - position) as f64).collect();
    let (a, b) = draw_two(&weights, rng);

    (order[a], order[b])
}

fn draw_two<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> (usize, usize) {
    match WeightedIndex::<f64>::new(weights) {
        Ok(dist) => (dist.sample(rng), dist.sample(rng)),
        // All-zero or non-finite weights
        Err(_) => (
            rng.gen_range(0..weights.len()),
            rng.gen_range(0..weights.len()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn tournament_over_whole_population_returns_two_best() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let fitness = [40.0, 10.0, 30.0, 20.0];

        for _ in 0..20 {
            assert_eq!(tournament(&fitness, 4, &mut rng), (1, 3));
        }
    }

    #[test]
    fn tournament_larger_than_population_is_clamped() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(tournament(&[5.0], 3, &mut rng), (0, 0));
        assert_eq!(tournament(&[5.0, 1.0], 3, &mut rng), (1, 0));
    }

    #[test]
    fn roulette_never_picks_the_worst_when_others_differ() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let fitness = [10.0, 20.0, 90.0];

        for _ in 0..200 {
            let (a, b) = roulette(&fitness, &mut rng);
            assert_ne!(a, 2);
            assert_ne!(b, 2);
        }
    }

    #[test]
    fn roulette_with_equal_fitness_is_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let fitness = [5.0; 4];
        let mut seen = [false; 4];

        for _ in 0..200 {
            let (a, b) = roulette(&fitness, &mut rng);
            seen[a] = true;
            seen[b] = true;
        }

        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn rank_prefers_the_best() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let fitness = [100.0, 1.0, 50.0];
        let mut counts = [0usize; 3];

        for _ in 0..3000 {
            let (a, b) = rank(&fitness, &mut rng);
            counts[a] += 1;
            counts[b] += 1;
        }

        assert!(counts[1] > counts[2]);
        assert!(counts[2] > counts[0]);
    }
}
