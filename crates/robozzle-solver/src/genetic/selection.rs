//! Tournament selection with elitism.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for selection operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Number of individuals competing in each tournament.
    pub tournament_size: usize,
    /// Number of elite individuals carried over unchanged.
    pub elite_count: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            tournament_size: 3,
            elite_count: 2,
        }
    }
}

/// Indices of the `count` best individuals, best first.
pub fn select_elite(fitness: &[f64], count: usize) -> Vec<usize> {
    let mut indexed: Vec<(usize, f64)> = fitness.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    indexed.into_iter().take(count).map(|(i, _)| i).collect()
}

/// Draw `k` individuals at random and return the fittest.
pub fn tournament_select<R: Rng + ?Sized>(fitness: &[f64], k: usize, rng: &mut R) -> usize {
    let pop_size = fitness.len();
    if pop_size == 0 {
        return 0;
    }

    let k = k.clamp(1, pop_size);
    let mut best_idx = rng.gen_range(0..pop_size);

    for _ in 1..k {
        let idx = rng.gen_range(0..pop_size);
        if fitness[idx] > fitness[best_idx] {
            best_idx = idx;
        }
    }

    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_select_elite_orders_by_fitness() {
        let fitness = [1.0, 4.0, 2.0, 4.0, 3.0];
        let elite = select_elite(&fitness, 3);
        assert_eq!(elite.len(), 3);
        assert_eq!(fitness[elite[0]], 4.0);
        assert_eq!(fitness[elite[1]], 4.0);
        assert_eq!(elite[2], 4);
    }

    #[test]
    fn test_full_tournament_prefers_fitter() {
        let fitness = [1.0, 1.0, 9.0, 1.0];
        let mut rng = SmallRng::seed_from_u64(5);
        let wins = (0..200)
            .filter(|_| tournament_select(&fitness, 4, &mut rng) == 2)
            .count();
        // Index 2 loses only when it is never drawn: (3/4)^4 of the time
        assert!(wins > 120, "fittest won {wins} of 200");
    }

    #[test]
    fn test_tournament_of_one_is_uniform_draw() {
        let fitness = [5.0, 1.0];
        let mut rng = SmallRng::seed_from_u64(9);
        let picks: Vec<usize> = (0..100)
            .map(|_| tournament_select(&fitness, 1, &mut rng))
            .collect();
        assert!(picks.contains(&0) && picks.contains(&1));
    }
}
