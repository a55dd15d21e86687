//! Survivor culling and parent selection.
//!
//! Each generation first culls the population with [`cull`], which keeps the
//! best fraction and refills to the original size by duplicating survivors.
//! Parents for crossover are then drawn from the culled population with a
//! [`Selection`] strategy.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use rand::Rng;

use crate::tour::{Population, Tour};

/// Keeps the `survivors` best tours and refills to the original size.
///
/// Tours are ranked ascending by fitness (lower is better). Vacated slots are
/// filled with copies of the survivors in rank order, cycling from the best,
/// so the result has exactly the input's size and is sorted best first.
///
/// `survivors` is clamped to `1..=len`. An empty population is returned as is.
pub fn cull(population: Population, survivors: usize) -> Population {
    let size = population.len();
    if size == 0 {
        return population;
    }
    let mut population = population;
    population.sort_by_fitness();

    let kept = survivors.clamp(1, size);
    let mut tours = population.into_tours();
    tours.truncate(kept);
    tours.reserve(size - kept);
    for i in 0..size - kept {
        let copy = tours[i % kept].clone();
        tours.push(copy);
    }
    // Duplicates share fitness with their originals; keep rank order.
    tours.sort_by(|a, b| a.fitness_or_worst().total_cmp(&b.fitness_or_worst()));
    Population::new(tours)
}

/// Strategy for drawing crossover parents.
///
/// All strategies assume **minimization** (lower fitness = better).
///
/// # Examples
///
/// ```
/// use u_tsp_ga::ga::Selection;
///
/// // Any culled tour is equally likely
/// let sel = Selection::Uniform;
///
/// // Tournament with size 3 (moderate selection pressure)
/// let sel = Selection::Tournament(3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Uniform draw from the culled population.
    ///
    /// Selection pressure comes from culling alone.
    #[default]
    Uniform,

    /// Tournament selection: pick `k` tours at random, select the best.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Linear rank selection: weight `n - rank`.
    ///
    /// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
    /// Algorithms"
    ///
    /// # Complexity
    /// O(n) per selection (expects a population sorted best first)
    Rank,
}

impl Selection {
    /// Select a parent index from the population.
    ///
    /// # Panics
    /// Panics if `tours` is empty.
    pub fn select<R: Rng>(&self, tours: &[Tour], rng: &mut R) -> usize {
        assert!(!tours.is_empty(), "cannot select from empty population");

        match self {
            Selection::Uniform => rng.random_range(0..tours.len()),
            Selection::Tournament(k) => tournament(tours, *k, rng),
            Selection::Rank => rank(tours.len(), rng),
        }
    }
}

/// Tournament selection: pick k random tours, return best.
fn tournament<R: Rng>(tours: &[Tour], k: usize, rng: &mut R) -> usize {
    let k = k.max(1);
    let n = tours.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if tours[idx].fitness_or_worst() < tours[best_idx].fitness_or_worst() {
            best_idx = idx;
        }
    }
    best_idx
}

/// Rank selection over a population already sorted best first.
fn rank<R: Rng>(n: usize, rng: &mut R) -> usize {
    if n == 1 {
        return 0;
    }

    let total = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for rank in 0..n {
        cumulative += (n - rank) as f64;
        if cumulative > threshold {
            return rank;
        }
    }

    n - 1 // floating-point fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn scored(fitnesses: &[f64]) -> Population {
        fitnesses
            .iter()
            .enumerate()
            .map(|(i, &f)| Tour::with_fitness(vec![i], f))
            .collect()
    }

    #[test]
    fn test_cull_keeps_size_and_best() {
        let pop = scored(&[40.0, 10.0, 30.0, 20.0]);
        let culled = cull(pop, 3);
        assert_eq!(culled.len(), 4);

        let fits: Vec<f64> = culled.iter().map(|t| t.fitness().unwrap()).collect();
        // Worst (40) culled, best (10) duplicated
        assert_eq!(fits, vec![10.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_cull_duplicates_cycle_from_best() {
        let pop = scored(&[5.0, 4.0, 3.0, 2.0, 1.0, 6.0, 7.0, 8.0]);
        let culled = cull(pop, 3);
        let fits: Vec<f64> = culled.iter().map(|t| t.fitness().unwrap()).collect();
        assert_eq!(fits, vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0, 3.0]);
        // 3 survivors + 5 copies cycling 1,2,3,1,2
        let ones = fits.iter().filter(|&&f| f == 1.0).count();
        let twos = fits.iter().filter(|&&f| f == 2.0).count();
        let threes = fits.iter().filter(|&&f| f == 3.0).count();
        assert_eq!((ones, twos, threes), (3, 3, 2));
    }

    #[test]
    fn test_cull_all_survive() {
        let pop = scored(&[3.0, 1.0, 2.0]);
        let culled = cull(pop, 3);
        let fits: Vec<f64> = culled.iter().map(|t| t.fitness().unwrap()).collect();
        assert_eq!(fits, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_cull_clamps_survivors() {
        let culled = cull(scored(&[3.0, 1.0, 2.0]), 0);
        assert!(culled.iter().all(|t| t.fitness() == Some(1.0)));
        assert_eq!(culled.len(), 3);
        assert!(cull(Population::default(), 2).is_empty());
    }

    #[test]
    fn test_tournament_favors_best() {
        let pop = scored(&[10.0, 5.0, 1.0, 8.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        let n = 10000;
        for _ in 0..n {
            let idx = Selection::Tournament(4).select(pop.tours(), &mut rng);
            counts[idx] += 1;
        }
        let best_count = counts[2];
        assert!(
            best_count > 6000,
            "expected best to be selected >60% of the time, got {best_count}/{n}"
        );
    }

    #[test]
    fn test_uniform_is_roughly_uniform() {
        let pop = scored(&[10.0, 5.0, 1.0, 8.0]);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            counts[Selection::Uniform.select(pop.tours(), &mut rng)] += 1;
        }
        for &c in &counts {
            assert!(c > 2000, "expected uniform, got counts: {counts:?}");
        }
    }

    #[test]
    fn test_rank_favors_front() {
        let pop = cull(scored(&[100.0, 50.0, 1.0, 80.0]), 4);
        let mut rng = create_rng(42);

        let mut counts = [0u32; 4];
        for _ in 0..10000 {
            counts[Selection::Rank.select(pop.tours(), &mut rng)] += 1;
        }
        assert!(
            counts[0] > counts[3],
            "best should be selected more: {counts:?}"
        );
    }

    #[test]
    fn test_single_tour() {
        let pop = scored(&[5.0]);
        let mut rng = create_rng(42);
        for sel in [Selection::Uniform, Selection::Tournament(3), Selection::Rank] {
            assert_eq!(sel.select(pop.tours(), &mut rng), 0);
        }
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let mut rng = create_rng(42);
        Selection::Uniform.select(&[], &mut rng);
    }
}
