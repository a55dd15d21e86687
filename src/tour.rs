//! Permutation-encoded tours and fixed-size populations.

use crate::distance::DistanceModel;

/// A candidate closed circuit: a permutation of `0..n`.
///
/// The fitness (total cyclic length) is cached. Any mutable access to the
/// genes through [`genes_mut`](Tour::genes_mut) drops the cache, and it must
/// be recomputed with [`evaluate`](Tour::evaluate) before use.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tour {
    genes: Vec<usize>,
    fitness: Option<f64>,
}

impl Tour {
    /// Wraps a city sequence. The fitness starts stale.
    pub fn new(genes: Vec<usize>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    /// The identity tour `0, 1, .., n-1`.
    pub fn identity(n: usize) -> Self {
        Self::new((0..n).collect())
    }

    /// The city sequence.
    pub fn genes(&self) -> &[usize] {
        &self.genes
    }

    /// Mutable access to the city sequence. Invalidates the cached fitness.
    pub fn genes_mut(&mut self) -> &mut [usize] {
        self.fitness = None;
        &mut self.genes
    }

    /// Consumes the tour, returning its city sequence.
    pub fn into_genes(self) -> Vec<usize> {
        self.genes
    }

    /// Number of cities in the tour.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Cached fitness, or `None` if stale.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Cached fitness, or `f64::INFINITY` if stale. Used for ranking.
    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }

    /// Recomputes the fitness if stale and returns it.
    pub fn evaluate(&mut self, model: &DistanceModel) -> f64 {
        match self.fitness {
            Some(f) => f,
            None => {
                let f = model.tour_length(&self.genes);
                self.fitness = Some(f);
                f
            }
        }
    }

    /// Checks that this tour is a permutation of `0..n` whose first `pinned`
    /// positions hold cities `0..pinned` in order.
    ///
    /// Returns a description of the first defect found.
    pub fn check(&self, n: usize, pinned: usize) -> Result<(), String> {
        if self.genes.len() != n {
            return Err(format!("length {} != city count {n}", self.genes.len()));
        }
        let mut seen = vec![false; n];
        for (pos, &city) in self.genes.iter().enumerate() {
            if city >= n {
                return Err(format!("position {pos} holds out-of-range city {city}"));
            }
            if seen[city] {
                return Err(format!("city {city} appears twice (again at position {pos})"));
            }
            seen[city] = true;
        }
        if let Some(pos) = (0..pinned.min(n)).find(|&i| self.genes[i] != i) {
            return Err(format!(
                "pinned position {pos} holds city {} instead of {pos}",
                self.genes[pos]
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
impl Tour {
    pub(crate) fn with_fitness(genes: Vec<usize>, fitness: f64) -> Self {
        Self {
            genes,
            fitness: Some(fitness),
        }
    }
}

/// A fixed-size collection of tours for one generation.
#[derive(Debug, Clone, Default)]
pub struct Population {
    tours: Vec<Tour>,
}

impl Population {
    /// Wraps a generation's tours.
    pub fn new(tours: Vec<Tour>) -> Self {
        Self { tours }
    }

    pub fn len(&self) -> usize {
        self.tours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    /// The tours, in their current order.
    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tour> {
        self.tours.iter()
    }

    /// Evaluates every tour with a stale fitness.
    pub fn evaluate(&mut self, model: &DistanceModel) {
        for tour in &mut self.tours {
            tour.evaluate(model);
        }
    }

    /// Sorts ascending by fitness (best first). Stale tours sort last.
    pub fn sort_by_fitness(&mut self) {
        self.tours.sort_by(|a, b| a.fitness_or_worst().total_cmp(&b.fitness_or_worst()));
    }

    /// The tour with the lowest fitness. Earliest wins ties.
    pub fn best(&self) -> Option<&Tour> {
        self.tours.iter().reduce(|best, t| {
            if t.fitness_or_worst() < best.fitness_or_worst() {
                t
            } else {
                best
            }
        })
    }

    /// Mean fitness over evaluated tours.
    pub fn mean_fitness(&self) -> f64 {
        let evaluated: Vec<f64> = self.tours.iter().filter_map(Tour::fitness).collect();
        if evaluated.is_empty() {
            return f64::INFINITY;
        }
        evaluated.iter().sum::<f64>() / evaluated.len() as f64
    }

    pub fn into_tours(self) -> Vec<Tour> {
        self.tours
    }
}

impl FromIterator<Tour> for Population {
    fn from_iter<T: IntoIterator<Item = Tour>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
