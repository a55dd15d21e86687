//! Run configuration.
//!
//! [`RunConfig`] holds every parameter that stays fixed for one run.

use super::operators::{Crossover, Initialization, Mutation};
use super::selection::Selection;
use crate::error::{Result, TspError};

/// Smallest instance the operators are meaningful on.
pub const MIN_CITIES: usize = 4;

/// Closed-form population size estimate for `n` cities.
///
/// `round(ln(1 - 0.99^(1/n)) / ln((n - 3) / (n - 1)))`, the size at which
/// every edge is likely (p = 0.99) to appear somewhere in a random initial
/// population. Clamped to at least 2; only meaningful for `n >= 4`.
///
/// # References
///
/// Rintala (1996), "Population size in GAs for TSP"
pub fn estimate_population_size(n: usize) -> usize {
    if n < MIN_CITIES {
        return 2;
    }
    let n = n as f64;
    let numerator = (1.0 - 0.99f64.powf(1.0 / n)).ln();
    let denominator = ((n - 3.0) / (n - 1.0)).ln();
    let estimate = (numerator / denominator).round();
    if estimate.is_finite() && estimate >= 2.0 {
        estimate as usize
    } else {
        2
    }
}

/// Configuration for one evolutionary run.
///
/// # Defaults
///
/// ```
/// use u_tsp_ga::ga::RunConfig;
///
/// let config = RunConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.mutation_rate, 3);
/// assert_eq!(config.start_offset, 1);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_tsp_ga::ga::{Fallback, RunConfig, Crossover};
///
/// let config = RunConfig::for_cities(48)
///     .with_max_generations(200)
///     .with_culling_fraction(0.6)
///     .with_crossover(Crossover::Greedy(Fallback::ParentOrder))
///     .with_seed(7);
/// assert!(config.validate(48).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Number of tours in every generation.
    pub population_size: usize,

    /// Hard upper bound on generations.
    ///
    /// The stagnation limit is derived from it: `ceil(0.3 × max_generations)`.
    pub max_generations: usize,

    /// Inverse mutation probability: each offspring mutates with
    /// probability `1 / mutation_rate`.
    pub mutation_rate: u32,

    /// Fraction of the population kept by the culling selector (0.0–1.0].
    pub culling_fraction: f64,

    /// Number of leading tour positions pinned to cities `0..start_offset`.
    pub start_offset: usize,

    /// Best culled tours copied unchanged into the next generation.
    pub elite_count: usize,

    /// How initial tours are built.
    pub initialization: Initialization,

    /// How two parents are recombined.
    pub crossover: Crossover,

    /// How an offspring is perturbed.
    pub mutation: Mutation,

    /// How parents are drawn from the culled population.
    pub selection: Selection,

    /// Produce offspring in parallel with rayon.
    ///
    /// Only takes effect with the `parallel` feature. Results are identical
    /// either way for a given seed.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses OS entropy.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            mutation_rate: 3,
            culling_fraction: 0.75,
            start_offset: 1,
            elite_count: 1,
            initialization: Initialization::default(),
            crossover: Crossover::default(),
            mutation: Mutation::default(),
            selection: Selection::default(),
            parallel: true,
            seed: None,
        }
    }
}

impl RunConfig {
    /// Defaults with population size and max generations both set from
    /// [`estimate_population_size`].
    ///
    /// The two are independent knobs; override either separately.
    pub fn for_cities(n: usize) -> Self {
        let estimate = estimate_population_size(n);
        Self {
            population_size: estimate,
            max_generations: estimate,
            ..Self::default()
        }
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the inverse mutation probability (`1 / m`).
    pub fn with_mutation_rate(mut self, m: u32) -> Self {
        self.mutation_rate = m;
        self
    }

    /// Sets the culling fraction (clamped to [0.0, 1.0]).
    pub fn with_culling_fraction(mut self, fraction: f64) -> Self {
        self.culling_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Sets the number of pinned leading cities.
    pub fn with_start_offset(mut self, offset: usize) -> Self {
        self.start_offset = offset;
        self
    }

    /// Sets the number of elite tours carried over.
    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the initialization operator.
    pub fn with_initialization(mut self, init: Initialization) -> Self {
        self.initialization = init;
        self
    }

    /// Sets the crossover operator.
    pub fn with_crossover(mut self, crossover: Crossover) -> Self {
        self.crossover = crossover;
        self
    }

    /// Sets the mutation operator.
    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutation = mutation;
        self
    }

    /// Sets the parent selection strategy.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Enables or disables parallel offspring production.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Consecutive unchanged generations that end the run as converged.
    pub fn stagnation_limit(&self) -> usize {
        ((self.max_generations as f64 * 0.3).ceil() as usize).max(1)
    }

    /// Number of survivors kept by the culling selector.
    pub fn survivor_count(&self) -> usize {
        let kept = (self.population_size as f64 * self.culling_fraction).round() as usize;
        kept.clamp(1, self.population_size.max(1))
    }

    /// Validates the configuration against a city count.
    pub fn validate(&self, city_count: usize) -> Result<()> {
        if city_count < MIN_CITIES {
            return Err(TspError::configuration(format!(
                "city count must be at least {MIN_CITIES}, got {city_count}"
            )));
        }
        if self.population_size < 2 {
            return Err(TspError::configuration("population_size must be at least 2"));
        }
        if self.max_generations == 0 {
            return Err(TspError::configuration("max_generations must be at least 1"));
        }
        if self.mutation_rate == 0 {
            return Err(TspError::configuration(
                "mutation_rate is an inverse probability and must be at least 1",
            ));
        }
        if !(self.culling_fraction > 0.0 && self.culling_fraction <= 1.0) {
            return Err(TspError::configuration(format!(
                "culling_fraction must be in (0, 1], got {}",
                self.culling_fraction
            )));
        }
        if self.start_offset + 2 > city_count {
            return Err(TspError::configuration(format!(
                "start_offset {} leaves fewer than 2 movable cities out of {city_count}",
                self.start_offset
            )));
        }
        if self.elite_count >= self.population_size {
            return Err(TspError::configuration(
                "elite_count too high: elites fill entire population",
            ));
        }
        if self.selection == Selection::Tournament(0) {
            return Err(TspError::configuration("tournament size must be at least 1"));
        }
        Ok(())
    }
}
