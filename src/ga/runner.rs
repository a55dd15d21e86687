//! Evolution driver.
//!
//! [`RunHandle`] owns one problem instance and runs the generation loop:
//! initialization → evaluation → culling → crossover → mutation → repeat,
//! stopping on stagnation or when the generation budget is spent.

use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::RunConfig;
use super::selection::cull;
use crate::distance::{Coord, DistanceModel, EdgeWeight};
use crate::error::{Result, TspError};
use crate::random::{create_rng, rng_from};
use crate::tour::{Population, Tour};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// The best fitness stayed unchanged for the stagnation limit.
    Converged,
    /// The maximum generation count was reached.
    Exhausted,
}

/// Lifecycle of a [`RunHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Configured, not yet evolved (also after [`RunHandle::reset`]).
    Ready,
    /// Stopped by the stagnation rule.
    Converged,
    /// Stopped at the generation budget.
    Exhausted,
    /// Stopped by an invariant violation.
    Aborted,
}

impl From<TerminationReason> for RunState {
    fn from(reason: TerminationReason) -> Self {
        match reason {
            TerminationReason::Converged => RunState::Converged,
            TerminationReason::Exhausted => RunState::Exhausted,
        }
    }
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvolutionResult {
    /// The best tour found during the entire run.
    pub best_tour: Vec<usize>,

    /// Length of `best_tour`.
    pub best_fitness: f64,

    /// Why the run stopped.
    pub reason: TerminationReason,

    /// Number of generations executed.
    pub generations: usize,

    /// Best-so-far fitness: the initial population, then one entry per
    /// generation.
    pub fitness_history: Vec<f64>,
}

/// Per-generation progress passed to an observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    /// 1-based generation index.
    pub generation: usize,
    /// Best fitness in this generation.
    pub generation_best: f64,
    /// Best fitness seen so far in the run.
    pub best_so_far: f64,
    /// Mean fitness of this generation.
    pub mean_fitness: f64,
    /// This generation's best against the previous generation's.
    pub trend: Trend,
    /// Consecutive generations without change.
    pub stagnation: usize,
}

/// Direction of the generation best relative to the previous generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Improved,
    Unchanged,
    Worsened,
}

/// Stagnation counter.
///
/// Counts consecutive generations whose best equals the previous
/// generation's best; any change resets the count.
#[derive(Debug, Clone)]
pub struct Stagnation {
    limit: usize,
    count: usize,
    previous: f64,
}

impl Stagnation {
    /// `initial` is the best fitness of the initial population.
    pub fn new(limit: usize, initial: f64) -> Self {
        Self {
            limit: limit.max(1),
            count: 0,
            previous: initial,
        }
    }

    /// Records one generation's best fitness.
    pub fn observe(&mut self, generation_best: f64) -> Trend {
        let trend = if generation_best == self.previous {
            self.count += 1;
            Trend::Unchanged
        } else if generation_best < self.previous {
            self.count = 0;
            Trend::Improved
        } else {
            self.count = 0;
            Trend::Worsened
        };
        self.previous = generation_best;
        trend
    }

    /// Consecutive unchanged generations so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns `true` once the count reaches the limit.
    pub fn is_converged(&self) -> bool {
        self.count >= self.limit
    }
}

/// Validates inputs and prepares a run.
///
/// Fails with [`TspError::Configuration`] if `city_count` differs from the
/// number of coordinates, if a coordinate is not finite, or if `config` is
/// invalid for `city_count` cities. Nothing is evolved yet.
///
/// # Examples
///
/// ```
/// use u_tsp_ga::distance::EdgeWeight;
/// use u_tsp_ga::ga::{initialize_run, RunConfig};
///
/// let coords = vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)];
/// let config = RunConfig::for_cities(4).with_seed(42);
/// let mut run = initialize_run(4, coords, EdgeWeight::Euc2d, config).unwrap();
///
/// let result = run.evolve().unwrap();
/// assert_eq!(result.best_fitness, 40.0);
/// ```
pub fn initialize_run(
    city_count: usize,
    coordinates: Vec<Coord>,
    metric: EdgeWeight,
    config: RunConfig,
) -> Result<RunHandle> {
    if city_count != coordinates.len() {
        return Err(TspError::configuration(format!(
            "city count {city_count} does not match {} coordinates",
            coordinates.len()
        )));
    }
    let model = DistanceModel::new(coordinates, metric)?;
    RunHandle::new(model, config)
}

/// One problem instance plus the state of its current run.
///
/// The coordinate table and parameters are fixed at construction.
/// [`reset`](Self::reset) starts over with fresh randomization.
#[derive(Debug)]
pub struct RunHandle {
    model: DistanceModel,
    config: RunConfig,
    seeds: StdRng,
    state: RunState,
    outcome: Option<Result<EvolutionResult>>,
}

impl RunHandle {
    /// Prepares a run over `model`.
    pub fn new(model: DistanceModel, config: RunConfig) -> Result<Self> {
        config.validate(model.len())?;
        Ok(Self {
            seeds: rng_from(config.seed),
            model,
            config,
            state: RunState::Ready,
            outcome: None,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The run parameters.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The coordinate table and metric.
    pub fn model(&self) -> &DistanceModel {
        &self.model
    }

    /// Runs to termination and returns the best tour.
    ///
    /// Once the run has ended, further calls return the same outcome
    /// until [`reset`](Self::reset).
    pub fn evolve(&mut self) -> Result<EvolutionResult> {
        self.evolve_with(|_| {})
    }

    /// Like [`evolve`](Self::evolve), calling `observer` after every
    /// generation.
    pub fn evolve_with<F>(&mut self, mut observer: F) -> Result<EvolutionResult>
    where
        F: FnMut(&GenerationStats),
    {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }

        let mut rng = create_rng(self.seeds.random());
        let outcome = self.run(&mut rng, &mut observer);

        self.state = match &outcome {
            Ok(result) => result.reason.into(),
            Err(err) => {
                warn!("run aborted: {err}");
                RunState::Aborted
            }
        };
        self.outcome = Some(outcome.clone());
        outcome
    }

    /// Discards the current run. Parameters and coordinates are kept; the
    /// next [`evolve`](Self::evolve) uses a new random stream.
    pub fn reset(&mut self) {
        self.state = RunState::Ready;
        self.outcome = None;
    }

    fn run<F>(&self, rng: &mut StdRng, observer: &mut F) -> Result<EvolutionResult>
    where
        F: FnMut(&GenerationStats),
    {
        let config = &self.config;
        info!(
            "evolving {} cities ({}): population {}, max generations {}, mutation 1/{}, culling {}",
            self.model.len(),
            self.model.metric(),
            config.population_size,
            config.max_generations,
            config.mutation_rate,
            config.culling_fraction
        );

        let breeder = Breeder {
            model: &self.model,
            config: &self.config,
        };
        let mut population = breeder.initial_population(rng)?;

        let Some(first_best) = population.best() else {
            return Err(TspError::invariant(
                breeder.config.initialization.name(),
                0,
                "initial population is empty",
            ));
        };
        let mut best = first_best.clone();
        let mut best_fitness = best.fitness_or_worst();
        let mut fitness_history = Vec::with_capacity(breeder.config.max_generations + 1);
        fitness_history.push(best_fitness);
        let mut stagnation = Stagnation::new(breeder.config.stagnation_limit(), best_fitness);
        debug!("initial population ready: best {best_fitness}");

        for generation in 1..=breeder.config.max_generations {
            population = breeder.next_generation(population, generation, rng)?;

            let Some(gen_best) = population.best() else {
                return Err(TspError::invariant("culling", generation, "population is empty"));
            };
            let gen_fitness = gen_best.fitness_or_worst();
            let trend = stagnation.observe(gen_fitness);
            if gen_fitness < best_fitness {
                best = gen_best.clone();
                best_fitness = gen_fitness;
            }
            fitness_history.push(best_fitness);

            let stats = GenerationStats {
                generation,
                generation_best: gen_fitness,
                best_so_far: best_fitness,
                mean_fitness: population.mean_fitness(),
                trend,
                stagnation: stagnation.count(),
            };
            debug!(
                "generation {generation}: best {gen_fitness} ({:?}), mean {:.1}, stagnant {}",
                stats.trend, stats.mean_fitness, stats.stagnation
            );
            observer(&stats);

            if stagnation.is_converged() {
                info!("converged after {generation} generations: best {best_fitness}");
                return Ok(EvolutionResult {
                    best_tour: best.into_genes(),
                    best_fitness,
                    reason: TerminationReason::Converged,
                    generations: generation,
                    fitness_history,
                });
            }
        }

        info!(
            "generation budget of {} spent: best {best_fitness}",
            breeder.config.max_generations
        );
        Ok(EvolutionResult {
            best_tour: best.into_genes(),
            best_fitness,
            reason: TerminationReason::Exhausted,
            generations: breeder.config.max_generations,
            fitness_history,
        })
    }
}

/// Read-only view used to build generations.
struct Breeder<'a> {
    model: &'a DistanceModel,
    config: &'a RunConfig,
}

impl Breeder<'_> {
    fn initial_population(&self, rng: &mut StdRng) -> Result<Population> {
        let init = self.config.initialization;
        (0..self.config.population_size)
            .map(|_| {
                let mut tour = init.build(self.model, self.config.start_offset, rng);
                self.verify(&tour, init.name(), 0)?;
                tour.evaluate(self.model);
                Ok(tour)
            })
            .collect()
    }

    /// Culls `population` and breeds its replacement.
    ///
    /// The best `elite_count` tours are carried over unchanged; every other
    /// slot gets its own seed drawn here, so offspring do not depend on how
    /// they are scheduled.
    fn next_generation(
        &self,
        mut population: Population,
        generation: usize,
        rng: &mut StdRng,
    ) -> Result<Population> {
        let size = population.len();
        population.sort_by_fitness();
        let elite_count = self.config.elite_count.min(size);
        let mut next = Vec::with_capacity(size);
        next.extend_from_slice(&population.tours()[..elite_count]);

        let culled = cull(population, self.config.survivor_count());
        let seeds: Vec<u64> = (elite_count..size).map(|_| rng.random()).collect();
        next.extend(self.breed_all(culled.tours(), &seeds, generation)?);

        Ok(Population::new(next))
    }

    #[cfg(feature = "parallel")]
    fn breed_all(&self, parents: &[Tour], seeds: &[u64], generation: usize) -> Result<Vec<Tour>> {
        if self.config.parallel {
            seeds
                .par_iter()
                .map(|&seed| self.breed(parents, seed, generation))
                .collect()
        } else {
            seeds
                .iter()
                .map(|&seed| self.breed(parents, seed, generation))
                .collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn breed_all(&self, parents: &[Tour], seeds: &[u64], generation: usize) -> Result<Vec<Tour>> {
        seeds
            .iter()
            .map(|&seed| self.breed(parents, seed, generation))
            .collect()
    }

    /// One offspring: select two parents, recombine, mutate, evaluate.
    fn breed(&self, parents: &[Tour], seed: u64, generation: usize) -> Result<Tour> {
        let mut rng = create_rng(seed);
        let config = self.config;
        let pinned = config.start_offset;

        let p1 = &parents[config.selection.select(parents, &mut rng)];
        let p2 = &parents[config.selection.select(parents, &mut rng)];

        let genes = config
            .crossover
            .apply(p1.genes(), p2.genes(), self.model, pinned, &mut rng);
        let mut child = Tour::new(genes);
        self.verify(&child, config.crossover.name(), generation)?;

        if config
            .mutation
            .apply(&mut child, config.mutation_rate, pinned, &mut rng)
        {
            self.verify(&child, config.mutation.name(), generation)?;
            trace!("generation {generation}: {} applied", config.mutation.name());
        }

        child.evaluate(self.model);
        Ok(child)
    }

    fn verify(&self, tour: &Tour, operator: &'static str, generation: usize) -> Result<()> {
        tour.check(self.model.len(), self.config.start_offset)
            .map_err(|defect| TspError::invariant(operator, generation, defect))
    }
}

// ============================================================================
// Tests
// ============================================================================
