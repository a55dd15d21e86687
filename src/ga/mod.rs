//! Genetic algorithm for the Traveling Salesman Problem.
//!
//! Tours are permutations of city indices. Every operator preserves that
//! encoding, and the driver checks each operator's output before it enters
//! the population.
//!
//! # Key Types
//!
//! - [`RunConfig`]: Run parameters (population size, generations, rates, operators)
//! - [`RunHandle`]: One problem instance and the state of its run
//! - [`EvolutionResult`]: Best tour, its length, and why the run stopped
//!
//! # Submodules
//!
//! - [`operators`]: Initialization, crossover, and mutation operators
//!
//! # Generation Loop
//!
//! 1. Build the initial population (stochastic initialization)
//! 2. Rank and cull; keep the best `elite_count` tours unchanged
//! 3. Fill the other slots with crossover of two culled parents, then mutation
//! 4. Stop when the best length is unchanged for `ceil(0.3 × max_generations)`
//!    generations, or after `max_generations`
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Grefenstette et al. (1985), "Genetic Algorithms for the Traveling Salesman Problem"

mod config;
pub mod operators;
mod runner;
mod selection;

pub use config::{estimate_population_size, RunConfig, MIN_CITIES};
pub use operators::{Crossover, Fallback, Initialization, Mutation};
pub use runner::{
    initialize_run, EvolutionResult, GenerationStats, RunHandle, RunState, Stagnation,
    TerminationReason, Trend,
};
pub use selection::{cull, Selection};
