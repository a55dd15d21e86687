//! Genetic algorithm for the Traveling Salesman Problem.
//!
//! Evolves a population of permutation-encoded tours toward a short closed
//! circuit over a set of 2-D cities:
//!
//! - **Distance model** ([`distance`]): TSPLIB `EUC_2D` and `ATT` edge weights.
//! - **Tours** ([`tour`]): permutations with a cached length and an optional
//!   pinned start prefix.
//! - **Operators** ([`ga::operators`]): stochastic initialization, greedy
//!   crossover, segment-swap mutation, and alternatives.
//! - **Driver** ([`ga`]): culling selection, elitism, and a stagnation-based
//!   stopping rule.
//!
//! # Example
//!
//! ```
//! use u_tsp_ga::distance::EdgeWeight;
//! use u_tsp_ga::ga::{initialize_run, RunConfig, TerminationReason};
//!
//! let coords: Vec<(f64, f64)> = (0..12)
//!     .map(|i| {
//!         let a = i as f64 * std::f64::consts::TAU / 12.0;
//!         (100.0 * a.cos(), 100.0 * a.sin())
//!     })
//!     .collect();
//!
//! let config = RunConfig::for_cities(coords.len()).with_seed(7);
//! let mut run = initialize_run(coords.len(), coords, EdgeWeight::Euc2d, config)?;
//! let result = run.evolve()?;
//!
//! assert_eq!(result.best_tour.len(), 12);
//! assert!(matches!(
//!     result.reason,
//!     TerminationReason::Converged | TerminationReason::Exhausted
//! ));
//! # Ok::<(), u_tsp_ga::TspError>(())
//! ```
//!
//! Reading problem files and reporting results are left to the caller.

pub mod distance;
pub mod error;
pub mod ga;
pub mod random;
pub mod tour;

pub use error::{Result, TspError};
