//! Permutation-preserving genetic operators for tours.
//!
//! Every operator works on a tour whose first `pinned` positions hold the
//! fixed start cities; those positions are never rearranged. Each output is a
//! permutation of `0..n` by construction.
//!
//! # Initialization
//!
//! - [`stochastic_tour`]: random order biased toward short edges
//! - [`random_tour`]: uniform shuffle
//!
//! # Crossover Operators
//!
//! - [`greedy_crossover`]: Grefenstette (1985): follows the shorter parent edge
//! - [`order_crossover`] (OX): Davis (1985): preserves relative order
//!
//! # Mutation Operators
//!
//! - [`segment_swap_mutation`]: exchange two equal-length blocks: O(n)
//! - [`invert_mutation`]: reverse a random segment (2-opt): O(n)
//! - [`swap_mutation`]: exchange two random positions: O(1)
//!
//! # References
//!
//! - Grefenstette et al. (1985), "Genetic Algorithms for the Traveling
//!   Salesman Problem"
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Larrañaga et al. (1999), "Genetic Algorithms for the Travelling Salesman
//!   Problem: A Review of Representations and Operators"

use rand::seq::SliceRandom;
use rand::Rng;

use crate::distance::DistanceModel;
use crate::tour::Tour;

// ============================================================================
// Operator variants
// ============================================================================

/// How initial tours are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Initialization {
    /// Random order biased toward edges no longer than the mean.
    #[default]
    Stochastic,
    /// Uniform shuffle of the movable cities.
    Random,
}

impl Initialization {
    /// Builds one tour over all cities of `model`.
    pub fn build<R: Rng>(&self, model: &DistanceModel, pinned: usize, rng: &mut R) -> Tour {
        let genes = match self {
            Initialization::Stochastic => stochastic_tour(model, pinned, rng),
            Initialization::Random => random_tour(model.len(), pinned, rng),
        };
        Tour::new(genes)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Initialization::Stochastic => "stochastic initialization",
            Initialization::Random => "random initialization",
        }
    }
}

/// What greedy crossover does when both parents' successors are already
/// in the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fallback {
    /// Nearest unplaced city; lowest index on ties.
    #[default]
    Nearest,
    /// First unplaced city in parent 1's order.
    ParentOrder,
    /// Uniformly random unplaced city.
    Random,
}

impl Fallback {
    fn choose<R: Rng>(
        &self,
        current: usize,
        parent1: &[usize],
        placed: &[bool],
        model: &DistanceModel,
        rng: &mut R,
    ) -> Option<usize> {
        match self {
            Fallback::Nearest => {
                model.nearest(current, (0..placed.len()).filter(|&c| !placed[c]))
            }
            Fallback::ParentOrder => parent1.iter().copied().find(|&c| !placed[c]),
            Fallback::Random => {
                let unplaced: Vec<usize> = (0..placed.len()).filter(|&c| !placed[c]).collect();
                if unplaced.is_empty() {
                    None
                } else {
                    Some(unplaced[rng.random_range(0..unplaced.len())])
                }
            }
        }
    }
}

/// How two parents are recombined into one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crossover {
    /// Greedy (heuristic) crossover with the given fallback.
    Greedy(Fallback),
    /// Order crossover over the movable region.
    Order,
}

impl Default for Crossover {
    fn default() -> Self {
        Crossover::Greedy(Fallback::default())
    }
}

impl Crossover {
    /// Produces one child from two parents with identical pinned prefixes.
    pub fn apply<R: Rng>(
        &self,
        parent1: &[usize],
        parent2: &[usize],
        model: &DistanceModel,
        pinned: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        match self {
            Crossover::Greedy(fallback) => {
                greedy_crossover(parent1, parent2, model, pinned, *fallback, rng)
            }
            Crossover::Order => order_crossover(parent1, parent2, pinned, rng),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Crossover::Greedy(_) => "greedy crossover",
            Crossover::Order => "order crossover",
        }
    }
}

/// How an offspring is perturbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mutation {
    /// Exchange two equal-length, non-overlapping blocks.
    #[default]
    SegmentSwap,
    /// Reverse one segment.
    Invert,
    /// Exchange two positions.
    Swap,
    /// Overwrites the last city with its predecessor. Test-only.
    #[cfg(test)]
    Duplicate,
}

impl Mutation {
    /// Mutates `tour` with probability `1 / rate`.
    ///
    /// Returns `true` if the tour was touched; its cached fitness is then
    /// stale. A `rate` of 0 never mutates.
    pub fn apply<R: Rng>(&self, tour: &mut Tour, rate: u32, pinned: usize, rng: &mut R) -> bool {
        if rate == 0 || rng.random_range(0..rate) != 0 {
            return false;
        }
        let genes = tour.genes_mut();
        match self {
            Mutation::SegmentSwap => segment_swap_mutation(genes, pinned, rng),
            Mutation::Invert => invert_mutation(genes, pinned, rng),
            Mutation::Swap => swap_mutation(genes, pinned, rng),
            #[cfg(test)]
            Mutation::Duplicate => {
                let n = genes.len();
                if n >= 2 {
                    genes[n - 1] = genes[n - 2];
                }
            }
        }
        true
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SegmentSwap => "segment swap mutation",
            Mutation::Invert => "invert mutation",
            Mutation::Swap => "swap mutation",
            #[cfg(test)]
            Mutation::Duplicate => "duplicate mutation",
        }
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Builds a tour whose movable cities follow a stochastically greedy order.
///
/// # Algorithm
///
/// 1. Shuffle the movable cities into an unplaced pool
/// 2. Compute the mean distance from the last placed city to the pool
/// 3. Draw candidates at random without replacement; place the first one
///    whose distance is at most the mean
/// 4. Repeat until the pool is empty
///
/// The last city is placed without comparison. If every candidate is
/// rejected (rounding), the first drawn candidate is placed.
///
/// # Complexity
/// O(n²) time, O(n) space
pub fn stochastic_tour<R: Rng>(model: &DistanceModel, pinned: usize, rng: &mut R) -> Vec<usize> {
    let n = model.len();
    let pinned = pinned.min(n);

    let mut tour: Vec<usize> = Vec::with_capacity(n);
    tour.extend(0..pinned);
    let mut remaining: Vec<usize> = (pinned..n).collect();
    remaining.shuffle(rng);

    if tour.is_empty() && !remaining.is_empty() {
        tour.push(remaining.swap_remove(0));
    }

    while !remaining.is_empty() {
        let pick = if remaining.len() == 1 {
            0
        } else {
            let last = tour[tour.len() - 1];
            pick_below_mean(model, last, &remaining, rng)
        };
        tour.push(remaining.swap_remove(pick));
    }

    tour
}

/// Index into `remaining` of a random candidate no farther than the mean.
fn pick_below_mean<R: Rng>(
    model: &DistanceModel,
    last: usize,
    remaining: &[usize],
    rng: &mut R,
) -> usize {
    let mean = model.mean_distance(last, remaining);
    let m = remaining.len();

    // Partial Fisher-Yates: each draw is a fresh candidate.
    let mut order: Vec<usize> = (0..m).collect();
    for t in 0..m {
        let j = rng.random_range(t..m);
        order.swap(t, j);
        if model.distance(last, remaining[order[t]]) <= mean {
            return order[t];
        }
    }
    order[0]
}

/// Pinned prefix followed by a uniform shuffle of the remaining cities.
pub fn random_tour<R: Rng>(n: usize, pinned: usize, rng: &mut R) -> Vec<usize> {
    let pinned = pinned.min(n);
    let mut tour: Vec<usize> = (0..n).collect();
    tour[pinned..].shuffle(rng);
    tour
}

// ============================================================================
// Crossover operators
// ============================================================================

/// Greedy (heuristic) crossover for tours.
///
/// # Algorithm (Grefenstette, 1985)
///
/// 1. Start the child with the pinned prefix (parent1's first city if none)
/// 2. For the current city, look up its successor in each parent
/// 3. If both successors are unplaced, take the one with the shorter edge
///    (parent1 on ties); if only one is, take it
/// 4. If both are placed, take the city chosen by `fallback`
/// 5. Repeat until all cities are placed
///
/// # Complexity
/// O(n) time when the fallback is rarely needed, O(n²) worst case
///
/// # Panics
/// Panics if parents have different lengths or are not permutations of `0..n`.
pub fn greedy_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    model: &DistanceModel,
    pinned: usize,
    fallback: Fallback,
    rng: &mut R,
) -> Vec<usize> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    if n == 0 {
        return Vec::new();
    }

    let next1 = successors(parent1);
    let next2 = successors(parent2);
    let mut placed = vec![false; n];
    let mut child = Vec::with_capacity(n);

    let head = &parent1[..pinned.clamp(1, n)];
    for &city in head {
        placed[city] = true;
        child.push(city);
    }

    while child.len() < n {
        let current = child[child.len() - 1];
        let a = next1[current];
        let b = next2[current];

        let next = match (placed[a], placed[b]) {
            (false, false) => {
                if model.distance(current, b) < model.distance(current, a) {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (false, true) => Some(a),
            (true, false) => Some(b),
            (true, true) => fallback.choose(current, parent1, &placed, model, rng),
        };

        // A short child fails the caller's permutation check.
        let Some(next) = next else { break };
        placed[next] = true;
        child.push(next);
    }

    child
}

/// `succ[city]` is the city visited after `city` on the closed tour.
fn successors(tour: &[usize]) -> Vec<usize> {
    let n = tour.len();
    let mut succ = vec![0; n];
    for i in 0..n {
        succ[tour[i]] = tour[(i + 1) % n];
    }
    succ
}

/// Order Crossover (OX) restricted to the movable region.
///
/// # Algorithm (Davis, 1985)
///
/// 1. Copy the pinned prefix from parent1
/// 2. Select a random segment of the movable region from parent1 and copy it
///    to the same positions
/// 3. Fill the rest of the movable region with parent2's movable cities in
///    their original order, skipping those already present
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if parents have different lengths.
pub fn order_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    pinned: usize,
    rng: &mut R,
) -> Vec<usize> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    let pinned = pinned.min(n);

    if n - pinned < 2 {
        return parent1.to_vec();
    }

    let (start, end) = random_segment(n - pinned, rng);

    let mut child = Vec::with_capacity(n);
    child.extend_from_slice(&parent1[..pinned]);
    child.extend(ox_build_child(&parent1[pinned..], &parent2[pinned..], start, end, n));
    child
}

/// Build one OX child: copy segment from `template`, fill from `donor`.
fn ox_build_child(
    template: &[usize],
    donor: &[usize],
    start: usize,
    end: usize,
    n_cities: usize,
) -> Vec<usize> {
    let m = template.len();
    let mut child = vec![usize::MAX; m];
    let mut in_segment = vec![false; n_cities];

    for i in start..=end {
        child[i] = template[i];
        in_segment[template[i]] = true;
    }

    // Fill from donor, starting after segment end, wrapping around
    let mut pos = (end + 1) % m;
    for offset in 0..m {
        let val = donor[(end + 1 + offset) % m];
        if val < n_cities && !in_segment[val] {
            child[pos] = val;
            pos = (pos + 1) % m;
        }
    }

    child
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Segment swap mutation: exchange two equal-length, non-overlapping blocks.
///
/// Picks a length `L` in `1..=m/2` (`m` movable positions), then starts
/// `a < b` with `a + L <= b`. Each block keeps its internal order.
///
/// # Complexity
/// O(L)
pub fn segment_swap_mutation<R: Rng>(perm: &mut [usize], pinned: usize, rng: &mut R) {
    let n = perm.len();
    let pinned = pinned.min(n);
    let m = n - pinned;
    if m < 2 {
        return;
    }

    let len = rng.random_range(1..=m / 2);
    let a = rng.random_range(pinned..=n - 2 * len);
    let b = rng.random_range(a + len..=n - len);

    let (left, right) = perm.split_at_mut(b);
    left[a..a + len].swap_with_slice(&mut right[..len]);
}

/// Invert mutation: reverse a random movable segment (2-opt move).
///
/// # Complexity
/// O(n) worst case for segment reversal
pub fn invert_mutation<R: Rng>(perm: &mut [usize], pinned: usize, rng: &mut R) {
    let n = perm.len();
    let pinned = pinned.min(n);
    if n - pinned < 2 {
        return;
    }
    let (start, end) = random_segment(n - pinned, rng);
    perm[pinned + start..=pinned + end].reverse();
}

/// Swap mutation: exchange two random movable positions.
///
/// # Complexity
/// O(1)
pub fn swap_mutation<R: Rng>(perm: &mut [usize], pinned: usize, rng: &mut R) {
    let n = perm.len();
    let pinned = pinned.min(n);
    if n - pinned < 2 {
        return;
    }
    let i = rng.random_range(pinned..n);
    let j = rng.random_range(pinned..n);
    perm.swap(i, j);
}

// ============================================================================
// Helpers
// ============================================================================

/// Pick a random segment `[start, end]` within `0..n` where `start <= end`.
fn random_segment<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Tests
// ============================================================================
