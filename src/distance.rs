//! Edge-weight metrics and tour length.
//!
//! Distances follow the TSPLIB conventions for the two supported
//! edge-weight types:
//!
//! - `EUC_2D`: Euclidean distance rounded to the nearest integer.
//! - `ATT`: pseudo-Euclidean distance, `sqrt((dx² + dy²) / 10)` rounded up
//!   whenever rounding to nearest would undershoot.
//!
//! All distances are integral values stored as `f64`, so tour lengths compare
//! exactly.
//!
//! # References
//!
//! - Reinelt (1991), "TSPLIB: A Traveling Salesman Problem Library"

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TspError};

/// A city coordinate `(x, y)`.
pub type Coord = (f64, f64);

/// Edge-weight metric fixed for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeWeight {
    /// Pseudo-Euclidean (`ATT` in TSPLIB, used by att48 / att532).
    Att,
    /// Rounded Euclidean (`EUC_2D` in TSPLIB).
    Euc2d,
}

impl EdgeWeight {
    /// The TSPLIB `EDGE_WEIGHT_TYPE` tag.
    pub fn tag(self) -> &'static str {
        match self {
            EdgeWeight::Att => "ATT",
            EdgeWeight::Euc2d => "EUC_2D",
        }
    }
}

impl fmt::Display for EdgeWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for EdgeWeight {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim();
        if tag.eq_ignore_ascii_case("ATT") {
            Ok(EdgeWeight::Att)
        } else if tag.eq_ignore_ascii_case("EUC_2D") {
            Ok(EdgeWeight::Euc2d)
        } else {
            Err(TspError::configuration(format!(
                "unsupported edge weight type {tag:?} (expected ATT or EUC_2D)"
            )))
        }
    }
}

/// Applies the `ATT` rounding rule to a raw pseudo-Euclidean distance.
///
/// `tij = round(rij)`; the result is `tij + 1` when `tij < rij`, else `tij`.
pub fn att_round(rij: f64) -> f64 {
    let tij = rij.round();
    if tij < rij {
        tij + 1.0
    } else {
        tij
    }
}

/// Coordinate table plus metric. Read-only once built.
#[derive(Debug, Clone)]
pub struct DistanceModel {
    coords: Vec<Coord>,
    metric: EdgeWeight,
}

impl DistanceModel {
    /// Builds a model over `coords`.
    ///
    /// Fails if any coordinate is NaN or infinite.
    pub fn new(coords: Vec<Coord>, metric: EdgeWeight) -> Result<Self> {
        if let Some(i) = coords
            .iter()
            .position(|&(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(TspError::configuration(format!(
                "city {i} has a non-finite coordinate {:?}",
                coords[i]
            )));
        }
        Ok(Self { coords, metric })
    }

    /// The edge-weight metric.
    pub fn metric(&self) -> EdgeWeight {
        self.metric
    }

    /// City coordinates, indexed by city.
    pub fn coordinates(&self) -> &[Coord] {
        &self.coords
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Returns `true` if there are no cities.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Edge length between cities `a` and `b`.
    ///
    /// Zero when `a == b`. Never negative.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        if a == b {
            return 0.0;
        }
        let (x1, y1) = self.coords[a];
        let (x2, y2) = self.coords[b];
        let dx = x1 - x2;
        let dy = y1 - y2;

        match self.metric {
            EdgeWeight::Euc2d => (dx * dx + dy * dy).sqrt().round(),
            EdgeWeight::Att => att_round(((dx * dx + dy * dy) / 10.0).sqrt()),
        }
    }

    /// Length of the closed circuit visiting `tour` in order.
    ///
    /// Includes the closing edge from the last city back to the first.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        match tour {
            [] | [_] => 0.0,
            [first, .., last] => {
                let open: f64 = tour.windows(2).map(|w| self.distance(w[0], w[1])).sum();
                open + self.distance(*last, *first)
            }
        }
    }

    /// Mean edge length from `from` to each city in `to`.
    pub fn mean_distance(&self, from: usize, to: &[usize]) -> f64 {
        if to.is_empty() {
            return 0.0;
        }
        to.iter().map(|&c| self.distance(from, c)).sum::<f64>() / to.len() as f64
    }

    /// The city in `candidates` closest to `from`, lowest index on ties.
    pub fn nearest<I>(&self, from: usize, candidates: I) -> Option<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut best: Option<(usize, f64)> = None;
        for c in candidates {
            let d = self.distance(from, c);
            best = match best {
                Some((bc, bd)) if bd < d || (bd == d && bc < c) => Some((bc, bd)),
                _ => Some((c, d)),
            };
        }
        best.map(|(c, _)| c)
    }
}
