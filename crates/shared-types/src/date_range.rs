//! # Date Range
//!
//! A `_lastUpdated` query window. Either end may be inclusive, exclusive or
//! open.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Bound, RangeBounds};

use crate::entities::Timestamp;

/// Query window over record update instants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Lower end of the window.
    pub lower: Bound<Timestamp>,
    /// Upper end of the window.
    pub upper: Bound<Timestamp>,
}

impl DateRange {
    pub fn new(lower: Bound<Timestamp>, upper: Bound<Timestamp>) -> Self {
        Self { lower, upper }
    }

    /// `[from, to]`
    pub fn between(from: Timestamp, to: Timestamp) -> Self {
        Self::new(Bound::Included(from), Bound::Included(to))
    }

    /// `[from, ∞)`
    pub fn since(from: Timestamp) -> Self {
        Self::new(Bound::Included(from), Bound::Unbounded)
    }

    /// `(from, ∞)`
    pub fn after(from: Timestamp) -> Self {
        Self::new(Bound::Excluded(from), Bound::Unbounded)
    }

    /// `(-∞, to]`
    pub fn until(to: Timestamp) -> Self {
        Self::new(Bound::Unbounded, Bound::Included(to))
    }

    /// `(-∞, to)`
    pub fn before(to: Timestamp) -> Self {
        Self::new(Bound::Unbounded, Bound::Excluded(to))
    }

    /// `(-∞, ∞)`
    pub fn unbounded() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }

    /// The lower instant, ignoring inclusivity.
    pub fn lower_instant(&self) -> Option<Timestamp> {
        bound_instant(&self.lower)
    }

    /// The upper instant, ignoring inclusivity.
    pub fn upper_instant(&self) -> Option<Timestamp> {
        bound_instant(&self.upper)
    }

    /// Does this window share at least one instant with the closed interval
    /// `[first, last]`?
    pub fn intersects(&self, first: Timestamp, last: Timestamp) -> bool {
        let lower_ok = match self.lower {
            Bound::Included(a) => a <= last,
            Bound::Excluded(a) => a < last,
            Bound::Unbounded => true,
        };
        let upper_ok = match self.upper {
            Bound::Included(b) => b >= first,
            Bound::Excluded(b) => b > first,
            Bound::Unbounded => true,
        };
        lower_ok && upper_ok
    }

    /// Does every instant of this window lie at or before `instant`?
    ///
    /// An open upper end never does.
    pub fn ends_by(&self, instant: Timestamp) -> bool {
        match self.upper {
            Bound::Included(b) | Bound::Excluded(b) => b <= instant,
            Bound::Unbounded => false,
        }
    }

    /// Does the window contain `instant`?
    pub fn contains_instant(&self, instant: &Timestamp) -> bool {
        self.contains(instant)
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl RangeBounds<Timestamp> for DateRange {
    fn start_bound(&self) -> Bound<&Timestamp> {
        self.lower.as_ref()
    }

    fn end_bound(&self) -> Bound<&Timestamp> {
        self.upper.as_ref()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Bound::Included(a) => write!(f, "[{}", a.to_rfc3339())?,
            Bound::Excluded(a) => write!(f, "({}", a.to_rfc3339())?,
            Bound::Unbounded => write!(f, "(-inf")?,
        }
        match &self.upper {
            Bound::Included(b) => write!(f, ", {}]", b.to_rfc3339()),
            Bound::Excluded(b) => write!(f, ", {})", b.to_rfc3339()),
            Bound::Unbounded => write!(f, ", +inf)"),
        }
    }
}

fn bound_instant(bound: &Bound<Timestamp>) -> Option<Timestamp> {
    match bound {
        Bound::Included(t) | Bound::Excluded(t) => Some(*t),
        Bound::Unbounded => None,
    }
}
