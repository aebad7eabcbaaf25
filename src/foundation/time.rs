use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

use crate::foundation::error::{CutlineError, CutlineResult};

const MICROS_PER_SEC: i64 = 1_000_000;

/// A point in (or span of) media time, stored as fixed-point microseconds.
///
/// Timeline arithmetic never goes through floating seconds, so repeated offsets and sums do not
/// drift. [`MediaTime::POSITIVE_INFINITY`] marks the open end of unbounded members and is absorbing
/// under addition.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct MediaTime(i64);

impl MediaTime {
    /// Time zero.
    pub const ZERO: Self = Self(0);
    /// Open end of an unbounded interval.
    pub const POSITIVE_INFINITY: Self = Self(i64::MAX);
    /// Lower sentinel, produced when subtracting infinity from a finite time.
    pub const NEGATIVE_INFINITY: Self = Self(i64::MIN);

    /// Build from whole microseconds.
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Build from whole milliseconds.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000))
    }

    /// Build from whole seconds.
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(MICROS_PER_SEC))
    }

    /// Build from floating seconds, rounded to the nearest microsecond.
    ///
    /// Non-finite input maps to the matching infinity (`NaN` maps to zero).
    pub fn from_secs_f64(secs: f64) -> Self {
        if secs.is_nan() {
            return Self::ZERO;
        }
        if secs == f64::INFINITY {
            return Self::POSITIVE_INFINITY;
        }
        if secs == f64::NEG_INFINITY {
            return Self::NEGATIVE_INFINITY;
        }
        let micros = (secs * MICROS_PER_SEC as f64).round();
        if micros >= i64::MAX as f64 {
            Self::POSITIVE_INFINITY
        } else if micros <= i64::MIN as f64 {
            Self::NEGATIVE_INFINITY
        } else {
            Self(micros as i64)
        }
    }

    /// Build from a rational `value / timescale` seconds value (e.g. decoder timestamps).
    pub fn from_rational(value: i64, timescale: u32) -> CutlineResult<Self> {
        if timescale == 0 {
            return Err(CutlineError::validation("timescale must be > 0"));
        }
        let num = i128::from(value) * i128::from(MICROS_PER_SEC);
        let den = i128::from(timescale);
        // round half away from zero
        let rounded = if num >= 0 {
            (num + den / 2) / den
        } else {
            (num - den / 2) / den
        };
        Ok(Self(
            rounded.clamp(i128::from(i64::MIN + 1), i128::from(i64::MAX - 1)) as i64,
        ))
    }

    /// Raw microsecond count.
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Seconds as `f64`; infinities map to `f64` infinities.
    pub fn as_secs_f64(self) -> f64 {
        match self {
            Self::POSITIVE_INFINITY => f64::INFINITY,
            Self::NEGATIVE_INFINITY => f64::NEG_INFINITY,
            Self(v) => v as f64 / MICROS_PER_SEC as f64,
        }
    }

    /// Whether this is one of the infinity sentinels.
    pub fn is_infinite(self) -> bool {
        self == Self::POSITIVE_INFINITY || self == Self::NEGATIVE_INFINITY
    }

    /// Whether this is a finite time.
    pub fn is_finite(self) -> bool {
        !self.is_infinite()
    }

    /// Absolute distance between two finite times.
    pub fn abs_diff(self, other: Self) -> Self {
        (self - other).abs()
    }

    fn abs(self) -> Self {
        match self {
            Self::NEGATIVE_INFINITY => Self::POSITIVE_INFINITY,
            Self(v) => Self(v.saturating_abs()),
        }
    }

    /// Multiply by an integer factor, saturating into infinity.
    pub fn saturating_mul(self, factor: i64) -> Self {
        if self.is_infinite() {
            return self;
        }
        match self.0.checked_mul(factor) {
            Some(v) if v != i64::MAX && v != i64::MIN => Self(v),
            _ if (self.0 >= 0) == (factor >= 0) => Self::POSITIVE_INFINITY,
            _ => Self::NEGATIVE_INFINITY,
        }
    }

    /// How many spans of `unit` are needed to cover `self` (`ceil(self / unit)`).
    ///
    /// Returns `None` when `unit` is not strictly positive or when `self` is infinite.
    pub fn div_ceil(self, unit: Self) -> Option<u64> {
        if unit.0 <= 0 || unit.is_infinite() || self.is_infinite() {
            return None;
        }
        if self.0 <= 0 {
            return Some(0);
        }
        Some((self.0 as u64).div_ceil(unit.0 as u64))
    }
}

impl Add for MediaTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        if self == Self::POSITIVE_INFINITY || rhs == Self::POSITIVE_INFINITY {
            return Self::POSITIVE_INFINITY;
        }
        if self == Self::NEGATIVE_INFINITY || rhs == Self::NEGATIVE_INFINITY {
            return Self::NEGATIVE_INFINITY;
        }
        match self.0.checked_add(rhs.0) {
            Some(v) if v != i64::MAX && v != i64::MIN => Self(v),
            _ if rhs.0 > 0 => Self::POSITIVE_INFINITY,
            _ => Self::NEGATIVE_INFINITY,
        }
    }
}

impl AddAssign for MediaTime {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Neg for MediaTime {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Self::POSITIVE_INFINITY => Self::NEGATIVE_INFINITY,
            Self::NEGATIVE_INFINITY => Self::POSITIVE_INFINITY,
            Self(v) => Self(-v),
        }
    }
}

impl Sub for MediaTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        if self == Self::POSITIVE_INFINITY {
            return Self::POSITIVE_INFINITY;
        }
        self + (-rhs)
    }
}

impl std::iter::Sum for MediaTime {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, t| acc + t)
    }
}

impl fmt::Display for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::POSITIVE_INFINITY => write!(f, "+inf"),
            Self::NEGATIVE_INFINITY => write!(f, "-inf"),
            t => write!(f, "{:.3}s", t.as_secs_f64()),
        }
    }
}

/// Half-open time interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    /// Inclusive start.
    pub start: MediaTime,
    /// Exclusive end; may be [`MediaTime::POSITIVE_INFINITY`].
    pub end: MediaTime,
}

impl TimeRange {
    /// The empty range at time zero.
    pub const ZERO: Self = Self {
        start: MediaTime::ZERO,
        end: MediaTime::ZERO,
    };

    /// Build a range, rejecting `start > end`.
    pub fn new(start: MediaTime, end: MediaTime) -> CutlineResult<Self> {
        if start > end {
            return Err(CutlineError::invalid_time(format!(
                "range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Build from optional bounds: a missing start is zero, a missing end is infinity.
    pub fn from_bounds(start: Option<MediaTime>, end: Option<MediaTime>) -> Self {
        Self {
            start: start.unwrap_or(MediaTime::ZERO),
            end: end.unwrap_or(MediaTime::POSITIVE_INFINITY),
        }
    }

    /// `end - start`.
    pub fn duration(self) -> MediaTime {
        self.end - self.start
    }

    /// Whether the range covers no time.
    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }

    /// Whether the end bound is finite.
    pub fn is_finite_end(self) -> bool {
        self.end.is_finite()
    }

    /// Half-open membership test.
    pub fn contains(self, t: MediaTime) -> bool {
        self.start <= t && t < self.end
    }

    /// Smallest range covering both ranges.
    pub fn union(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Shift both bounds by `delta`.
    pub fn shift(self, delta: MediaTime) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/time.rs"]
mod tests;
