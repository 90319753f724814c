//! Successive intervals mapped to values.
//!
//! Intervals are contiguous: each one ends where the next begins, so only
//! the (right-closed) end of each interval is stored. With ends
//! `e0 <= e1 <= ...`, interval `0` covers `(-inf, e0]` and interval `i`
//! covers `(e[i-1], e[i]]`. A key above the last end belongs to no interval.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::error::{ProtreeError, Result};

/// End of an interval and the value linked to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Interval<K, V> {
    pub end: K,
    pub value: V,
}

impl<K, V> From<(K, V)> for Interval<K, V> {
    fn from((end, value): (K, V)) -> Self {
        Self { end, value }
    }
}

/// Sorted container of [`Interval`]s with binary-search lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalMap<K, V> {
    intervals: Vec<Interval<K, V>>,
}

impl<K, V> Default for IntervalMap<K, V> {
    fn default() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }
}

impl<K: PartialOrd, V> IntervalMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Intervals in ascending order of their end.
    pub fn iter(&self) -> std::slice::Iter<'_, Interval<K, V>> {
        self.intervals.iter()
    }

    /// Index of the interval `key` belongs to: the first interval whose end
    /// is greater than or equal to `key`.
    ///
    /// Runs in `O(log n)`. Returns `None` when `key` is above every end (or
    /// is not comparable to them, e.g. NaN). Intervals with an incomparable
    /// end are kept last and never cover a key.
    pub fn find_interval(&self, key: &K) -> Option<usize> {
        let comparable = &self.intervals[..self.comparable_len()];
        let index = comparable.partition_point(|iv| !is_at_least(&iv.end, key));
        (index < comparable.len()).then_some(index)
    }

    /// Number of leading intervals whose end is comparable to itself.
    fn comparable_len(&self) -> usize {
        self.intervals.partition_point(|iv| is_comparable(&iv.end))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_interval(key).map(|i| &self.intervals[i].value)
    }

    /// Like [`IntervalMap::get`], falling back to `default` when no interval
    /// covers `key`.
    pub fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Inserts an interval, keeping the ends sorted.
    ///
    /// The new interval is placed right before the interval covering its
    /// end, or last if none does. Overlapping intervals are neither merged
    /// nor truncated; an equal end lands before the existing one. An
    /// incomparable end goes to the very end.
    pub fn insert(&mut self, interval: impl Into<Interval<K, V>>) {
        let interval = interval.into();
        let index = match self.find_interval(&interval.end) {
            Some(index) => index,
            None if is_comparable(&interval.end) => self.comparable_len(),
            None => self.intervals.len(),
        };
        trace!(index, "inserting interval");
        self.intervals.insert(index, interval);
    }

    /// Removes and returns the interval `key` belongs to.
    ///
    /// ### Errors
    /// [`ProtreeError::NotFound`] if no interval covers `key`.
    pub fn remove(&mut self, key: &K) -> Result<Interval<K, V>>
    where
        K: fmt::Debug,
    {
        let index = self.find_interval(key).ok_or_else(|| ProtreeError::NotFound {
            key: format!("{key:?}"),
        })?;
        trace!(index, "removing interval");
        Ok(self.intervals.remove(index))
    }
}

fn is_comparable<K: PartialOrd>(k: &K) -> bool {
    k.partial_cmp(k).is_some()
}

/// Ascending order with incomparable values (NaN) after every other value.
fn end_order<K: PartialOrd>(a: &K, b: &K) -> Ordering {
    a.partial_cmp(b)
        .unwrap_or_else(|| is_comparable(b).cmp(&is_comparable(a)))
}

fn is_at_least<K: PartialOrd>(end: &K, key: &K) -> bool {
    matches!(
        end.partial_cmp(key),
        Some(Ordering::Greater | Ordering::Equal)
    )
}

impl<K: PartialOrd, V, I: Into<Interval<K, V>>> FromIterator<I> for IntervalMap<K, V> {
    /// Collects the intervals and sorts them once by end. The sort is stable,
    /// so equal ends keep their input order. Incomparable ends sort last.
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let mut intervals: Vec<Interval<K, V>> = iter.into_iter().map(Into::into).collect();
        intervals.sort_by(|a, b| end_order(&a.end, &b.end));
        Self { intervals }
    }
}

impl<'a, K, V> IntoIterator for &'a IntervalMap<K, V> {
    type Item = &'a Interval<K, V>;
    type IntoIter = std::slice::Iter<'a, Interval<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

impl<K, V> fmt::Display for IntervalMap<K, V>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, iv) in self.intervals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {})", iv.end, iv.value)?;
        }
        write!(f, "]")
    }
}

/// Parses rows of the form `end=value` separated by `;`.
///
/// Blank rows are skipped. A row must contain exactly one `=`.
impl<K, V> FromStr for IntervalMap<K, V>
where
    K: PartialOrd + FromStr,
    K::Err: fmt::Display,
    V: FromStr,
    V::Err: fmt::Display,
{
    type Err = ProtreeError;

    fn from_str(s: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for row in s.split(';').map(str::trim).filter(|r| !r.is_empty()) {
            let fields: Vec<&str> = row.split('=').map(str::trim).collect();
            let [end, value] = fields.as_slice() else {
                return Err(ProtreeError::InvalidArity {
                    found: fields.len(),
                });
            };
            rows.push(Interval {
                end: parse_field::<K>(end)?,
                value: parse_field::<V>(value)?,
            });
        }
        Ok(rows.into_iter().collect())
    }
}

fn parse_field<T>(field: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    field.parse().map_err(|e: T::Err| ProtreeError::InvalidField {
        field: field.to_string(),
        reason: e.to_string(),
    })
}
