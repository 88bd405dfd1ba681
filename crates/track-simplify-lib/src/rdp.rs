//! Ramer-Douglas-Peucker reduction over planar points
//!
//! The classic algorithm splits recursively at the point farthest from the chord. Here the
//! recursion is replaced by an explicit work-list of index ranges, so tracks with hundreds
//! of thousands of points cannot exhaust the call stack.

use crate::{PlanarPoint, Result, SimplifyError};
use smallvec::SmallVec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Strictly increasing indices of the points retained from a track
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct IndexSet(Vec<usize>);

impl IndexSet {
    /// Every index of a track with `len` points
    pub fn all(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Build from indices already sorted and deduplicated
    fn from_sorted(indices: Vec<usize>) -> Self {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        Self(indices)
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of retained points
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the point at `index` was retained
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }

    /// Pick the retained items out of the original sequence, in order
    ///
    /// Indices past the end of `items` are skipped.
    pub fn select<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.0
            .iter()
            .filter_map(|&idx| items.get(idx).cloned())
            .collect()
    }
}

impl AsRef<[usize]> for IndexSet {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl From<IndexSet> for Vec<usize> {
    fn from(set: IndexSet) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a IndexSet {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Cooperative cancellation, polled once per work-list iteration
pub trait Cancellation {
    /// Return true to abandon the reduction
    fn is_cancelled(&self) -> bool;
}

/// Never cancels
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    #[inline(always)]
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Cancels once a point in time has passed
///
/// A deadline too far in the future to be represented never fires.
#[derive(Clone, Copy, Debug)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now().checked_add(timeout))
    }
}

impl Cancellation for Deadline {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.0.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// A flag set from another thread
impl Cancellation for AtomicBool {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<C: Cancellation + ?Sized> Cancellation for &C {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<C: Cancellation + ?Sized> Cancellation for Arc<C> {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Reference segment with its direction and squared length precomputed
struct Chord {
    start: PlanarPoint,
    dx: f64,
    dy: f64,
    length_sq: f64,
}

impl Chord {
    #[inline(always)]
    fn new(start: PlanarPoint, end: PlanarPoint) -> Self {
        let dx = end.x() - start.x();
        let dy = end.y() - start.y();
        Self {
            start,
            dx,
            dy,
            length_sq: dx * dx + dy * dy,
        }
    }

    /// Distance from `p` to the nearest point of the segment
    #[inline(always)]
    fn distance(&self, p: PlanarPoint) -> f64 {
        let px = p.x() - self.start.x();
        let py = p.y() - self.start.y();

        // Zero-length chord: plain point-to-point distance
        if self.length_sq == 0.0 {
            return px.hypot(py);
        }

        let t = ((px * self.dx + py * self.dy) / self.length_sq).clamp(0.0, 1.0);
        (px - t * self.dx).hypot(py - t * self.dy)
    }
}

/// Distance from `p` to the segment `a`-`b`
///
/// The projection of `p` is clamped to the segment, so points beyond either end are
/// measured to the nearer endpoint. A degenerate segment (`a == b`) yields the distance
/// from `p` to `a`.
pub fn point_segment_distance(p: PlanarPoint, a: PlanarPoint, b: PlanarPoint) -> f64 {
    Chord::new(a, b).distance(p)
}

pub(crate) fn validate_epsilon(epsilon: f64) -> Result<()> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(SimplifyError::InvalidEpsilon(epsilon));
    }
    Ok(())
}

/// Reject the first planar point with a NaN or infinite coordinate
fn validate_planar_points(points: &[PlanarPoint]) -> Result<()> {
    match points
        .iter()
        .position(|p| !p.x().is_finite() || !p.y().is_finite())
    {
        Some(index) => Err(SimplifyError::NonFinitePlanarPoint {
            index,
            x: points[index].x(),
            y: points[index].y(),
        }),
        None => Ok(()),
    }
}

/// Farthest interior point of `start..end` from the chord; lowest index wins on ties
#[inline]
fn farthest_point(points: &[PlanarPoint], start: usize, end: usize) -> (f64, usize) {
    let chord = Chord::new(points[start], points[end]);
    let mut max_dist = -1.0;
    let mut max_idx = start + 1;

    for (offset, &point) in points[start + 1..end].iter().enumerate() {
        let dist = chord.distance(point);
        if dist > max_dist {
            max_dist = dist;
            max_idx = start + 1 + offset;
        }
    }

    (max_dist, max_idx)
}

/// Select the points to keep with Ramer-Douglas-Peucker
///
/// # Arguments
/// * `points` - Planar points of one track, in traversal order
/// * `epsilon` - Maximum distance in meters of a discarded point from the segment joining
///   its retained neighbours
///
/// # Returns
/// Strictly increasing indices, always including both endpoints,
/// [`SimplifyError::InvalidEpsilon`] if `epsilon` is negative or not finite, or
/// [`SimplifyError::NonFinitePlanarPoint`] for the first point with a NaN or infinite
/// coordinate
pub fn reduce_indices(points: &[PlanarPoint], epsilon: f64) -> Result<IndexSet> {
    reduce_indices_with(points, epsilon, &NeverCancel)
}

/// Like [`reduce_indices`], polling `cancel` once per work-list iteration
///
/// Returns [`SimplifyError::Cancelled`] as soon as the check fires; no partial result is
/// produced.
pub fn reduce_indices_with<C: Cancellation + ?Sized>(
    points: &[PlanarPoint],
    epsilon: f64,
    cancel: &C,
) -> Result<IndexSet> {
    #[cfg(feature = "profiling")]
    profiling::scope!("rdp::reduce_indices");

    validate_epsilon(epsilon)?;
    validate_planar_points(points)?;

    let n = points.len();
    if n <= 2 {
        return Ok(IndexSet::all(n));
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    // Ranges (start, end) with at least one interior point
    let mut stack: SmallVec<[(usize, usize); 32]> = SmallVec::new();
    stack.push((0, n - 1));
    let mut iterations = 0usize;

    while let Some((start, end)) = stack.pop() {
        if cancel.is_cancelled() {
            tracing::debug!("RDP cancelled after {} iterations", iterations);
            return Err(SimplifyError::Cancelled { iterations });
        }
        iterations += 1;

        let (max_dist, max_idx) = farthest_point(points, start, end);
        if max_dist > epsilon {
            keep[max_idx] = true;
            if max_idx - start > 1 {
                stack.push((start, max_idx));
            }
            if end - max_idx > 1 {
                stack.push((max_idx, end));
            }
        }
    }

    let retained: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter_map(|(idx, &kept)| kept.then_some(idx))
        .collect();

    tracing::debug!(
        "RDP kept {} of {} points (epsilon={} m, {} iterations)",
        retained.len(),
        n,
        epsilon,
        iterations
    );

    Ok(IndexSet::from_sorted(retained))
}
