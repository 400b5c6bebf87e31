//! Gaussian batch scheduler
//!
//! A rearrange empties the wall and lets the items fall back in over time.
//! The shuffled items are cut into segments whose sizes follow a Gaussian
//! centred on the middle segment, so the release starts as a trickle, peaks,
//! and tails off. Empty segments are skipped.

use crate::item::Item;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Normalised Gaussian weights for `segments` buckets centred on the middle one
pub fn gaussian_weights(segments: usize, sigma: f64) -> Vec<f64> {
    let n = segments.max(1);
    let mean = (n as f64 - 1.0) / 2.0;
    let weights: Vec<f64> = (0..n)
        .map(|i| {
            let d = i as f64 - mean;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return vec![1.0 / n as f64; n];
    }
    weights.into_iter().map(|w| w / total).collect()
}

/// Segment sizes that sum to exactly `total`.
///
/// Rounded shares are corrected one unit at a time, cycling from the first
/// segment; decrements skip empty segments.
pub fn segment_sizes(total: usize, segments: usize, sigma: f64) -> Vec<usize> {
    let mut sizes: Vec<usize> = gaussian_weights(segments, sigma)
        .into_iter()
        .map(|w| (w * total as f64).round() as usize)
        .collect();

    let mut adjustment = total as i64 - sizes.iter().sum::<usize>() as i64;
    let mut i = 0;
    while adjustment != 0 {
        if adjustment > 0 {
            sizes[i] += 1;
            adjustment -= 1;
        } else if sizes[i] > 0 {
            sizes[i] -= 1;
            adjustment += 1;
        }
        i = (i + 1) % sizes.len();
    }
    sizes
}

/// Cut `items` into consecutive segments, empty ones included
pub fn partition<T>(items: Vec<T>, segments: usize, sigma: f64) -> Vec<Vec<T>> {
    let sizes = segment_sizes(items.len(), segments, sigma);
    let mut rest = items.into_iter();
    sizes
        .into_iter()
        .map(|size| rest.by_ref().take(size).collect())
        .collect()
}

/// Pending batches of one rearrange
#[derive(Debug, Clone)]
pub struct ReleaseSchedule {
    pub id: u64,
    batches: VecDeque<Vec<Item>>,
}

impl ReleaseSchedule {
    pub fn pop_batch(&mut self) -> Option<Vec<Item>> {
        self.batches.pop_front()
    }

    pub fn remaining_batches(&self) -> usize {
        self.batches.len()
    }

    pub fn remaining_items(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    pub fn is_drained(&self) -> bool {
        self.batches.is_empty()
    }

    /// Sizes of the remaining batches in release order
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.iter().map(Vec::len).collect()
    }

    /// Items not yet released, in release order
    pub fn into_items(self) -> Vec<Item> {
        self.batches.into_iter().flatten().collect()
    }
}

/// Plans rearranges and tracks the one currently draining
#[derive(Debug)]
pub struct BatchScheduler {
    segments: usize,
    sigma: f64,
    next_id: u64,
    active: Option<ReleaseSchedule>,
}

impl BatchScheduler {
    pub fn new(segments: usize, sigma: f64) -> Self {
        Self {
            segments: segments.max(1),
            sigma,
            next_id: 1,
            active: None,
        }
    }

    /// Shuffle and partition `items` into a new schedule with a fresh id
    pub fn plan<R: Rng + ?Sized>(&mut self, mut items: Vec<Item>, rng: &mut R) -> ReleaseSchedule {
        items.shuffle(rng);
        let batches = partition(items, self.segments, self.sigma)
            .into_iter()
            .filter(|batch| !batch.is_empty())
            .collect();

        let id = self.next_id;
        self.next_id += 1;
        ReleaseSchedule { id, batches }
    }

    /// Make `schedule` the draining one, dropping any previous schedule
    pub fn activate(&mut self, schedule: ReleaseSchedule) {
        if let Some(old) = self.active.replace(schedule) {
            log::debug!("Schedule {} superseded with {} items pending", old.id, old.remaining_items());
        }
    }

    pub fn active(&self) -> Option<&ReleaseSchedule> {
        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<u64> {
        self.active.as_ref().map(|s| s.id)
    }

    /// Next batch of schedule `id`, or `None` when `id` is no longer active.
    /// The schedule is retired once its last batch is handed out.
    pub fn next_batch(&mut self, id: u64) -> Option<Vec<Item>> {
        let schedule = self.active.as_mut().filter(|s| s.id == id)?;
        let batch = schedule.pop_batch();
        if schedule.is_drained() {
            self.active = None;
        }
        batch
    }

    /// Drop the draining schedule, if any
    pub fn cancel(&mut self) -> Option<ReleaseSchedule> {
        let cancelled = self.active.take();
        if let Some(schedule) = &cancelled {
            log::debug!(
                "Cancelled schedule {} with {} items pending",
                schedule.id,
                schedule.remaining_items()
            );
        }
        cancelled
    }
}
