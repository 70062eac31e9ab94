//! Trajectory buffer.
//!
//! A fixed-length run of evenly spaced samples: recorded past, the current
//! sample, then predicted future. Positions are relative to the character's
//! current world position; facings are world yaw in degrees.
//!
//! The buffer is sized once and never reallocated while ticking.

use std::collections::VecDeque;

use locomotion_shared::{
    animation::TrajectoryPoint,
    math::{lerp_angle, wrap_degrees, Vec3},
};
use rayon::prelude::*;

pub struct TrajectoryBuffer {
    points: Vec<TrajectoryPoint>,
    current_index: usize,
    sample_rate: f32,
    /// World-space history, oldest first.
    history: VecDeque<TrajectoryPoint>,
    record_elapsed: f32,
}

impl TrajectoryBuffer {
    pub fn new(past_samples: usize, future_samples: usize, sample_rate: f32) -> Self {
        let future_samples = future_samples.max(1);
        Self {
            points: vec![TrajectoryPoint::default(); past_samples + 1 + future_samples],
            current_index: past_samples,
            sample_rate,
            history: VecDeque::with_capacity(past_samples + 1),
            record_elapsed: 0.0,
        }
    }

    /// Sizes a buffer to cover every requested time (seconds, negative = past).
    pub fn for_prediction_times(times: &[f32], sample_rate: f32) -> Self {
        let past = times.iter().copied().filter(|t| *t < 0.0).fold(0.0f32, |a, t| a.max(-t));
        let future = times.iter().copied().fold(0.0f32, f32::max);
        Self::new(
            (past * sample_rate).ceil() as usize,
            (future * sample_rate).ceil() as usize,
            sample_rate,
        )
    }

    /// Total number of samples (`trajectory_iterations`).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn past_len(&self) -> usize {
        self.current_index
    }

    pub fn future_len(&self) -> usize {
        self.points.len() - self.current_index - 1
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn past(&self) -> &[TrajectoryPoint] {
        &self.points[..self.current_index]
    }

    pub fn current(&self) -> TrajectoryPoint {
        self.points[self.current_index]
    }

    pub fn future(&self) -> &[TrajectoryPoint] {
        &self.points[self.current_index + 1..]
    }

    /// Whether the buffer can serve `times` without resizing.
    pub fn covers(&self, times: &[f32]) -> bool {
        times.iter().all(|t| {
            let steps = (t.abs() * self.sample_rate).ceil() as usize;
            if *t < 0.0 {
                steps <= self.past_len()
            } else {
                steps <= self.future_len()
            }
        })
    }

    /// Records the character's world pose and refreshes the past samples.
    ///
    /// A new history sample is taken every `1 / sample_rate` seconds; past
    /// slots are re-expressed relative to `position` on every call.
    pub fn record_past(&mut self, dt: f32, position: Vec3, facing: f32) {
        let interval = 1.0 / self.sample_rate;
        self.record_elapsed += dt;
        while self.record_elapsed >= interval {
            self.record_elapsed -= interval;
            self.history.push_back(TrajectoryPoint::new(position, facing));
            while self.history.len() > self.past_len() {
                self.history.pop_front();
            }
        }

        let current = self.current_index;
        let oldest = self.history.front().copied();
        for k in 1..=current {
            let sample = self
                .history
                .len()
                .checked_sub(k)
                .and_then(|i| self.history.get(i).copied())
                .or(oldest)
                .unwrap_or(TrajectoryPoint::new(position, facing));
            self.points[current - k] =
                TrajectoryPoint::new(sample.position - position, sample.facing);
        }
        self.points[current] = TrajectoryPoint::new(Vec3::ZERO, facing);
    }

    /// Relaxes every future sample towards its target.
    ///
    /// Sample `k` steps ahead of current is pulled towards
    /// `displacement * k` and `orientation` by `1 - e^(-rate * k / future_len)`.
    /// Samples are independent, so the update runs as a parallel map; it
    /// has completed when this returns.
    pub fn relax_future(&mut self, displacement: Vec3, orientation: f32, move_rate: f32, turn_rate: f32) {
        let future_len = self.future_len() as f32;
        self.points[self.current_index + 1..]
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, point)| {
                let steps = (i + 1) as f32;
                let pct = steps / future_len;
                let target = displacement * steps;
                let move_t = 1.0 - (-move_rate * pct).exp();
                let turn_t = 1.0 - (-turn_rate * pct).exp();
                point.position += (target - point.position) * move_t;
                point.facing = wrap_degrees(lerp_angle(point.facing, orientation, turn_t));
            });
    }

    /// Stomps all samples to the origin with the given facing.
    pub fn reset(&mut self, facing: f32) {
        self.points
            .iter_mut()
            .for_each(|p| *p = TrajectoryPoint::new(Vec3::ZERO, facing));
        self.history.clear();
        self.record_elapsed = 0.0;
    }

    /// Samples the trajectory at `time` seconds from now (negative = past).
    pub fn sample(&self, time: f32) -> TrajectoryPoint {
        let last = (self.points.len() - 1) as f32;
        let index = (self.current_index as f32 + time * self.sample_rate).clamp(0.0, last);
        let lo = index.floor() as usize;
        let hi = index.ceil() as usize;
        let t = index - lo as f32;
        let a = self.points[lo];
        let b = self.points[hi];
        TrajectoryPoint::new(a.position.lerp(b.position, t), lerp_angle(a.facing, b.facing, t))
    }

    /// Fills `out` with samples at each of `times`, reusing its allocation.
    pub fn extract(&self, times: &[f32], out: &mut Vec<TrajectoryPoint>) {
        out.clear();
        out.extend(times.iter().map(|t| self.sample(*t)));
    }
}
