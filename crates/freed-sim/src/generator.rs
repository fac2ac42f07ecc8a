//! ---
//! freed_section: "11-simulation"
//! freed_subsection: "module"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Deterministic pose sample streams for motion patterns."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::iter::FusedIterator;
use std::time::Duration;

use freed_common::time::offset_for_index;
use freed_proto::Pose;
use serde::Serialize;

use crate::pattern::PatternSpec;

/// One generated pose and when it is due, relative to the stream start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoseSample {
    pub sequence: u64,
    pub offset: Duration,
    pub pose: Pose,
}

/// Produces sample streams for a validated [`PatternSpec`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionGenerator {
    spec: PatternSpec,
}

impl MotionGenerator {
    pub fn new(spec: PatternSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &PatternSpec {
        &self.spec
    }

    /// Samples of one pass, starting at sequence zero.
    pub fn samples(&self) -> PatternSamples {
        self.cycle(0)
    }

    /// Samples of pass number `cycle`. Sequences and offsets continue from
    /// the previous passes so repeated cycles form one seamless stream.
    pub fn cycle(&self, cycle: u64) -> PatternSamples {
        let len = self.spec.sample_count();
        PatternSamples {
            spec: self.spec,
            base: cycle.saturating_mul(len),
            index: 0,
            len,
        }
    }

    /// Wall-clock length of one pass at the pattern's rate.
    pub fn cycle_length(&self) -> Duration {
        offset_for_index(self.spec.sample_count(), self.spec.rate_hz())
    }
}

/// Generate one pass of `spec`.
pub fn generate(spec: &PatternSpec) -> PatternSamples {
    MotionGenerator::new(*spec).samples()
}

/// Lazy, finite iterator over one pattern pass.
///
/// Cloning yields an independent iterator at the same position; sample `i`
/// depends only on the pattern and `i`.
#[derive(Debug, Clone)]
pub struct PatternSamples {
    spec: PatternSpec,
    base: u64,
    index: u64,
    len: u64,
}

impl PatternSamples {
    /// Rewind to the first sample of this pass.
    pub fn restart(&mut self) {
        self.index = 0;
    }

    fn sample(&self, index: u64) -> PoseSample {
        let sequence = self.base + index;
        PoseSample {
            sequence,
            offset: offset_for_index(sequence, self.spec.rate_hz()),
            pose: self.spec.pose_at(self.spec.phase_of(index)),
        }
    }
}

impl Iterator for PatternSamples {
    type Item = PoseSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.len {
            return None;
        }
        let sample = self.sample(self.index);
        self.index += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.len - self.index).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.index = self.index.saturating_add(n as u64).min(self.len);
        self.next()
    }
}

impl ExactSizeIterator for PatternSamples {}

impl FusedIterator for PatternSamples {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{OrientationMode, PatternKind};
    use std::f64::consts::TAU;

    fn circle(duration_ms: u64, rate: f64) -> PatternSpec {
        PatternSpec::builder(PatternKind::Circle)
            .duration(Duration::from_millis(duration_ms))
            .rate_hz(rate)
            .build()
            .unwrap()
    }

    #[test]
    fn one_second_at_thirty_hz_yields_thirty_samples() {
        let samples = generate(&circle(1_000, 30.0));
        assert_eq!(samples.len(), 30);
        let collected: Vec<_> = samples.collect();
        assert_eq!(collected.len(), 30);
        for (i, sample) in collected.iter().enumerate() {
            assert_eq!(sample.sequence, i as u64);
            let expected = Duration::from_secs_f64(i as f64 / 30.0);
            assert_eq!(sample.offset, expected);
        }
    }

    #[test]
    fn identical_specs_generate_identical_streams() {
        for kind in [PatternKind::Circle, PatternKind::Figure8, PatternKind::Oscillate] {
            let spec = PatternSpec::builder(kind)
                .orientation(OrientationMode::Center)
                .build()
                .unwrap();
            let first: Vec<_> = generate(&spec).collect();
            let second: Vec<_> = generate(&spec).collect();
            assert_eq!(first, second, "{kind}");
        }
    }

    #[test]
    fn restart_and_clone_replay_the_pass() {
        let mut samples = generate(&circle(500, 20.0));
        let snapshot = samples.clone();
        let first: Vec<_> = samples.by_ref().collect();
        assert_eq!(samples.len(), 0);
        samples.restart();
        let again: Vec<_> = samples.collect();
        assert_eq!(first, again);
        assert_eq!(first, snapshot.collect::<Vec<_>>());
    }

    #[test]
    fn circle_closes_after_one_revolution() {
        let spec = circle(1_000, 30.0);
        let samples: Vec<_> = generate(&spec).collect();
        let first = samples[0].pose;
        let last = samples[samples.len() - 1].pose;
        let closing = spec.pose_at(TAU);
        assert!(first.distance_to(&closing) < 1.0e-6);
        // The last sample is one step short of closing the loop.
        let step = samples[0].pose.distance_to(&samples[1].pose);
        assert!((last.distance_to(&first) - step).abs() < 1.0e-6);
    }

    #[test]
    fn later_cycles_continue_the_sequence() {
        let generator = MotionGenerator::new(circle(1_000, 10.0));
        let second: Vec<_> = generator.cycle(1).collect();
        assert_eq!(second[0].sequence, 10);
        assert_eq!(second[0].offset, Duration::from_secs(1));
        assert_eq!(second[0].pose, generator.samples().next().unwrap().pose);
        assert_eq!(generator.cycle_length(), Duration::from_secs(1));
    }

    #[test]
    fn nth_skips_and_stays_exact() {
        let mut samples = generate(&circle(1_000, 30.0));
        let tenth = samples.nth(9).unwrap();
        assert_eq!(tenth.sequence, 9);
        assert_eq!(samples.len(), 20);
        assert!(samples.nth(100).is_none());
        assert_eq!(samples.len(), 0);
    }
}
