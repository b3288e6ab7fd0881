//! Real future trajectories and trail fading
//!
//! Future positions are sampled from tracking data ahead of the playhead and
//! cached on `(frame, interval)`. Trails fade with temporal distance so the
//! upcoming part of a path reads stronger than the far end.

use std::collections::BTreeMap;

use crate::config::constants::{FPS, TRAJECTORY_SAMPLE_RATE};
use crate::domain::Point;

use super::tracking::{Team, TrackingData};

/// A future position with its share of the horizon and its global frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub pos: Point,
    pub progress: f64,
    pub frame: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FutureTrajectories {
    pub home: BTreeMap<String, Vec<TrajectorySample>>,
    pub away: BTreeMap<String, Vec<TrajectorySample>>,
    pub ball: Vec<TrajectorySample>,
}

impl FutureTrajectories {
    pub fn team(&self, team: Team) -> &BTreeMap<String, Vec<TrajectorySample>> {
        match team {
            Team::Home => &self.home,
            Team::Away => &self.away,
        }
    }

    fn team_mut(&mut self, team: Team) -> &mut BTreeMap<String, Vec<TrajectorySample>> {
        match team {
            Team::Home => &mut self.home,
            Team::Away => &mut self.away,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.home.is_empty() && self.away.is_empty() && self.ball.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct TrajectoryCache {
    key: Option<(usize, f64)>,
    trajectories: FutureTrajectories,
}

impl TrajectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Was the last result computed for this frame and interval
    ///
    /// An empty result counts; a window with no samples stays empty until
    /// the key changes.
    pub fn is_cached(&self, frame: usize, interval_secs: f64) -> bool {
        self.key == Some((frame, interval_secs))
    }

    /// Sample real positions from `frame` over the next `interval_secs`
    ///
    /// Every `TRAJECTORY_SAMPLE_RATE`-th frame is kept, up to the last frame
    /// of the data. Missing samples are skipped.
    pub fn calculate_future_trajectories<T: TrackingData + ?Sized>(
        &mut self,
        frame: usize,
        interval_secs: f64,
        tracking: &T,
    ) -> &FutureTrajectories {
        if self.is_cached(frame, interval_secs) {
            return &self.trajectories;
        }

        let future_frames = (interval_secs * FPS).max(0.0) as usize;
        let end_frame = (frame + future_frames).min(tracking.frame_count().saturating_sub(1));
        let horizon = future_frames.max(1) as f64;

        let mut out = FutureTrajectories::default();
        if frame <= end_frame {
            for f in (frame..=end_frame).step_by(TRAJECTORY_SAMPLE_RATE) {
                let (half, idx) = tracking.map_global_frame(f);
                let progress = (f - frame) as f64 / horizon;

                for team in Team::ALL {
                    for id in tracking.roster(team) {
                        let Some(pos) = tracking.player_position(team, id, half, idx) else {
                            continue;
                        };
                        out.team_mut(team)
                            .entry(id.clone())
                            .or_default()
                            .push(TrajectorySample {
                                pos,
                                progress,
                                frame: f,
                            });
                    }
                }

                if let Some(pos) = tracking.ball_position(half, idx) {
                    out.ball.push(TrajectorySample {
                        pos,
                        progress,
                        frame: f,
                    });
                }
            }
        }

        log::trace!(
            "Future trajectories from frame {} to {} ({} ball samples)",
            frame,
            end_frame,
            out.ball.len()
        );
        self.trajectories = out;
        self.key = Some((frame, interval_secs));
        &self.trajectories
    }

    pub fn trajectories(&self) -> &FutureTrajectories {
        &self.trajectories
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.trajectories = FutureTrajectories::default();
    }
}

// ============================================================================
// Fading
// ============================================================================

/// Which trail a segment belongs to; each fades to its own floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailKind {
    RealPlayer,
    RealBall,
    SimulatedPlayer,
    SimulatedBall,
}

impl TrailKind {
    /// Minimum alpha and alpha lost across the full horizon
    fn fade(self) -> (f64, f64) {
        match self {
            TrailKind::RealPlayer => (0.2, 0.8),
            TrailKind::RealBall => (0.3, 0.7),
            TrailKind::SimulatedPlayer => (0.4, 0.6),
            TrailKind::SimulatedBall => (0.5, 0.5),
        }
    }

    /// Alpha when the horizon is empty
    fn fallback_alpha(self) -> f64 {
        match self {
            TrailKind::SimulatedBall => 1.0,
            _ => 0.9,
        }
    }

    /// Alpha for a segment starting at `segment_frame`
    ///
    /// `None` when fading is on and the playhead is already past the segment.
    pub fn segment_alpha(
        self,
        current_frame: usize,
        segment_frame: usize,
        horizon_frames: f64,
        fading: bool,
    ) -> Option<f64> {
        if !fading {
            return Some(1.0);
        }
        if current_frame > segment_frame {
            return None;
        }
        if horizon_frames <= 0.0 {
            return Some(self.fallback_alpha());
        }
        let (floor, slope) = self.fade();
        let distance = (segment_frame - current_frame) as f64 / horizon_frames;
        Some((1.0 - distance * slope).max(floor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::tracking::{FrameSample, Half, MatchTracking};

    fn tracking(frames: usize) -> MatchTracking {
        let mut t = MatchTracking::new(vec!["H1".into()], vec!["A1".into()]);
        for i in 0..frames {
            let x = i as f64;
            t.push_frame(
                Half::First,
                FrameSample {
                    home: vec![Some([x, 0.0])],
                    // Away player drops out on odd frames
                    away: vec![(i % 2 == 0).then_some([0.0, x])],
                    ball: Some([x, x]),
                },
            );
        }
        t
    }

    #[test]
    fn test_samples_every_fifth_frame() {
        let t = tracking(100);
        let mut cache = TrajectoryCache::new();
        let out = cache.calculate_future_trajectories(10, 1.0, &t);
        let home = &out.home["H1"];
        let frames: Vec<usize> = home.iter().map(|s| s.frame).collect();
        assert_eq!(frames, vec![10, 15, 20, 25, 30, 35]);
        assert_eq!(home[2].pos, Point::new(20.0, 0.0));
        assert!((home[5].progress - 1.0).abs() < 1e-9);
        assert_eq!(out.ball.len(), 6);
        // Only even sampled frames had the away player
        let away: Vec<usize> = out.away["A1"].iter().map(|s| s.frame).collect();
        assert_eq!(away, vec![10, 20, 30]);
    }

    #[test]
    fn test_horizon_stops_at_last_frame() {
        let t = tracking(22);
        let mut cache = TrajectoryCache::new();
        let out = cache.calculate_future_trajectories(10, 10.0, &t);
        assert_eq!(out.ball.last().map(|s| s.frame), Some(20));
    }

    #[test]
    fn test_cache_hit_and_invalidation() {
        let t = tracking(100);
        let mut cache = TrajectoryCache::new();
        cache.calculate_future_trajectories(0, 1.0, &t);
        assert!(cache.is_cached(0, 1.0));
        assert!(!cache.is_cached(1, 1.0));
        assert!(!cache.is_cached(0, 2.0));

        // Different data, same key: cached result is returned
        let other = tracking(50);
        let first = cache.calculate_future_trajectories(0, 1.0, &other).clone();
        assert_eq!(&first, cache.trajectories());

        cache.calculate_future_trajectories(5, 1.0, &t);
        assert!(cache.is_cached(5, 1.0));
        cache.clear();
        assert!(!cache.is_cached(5, 1.0));
        assert!(cache.trajectories().is_empty());
    }

    #[test]
    fn test_empty_window_is_cached() {
        let empty = MatchTracking::new(vec!["H1".into()], vec!["A1".into()]);
        let mut cache = TrajectoryCache::new();
        assert!(!cache.is_cached(0, 1.0));
        assert!(cache.calculate_future_trajectories(0, 1.0, &empty).is_empty());
        assert!(cache.is_cached(0, 1.0));

        // Same key: the empty result is reused rather than resampled
        let t = tracking(100);
        assert!(cache.calculate_future_trajectories(0, 1.0, &t).is_empty());
        assert!(!cache.calculate_future_trajectories(1, 1.0, &t).is_empty());
    }

    #[test]
    fn test_fade_floors() {
        let horizon = 100.0;
        assert_eq!(TrailKind::RealPlayer.segment_alpha(0, 0, horizon, true), Some(1.0));
        let far = |kind: TrailKind| kind.segment_alpha(0, 1000, horizon, true).unwrap();
        assert!((far(TrailKind::RealPlayer) - 0.2).abs() < 1e-9);
        assert!((far(TrailKind::RealBall) - 0.3).abs() < 1e-9);
        assert!((far(TrailKind::SimulatedPlayer) - 0.4).abs() < 1e-9);
        assert!((far(TrailKind::SimulatedBall) - 0.5).abs() < 1e-9);

        let half = TrailKind::RealPlayer.segment_alpha(0, 50, horizon, true).unwrap();
        assert!((half - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_passed_segments_and_disabled_fading() {
        assert_eq!(TrailKind::RealBall.segment_alpha(10, 5, 100.0, true), None);
        assert_eq!(TrailKind::RealBall.segment_alpha(10, 5, 100.0, false), Some(1.0));
        assert_eq!(TrailKind::SimulatedPlayer.segment_alpha(0, 5, 0.0, true), Some(0.9));
    }
}
