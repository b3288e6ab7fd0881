//! Tracking data access
//!
//! The simulation reads player and ball positions through [`TrackingData`];
//! [`MatchTracking`] is the in-memory implementation loaded from scenario
//! files. Missing samples surface as `None`, never as NaN.

use serde::{Deserialize, Serialize};

use crate::domain::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Home,
    Away,
}

impl Team {
    /// Lookup order used for every nearest-player search
    pub const ALL: [Team; 2] = [Team::Home, Team::Away];

    pub fn as_str(self) -> &'static str {
        match self {
            Team::Home => "Home",
            Team::Away => "Away",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Half {
    First,
    Second,
}

/// Per-frame position queries against recorded match data
pub trait TrackingData {
    /// Ordered player ids for one side, stable for the session
    fn roster(&self, team: Team) -> &[String];

    /// Number of global frames across both halves
    fn frame_count(&self) -> usize;

    /// Split a global frame index into half and half-relative index
    fn map_global_frame(&self, frame: usize) -> (Half, usize);

    fn player_position(&self, team: Team, player_id: &str, half: Half, idx: usize)
    -> Option<Point>;

    fn ball_position(&self, half: Half, idx: usize) -> Option<Point>;

    /// Side a player belongs to
    fn team_of(&self, player_id: &str) -> Option<Team> {
        Team::ALL
            .into_iter()
            .find(|team| self.roster(*team).iter().any(|id| id == player_id))
    }

    /// Real position of a player at a global frame
    fn real_player_position(&self, player_id: &str, frame: usize) -> Option<Point> {
        let team = self.team_of(player_id)?;
        let (half, idx) = self.map_global_frame(frame);
        self.player_position(team, player_id, half, idx)
    }

    /// Real ball position at a global frame
    fn real_ball_position(&self, frame: usize) -> Option<Point> {
        let (half, idx) = self.map_global_frame(frame);
        self.ball_position(half, idx)
    }
}

// ============================================================================
// In-memory tracking
// ============================================================================

/// Positions recorded at one frame
///
/// Player slots follow roster order; `null` marks a missing sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSample {
    pub home: Vec<Option<[f64; 2]>>,
    pub away: Vec<Option<[f64; 2]>>,
    pub ball: Option<[f64; 2]>,
}

impl FrameSample {
    fn side(&self, team: Team) -> &[Option<[f64; 2]>] {
        match team {
            Team::Home => &self.home,
            Team::Away => &self.away,
        }
    }
}

/// Tracking data for a whole match, split by half
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTracking {
    pub home: Vec<String>,
    pub away: Vec<String>,
    pub first_half: Vec<FrameSample>,
    pub second_half: Vec<FrameSample>,
}

impl MatchTracking {
    pub fn new(home: Vec<String>, away: Vec<String>) -> Self {
        Self {
            home,
            away,
            ..Self::default()
        }
    }

    /// Append a frame to the given half
    pub fn push_frame(&mut self, half: Half, sample: FrameSample) {
        match half {
            Half::First => self.first_half.push(sample),
            Half::Second => self.second_half.push(sample),
        }
    }

    fn frames(&self, half: Half) -> &[FrameSample] {
        match half {
            Half::First => &self.first_half,
            Half::Second => &self.second_half,
        }
    }

    fn sample(&self, half: Half, idx: usize) -> Option<&FrameSample> {
        self.frames(half).get(idx)
    }
}

impl TrackingData for MatchTracking {
    fn roster(&self, team: Team) -> &[String] {
        match team {
            Team::Home => &self.home,
            Team::Away => &self.away,
        }
    }

    fn frame_count(&self) -> usize {
        self.first_half.len() + self.second_half.len()
    }

    fn map_global_frame(&self, frame: usize) -> (Half, usize) {
        let first = self.first_half.len();
        if frame < first {
            (Half::First, frame)
        } else {
            (Half::Second, frame - first)
        }
    }

    fn player_position(
        &self,
        team: Team,
        player_id: &str,
        half: Half,
        idx: usize,
    ) -> Option<Point> {
        let slot = self.roster(team).iter().position(|id| id == player_id)?;
        let xy = (*self.sample(half, idx)?.side(team).get(slot)?)?;
        Point::from_xy(xy)
    }

    fn ball_position(&self, half: Half, idx: usize) -> Option<Point> {
        Point::from_xy(self.sample(half, idx)?.ball?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracking() -> MatchTracking {
        let mut t = MatchTracking::new(vec!["H1".into(), "H2".into()], vec!["A1".into()]);
        t.push_frame(
            Half::First,
            FrameSample {
                home: vec![Some([1.0, 2.0]), None],
                away: vec![Some([5.0, 5.0])],
                ball: Some([1.5, 2.0]),
            },
        );
        t.push_frame(
            Half::Second,
            FrameSample {
                home: vec![Some([3.0, 4.0]), Some([0.0, 0.0])],
                away: vec![],
                ball: None,
            },
        );
        t
    }

    #[test]
    fn test_global_frame_mapping() {
        let t = tracking();
        assert_eq!(t.frame_count(), 2);
        assert_eq!(t.map_global_frame(0), (Half::First, 0));
        assert_eq!(t.map_global_frame(1), (Half::Second, 0));
        assert_eq!(t.map_global_frame(7), (Half::Second, 6));
    }

    #[test]
    fn test_missing_samples_are_none() {
        let t = tracking();
        assert_eq!(t.real_player_position("H1", 0), Some(Point::new(1.0, 2.0)));
        assert_eq!(t.real_player_position("H2", 0), None);
        assert_eq!(t.real_player_position("A1", 1), None);
        assert_eq!(t.real_player_position("nobody", 0), None);
        assert_eq!(t.real_player_position("H1", 99), None);
        assert_eq!(t.real_ball_position(1), None);
        assert_eq!(t.real_ball_position(0), Some(Point::new(1.5, 2.0)));
    }

    #[test]
    fn test_team_lookup() {
        let t = tracking();
        assert_eq!(t.team_of("H2"), Some(Team::Home));
        assert_eq!(t.team_of("A1"), Some(Team::Away));
        assert_eq!(t.team_of("X"), None);
    }

    #[test]
    fn test_deserialize_with_nulls() {
        let json = r#"{
            "home": ["H1"],
            "away": ["A1"],
            "first_half": [{"home": [[1.0, 1.0]], "away": [null], "ball": [0.0, 0.0]}]
        }"#;
        let t: MatchTracking = serde_json::from_str(json).unwrap();
        assert_eq!(t.real_player_position("H1", 0), Some(Point::new(1.0, 1.0)));
        assert_eq!(t.real_player_position("A1", 0), None);
        assert!(t.second_half.is_empty());
    }
}
