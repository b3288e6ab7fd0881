//! Tactical simulation driven by drawn arrows
//!
//! Arrows associated with a player become [`TacticalArrow`]s whose line
//! style decides the action (pass, run or dribble). From those the engine
//! projects player and ball positions over a time window, frame by frame.

use std::collections::{BTreeMap, HashMap};

use crate::config::ScaleConfig;
use crate::config::constants::FPS;
use crate::domain::{Arrow, ArrowStyle, Point, ShapeId, ShapeOps, polyline_length};

use super::tracking::{Team, TrackingData};

/// Speed limits in metres per second
pub mod speed {
    /// Fast run
    pub const RUN_MAX: f64 = 8.0;
    pub const DRIBBLE_MAX: f64 = 4.0;
    /// Ball speed bounds for a pass, adapted to its length
    pub const PASS_MIN: f64 = 15.0;
    pub const PASS_MAX: f64 = 25.0;
    /// A pass never takes more than this share of the window
    pub const PASS_MAX_WINDOW_SHARE: f64 = 0.8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    Pass,
    Run,
    Dribble,
}

/// Line style to tactical action
const ACTION_BY_STYLE: [(ArrowStyle, ActionType); 3] = [
    (ArrowStyle::Solid, ActionType::Pass),
    (ArrowStyle::Dotted, ActionType::Run),
    (ArrowStyle::Zigzag, ActionType::Dribble),
];

impl ActionType {
    pub fn from_style(style: ArrowStyle) -> ActionType {
        ACTION_BY_STYLE
            .iter()
            .find(|(s, _)| *s == style)
            .map_or(ActionType::Pass, |(_, action)| *action)
    }

    /// Player speed cap; passers don't move along their arrow
    pub fn max_speed(self) -> Option<f64> {
        match self {
            ActionType::Pass => None,
            ActionType::Run => Some(speed::RUN_MAX),
            ActionType::Dribble => Some(speed::DRIBBLE_MAX),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Pass => "pass",
            ActionType::Run => "run",
            ActionType::Dribble => "dribble",
        }
    }
}

// ============================================================================
// Association records
// ============================================================================

/// An arrow bound to a player, with its inferred action
#[derive(Debug, Clone, PartialEq)]
pub struct TacticalArrow {
    pub arrow: ShapeId,
    pub player_id: String,
    pub action: ActionType,
    pub start: Point,
    pub end: Point,
    /// Polyline length of the arrow
    pub length: f64,
    pub associated_frame: usize,
    /// Receiving player, passes only
    pub receiver_id: Option<String>,
}

impl TacticalArrow {
    pub fn from_arrow(arrow: &Arrow, player_id: &str, frame: usize) -> Self {
        Self {
            arrow: arrow.id(),
            player_id: player_id.to_string(),
            action: ActionType::from_style(arrow.style()),
            start: arrow.start(),
            end: arrow.end(),
            length: polyline_length(arrow.points()),
            associated_frame: frame,
            receiver_id: None,
        }
    }

    pub fn is_pending_pass(&self) -> bool {
        self.action == ActionType::Pass && self.receiver_id.is_none()
    }

    /// Fraction of the arrow covered at `progress` of an `interval_secs` window
    ///
    /// Capped actions that would need more than their top speed only cover
    /// what that speed allows.
    pub fn actual_progress(&self, progress: f64, interval_secs: f64) -> f64 {
        let Some(max_speed) = self.action.max_speed() else {
            return 0.0;
        };
        if self.length <= f64::EPSILON || interval_secs <= 0.0 {
            return progress;
        }
        let required = self.length / interval_secs;
        if required > max_speed {
            (max_speed * interval_secs * progress / self.length).min(1.0)
        } else {
            progress
        }
    }

    /// Simulated player position along the straight start-to-end line
    pub fn position_at(&self, progress: f64, interval_secs: f64) -> Point {
        self.start
            .lerp(self.end, self.actual_progress(progress, interval_secs))
    }
}

/// One resolved pass in the possession chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PossessionLink {
    pub from_player: String,
    pub to_player: String,
    pub arrow: ShapeId,
}

/// Result of associating an arrow with a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationOutcome {
    /// A pass that still needs a receiver
    WaitingForReceiver,
    Associated,
}

/// What the UI should ask after an arrow is committed
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationPrompt {
    pub arrow: ShapeId,
    pub action: ActionType,
    pub needs_from: bool,
    pub needs_to: bool,
    /// Nearest player to the arrow start, for pre-filling the prompt
    pub suggested_from: Option<String>,
    /// Nearest player to the arrow end, passes only
    pub suggested_to: Option<String>,
}

// ============================================================================
// Simulated output
// ============================================================================

/// A simulated position tagged with its global frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedSample {
    pub pos: Point,
    pub frame: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulatedTrajectories {
    /// Only players driven by an arrow appear here
    pub players: BTreeMap<String, Vec<SimulatedSample>>,
    pub ball: Vec<SimulatedSample>,
}

impl SimulatedTrajectories {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.ball.is_empty()
    }

    fn clear(&mut self) {
        self.players.clear();
        self.ball.clear();
    }
}

/// Ball flight for a pass inside a simulation window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassFlight {
    /// Share of the window spent with the ball in the air
    pub window_ratio: f64,
}

impl PassFlight {
    pub fn new(length: f64, interval_secs: f64) -> Self {
        let pass_speed = (length / 2.0).clamp(speed::PASS_MIN, speed::PASS_MAX);
        let duration = length / pass_speed;
        let window_ratio = if interval_secs > 0.0 {
            (duration / interval_secs).min(speed::PASS_MAX_WINDOW_SHARE)
        } else {
            0.0
        };
        Self { window_ratio }
    }

    /// Ball between passer and receiver, or with the receiver once arrived
    pub fn ball_at(&self, passer: Point, receiver: Point, progress: f64) -> Point {
        if self.window_ratio > 0.0 && progress <= self.window_ratio {
            passer.lerp(receiver, progress / self.window_ratio)
        } else {
            receiver
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct TacticalSimulation {
    scale: ScaleConfig,
    tactical_arrows: Vec<TacticalArrow>,
    possession_chain: Vec<PossessionLink>,
    player_associations: HashMap<ShapeId, String>,
    pass_receivers: HashMap<ShapeId, String>,
    simulated: SimulatedTrajectories,
}

impl TacticalSimulation {
    pub fn new(scale: ScaleConfig) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    /// Bind an arrow to the player performing it
    ///
    /// Re-associating an arrow replaces its previous record.
    pub fn associate_arrow_with_player(
        &mut self,
        arrow: &Arrow,
        player_id: &str,
        frame: usize,
    ) -> AssociationOutcome {
        self.remove_arrow_association(arrow.id());
        let tactical = TacticalArrow::from_arrow(arrow, player_id, frame);
        log::info!(
            "Arrow {} associated with {} as {}",
            arrow.id(),
            player_id,
            tactical.action.as_str()
        );
        self.player_associations
            .insert(arrow.id(), player_id.to_string());
        let outcome = if tactical.action == ActionType::Pass {
            AssociationOutcome::WaitingForReceiver
        } else {
            AssociationOutcome::Associated
        };
        self.tactical_arrows.push(tactical);
        outcome
    }

    /// Give the most recent pass still lacking one a receiver
    ///
    /// Returns `false` when no pass is pending.
    pub fn set_pass_receiver(&mut self, receiver_id: &str) -> bool {
        let Some(pass) = self
            .tactical_arrows
            .iter_mut()
            .rev()
            .find(|ta| ta.is_pending_pass())
        else {
            log::debug!("No pending pass for receiver {}", receiver_id);
            return false;
        };
        pass.receiver_id = Some(receiver_id.to_string());
        self.pass_receivers
            .insert(pass.arrow, receiver_id.to_string());
        self.possession_chain.push(PossessionLink {
            from_player: pass.player_id.clone(),
            to_player: receiver_id.to_string(),
            arrow: pass.arrow,
        });
        log::info!("Pass {} from {} to {}", pass.arrow, pass.player_id, receiver_id);
        true
    }

    /// Forget everything recorded about an arrow
    pub fn remove_arrow_association(&mut self, arrow: ShapeId) -> bool {
        let before = self.tactical_arrows.len();
        self.tactical_arrows.retain(|ta| ta.arrow != arrow);
        let removed = self.tactical_arrows.len() != before;
        self.player_associations.remove(&arrow);
        self.pass_receivers.remove(&arrow);
        self.possession_chain.retain(|link| link.arrow != arrow);
        if removed {
            log::debug!("Removed association of arrow {}", arrow);
        }
        removed
    }

    pub fn get_associated_arrows(&self) -> &[TacticalArrow] {
        &self.tactical_arrows
    }

    /// Arrows from `arrows` that no player is bound to
    pub fn get_non_associated_arrows<'a>(&self, arrows: &'a [Arrow]) -> Vec<&'a Arrow> {
        arrows
            .iter()
            .filter(|a| !self.player_associations.contains_key(&a.id()))
            .collect()
    }

    pub fn is_associated(&self, arrow: ShapeId) -> bool {
        self.player_associations.contains_key(&arrow)
    }

    /// Player bound to an arrow
    pub fn player_for(&self, arrow: ShapeId) -> Option<&str> {
        self.player_associations.get(&arrow).map(String::as_str)
    }

    /// Receiver assigned to a pass arrow
    pub fn receiver_for(&self, arrow: ShapeId) -> Option<&str> {
        self.pass_receivers.get(&arrow).map(String::as_str)
    }

    pub fn possession_chain(&self) -> &[PossessionLink] {
        &self.possession_chain
    }

    pub fn clear_tactical_data(&mut self) {
        self.tactical_arrows.clear();
        self.possession_chain.clear();
        self.player_associations.clear();
        self.pass_receivers.clear();
        self.simulated.clear();
    }

    /// Output of the last simulation run
    pub fn get_simulated_trajectories(&self) -> &SimulatedTrajectories {
        &self.simulated
    }

    /// Nearest tracked player within `max_distance` of `pos`
    ///
    /// Defaults to one player radius. Ties keep the first player found,
    /// home side first, roster order within a side.
    pub fn find_player_at_position<T: TrackingData + ?Sized>(
        &self,
        pos: Point,
        frame: usize,
        tracking: &T,
        max_distance: Option<f64>,
    ) -> Option<String> {
        let max_distance =
            max_distance.unwrap_or_else(|| self.scale.tactical_arrow_detection_radius());
        nearest_player(pos, frame, tracking, max_distance)
    }

    /// Prompt to show after an arrow is committed in simulation mode
    pub fn association_prompt<T: TrackingData + ?Sized>(
        &self,
        arrow: &Arrow,
        frame: usize,
        tracking: &T,
    ) -> AssociationPrompt {
        let action = ActionType::from_style(arrow.style());
        let needs_to = action == ActionType::Pass;
        AssociationPrompt {
            arrow: arrow.id(),
            action,
            needs_from: true,
            needs_to,
            suggested_from: self.find_player_at_position(arrow.start(), frame, tracking, None),
            suggested_to: needs_to
                .then(|| self.find_player_at_position(arrow.end(), frame, tracking, None))
                .flatten(),
        }
    }

    /// Project positions over `interval_secs` starting at `start_frame`
    ///
    /// Samples `interval_secs × FPS` frames. Every associated player gets one
    /// sample per frame (the latest arrow wins when a player has several).
    /// The ball starts with the player nearest to it; only the first pass
    /// hands it on.
    pub fn calculate_simulated_trajectories<T: TrackingData + ?Sized>(
        &mut self,
        interval_secs: f64,
        start_frame: usize,
        tracking: &T,
    ) -> &SimulatedTrajectories {
        self.simulated.clear();
        if self.tactical_arrows.is_empty() {
            return &self.simulated;
        }

        let total_frames = (interval_secs * FPS).max(0.0) as usize;
        let denom = total_frames.saturating_sub(1).max(1) as f64;

        for k in 0..total_frames {
            let progress = k as f64 / denom;
            let frame = start_frame + k;
            for ta in &self.tactical_arrows {
                let sample = SimulatedSample {
                    pos: ta.position_at(progress, interval_secs),
                    frame,
                };
                let samples = self.simulated.players.entry(ta.player_id.clone()).or_default();
                match samples.last_mut() {
                    Some(last) if last.frame == frame => *last = sample,
                    _ => samples.push(sample),
                }
            }
        }

        self.simulate_ball(interval_secs, total_frames, start_frame, tracking);
        log::debug!(
            "Simulated {} frames for {} players, {} ball samples",
            total_frames,
            self.simulated.players.len(),
            self.simulated.ball.len()
        );
        &self.simulated
    }

    fn simulate_ball<T: TrackingData + ?Sized>(
        &mut self,
        interval_secs: f64,
        total_frames: usize,
        start_frame: usize,
        tracking: &T,
    ) {
        let Some(ball_start) = tracking.real_ball_position(start_frame) else {
            log::debug!("No ball position at frame {}", start_frame);
            return;
        };
        let Some(holder) = nearest_player(ball_start, start_frame, tracking, f64::INFINITY) else {
            return;
        };
        let denom = total_frames.saturating_sub(1).max(1) as f64;
        let first_pass = self
            .tactical_arrows
            .iter()
            .find(|ta| ta.action == ActionType::Pass);

        let mut ball = Vec::with_capacity(total_frames);
        for k in 0..total_frames {
            let progress = k as f64 / denom;
            let pos = match first_pass {
                None => self
                    .simulated_sample(&holder, k)
                    .unwrap_or(ball_start),
                Some(pass) => match &pass.receiver_id {
                    None => ball_start,
                    Some(receiver) => {
                        let passer = pass.position_at(progress, interval_secs);
                        let receiver_pos = self
                            .simulated_sample(receiver, k)
                            .or_else(|| {
                                let offset = (progress * interval_secs * FPS) as usize;
                                tracking.real_player_position(receiver, start_frame + offset)
                            })
                            .unwrap_or(passer);
                        PassFlight::new(pass.length, interval_secs).ball_at(
                            passer,
                            receiver_pos,
                            progress,
                        )
                    }
                },
            };
            ball.push(SimulatedSample {
                pos,
                frame: start_frame + k,
            });
        }
        self.simulated.ball = ball;
    }

    fn simulated_sample(&self, player_id: &str, k: usize) -> Option<Point> {
        self.simulated
            .players
            .get(player_id)
            .and_then(|samples| samples.get(k))
            .map(|s| s.pos)
    }
}

/// Nearest player strictly closer than any earlier one and within `max_distance`
fn nearest_player<T: TrackingData + ?Sized>(
    pos: Point,
    frame: usize,
    tracking: &T,
    max_distance: f64,
) -> Option<String> {
    let (half, idx) = tracking.map_global_frame(frame);
    let mut best: Option<(f64, &str)> = None;
    for team in Team::ALL {
        for id in tracking.roster(team) {
            let Some(p) = tracking.player_position(team, id, half, idx) else {
                continue;
            };
            let d = p.distance_to(pos);
            if d <= max_distance && best.is_none_or(|(min, _)| d < min) {
                best = Some((d, id));
            }
        }
    }
    best.map(|(_, id)| id.to_string())
}
