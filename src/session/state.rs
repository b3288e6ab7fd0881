//! Tactics session state
//!
//! A [`Session`] ties the annotation board to tracking data and the
//! tactical engine: it follows up on board events (association prompts,
//! cleanup on delete), runs the simulation and renders the result.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::annotations::{Board, BoardEvent, BoardMsg, handle_board_msg};
use crate::config::{ScaleConfig, ShapeColor, TactiboardConfig};
use crate::config::constants::FPS;
use crate::domain::{Rect, ShapeId, ShapeKind};
use crate::render::image::{
    PlayerMarker, TrailStyle, View, draw_board_on_image, draw_future_trajectories, draw_pitch,
    draw_players, draw_simulated_trajectories,
};
use crate::simulation::{
    AssociationOutcome, AssociationPrompt, SimulatedTrajectories, TacticalSimulation, Team,
    TrackingData, TrajectoryCache,
};

/// Margin around the pitch in rendered images, in pixels
const PITCH_MARGIN: f64 = 20.0;

/// Kit colours of one side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamColors {
    pub main: ShapeColor,
    pub secondary: ShapeColor,
}

impl TeamColors {
    pub fn home_default() -> Self {
        Self {
            main: ShapeColor::rgb(0.85, 0.1, 0.1),
            secondary: ShapeColor::rgb(1.0, 1.0, 1.0),
        }
    }

    pub fn away_default() -> Self {
        Self {
            main: ShapeColor::rgb(0.1, 0.2, 0.85),
            secondary: ShapeColor::rgb(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Debug)]
pub struct Session<T: TrackingData> {
    pub board: Board,
    pub tactics: TacticalSimulation,
    pub trajectories: TrajectoryCache,
    tracking: T,
    pub home_colors: TeamColors,
    pub away_colors: TeamColors,
    /// Playhead, in global frames
    pub current_frame: usize,
    pub interval_secs: f64,
    pub fading: bool,
    pub pitch: Rect,
    sizes: ScaleConfig,
    prompt: Option<AssociationPrompt>,
}

impl<T: TrackingData> Session<T> {
    pub fn new(config: &TactiboardConfig, tracking: T, pitch: Rect) -> Self {
        let sizes = config.scale_config();
        let mut board = Board::new(config);
        board.set_simulation_mode(true);
        Self {
            board,
            tactics: TacticalSimulation::new(sizes),
            trajectories: TrajectoryCache::new(),
            tracking,
            home_colors: TeamColors::home_default(),
            away_colors: TeamColors::away_default(),
            current_frame: 0,
            interval_secs: config.simulation_interval_seconds,
            fading: config.trajectory_fading,
            pitch,
            sizes,
            prompt: None,
        }
    }

    pub fn tracking(&self) -> &T {
        &self.tracking
    }

    pub fn sizes(&self) -> &ScaleConfig {
        &self.sizes
    }

    /// Move the playhead
    pub fn seek(&mut self, frame: usize) {
        self.current_frame = frame.min(self.tracking.frame_count().saturating_sub(1));
    }

    // ========================================================================
    // Board input
    // ========================================================================

    /// Forward a message to the board and react to what it reports
    pub fn handle_board_msg(&mut self, msg: BoardMsg) -> Option<BoardEvent> {
        let event = handle_board_msg(&mut self.board, msg);
        match event {
            Some(BoardEvent::ArrowCommitted(id)) if self.board.simulation_mode => {
                self.prompt = self.board.arrows.get(id).map(|arrow| {
                    self.tactics
                        .association_prompt(arrow, self.current_frame, &self.tracking)
                });
            }
            Some(BoardEvent::Deleted(ShapeKind::Arrow, id)) => {
                self.tactics.remove_arrow_association(id);
                if self.prompt.as_ref().is_some_and(|p| p.arrow == id) {
                    self.prompt = None;
                }
            }
            _ => {}
        }
        event
    }

    /// Association still waiting for an answer
    pub fn pending_prompt(&self) -> Option<&AssociationPrompt> {
        self.prompt.as_ref()
    }

    pub fn dismiss_prompt(&mut self) {
        self.prompt = None;
    }

    // ========================================================================
    // Association
    // ========================================================================

    /// Bind an arrow to the player performing it and tint it with the kit colour
    ///
    /// `None` when the arrow or the player is unknown.
    pub fn associate_arrow(&mut self, id: ShapeId, player_id: &str) -> Option<AssociationOutcome> {
        let team = self.tracking.team_of(player_id)?;
        let arrow = self.board.arrows.get(id)?;
        let outcome = self
            .tactics
            .associate_arrow_with_player(arrow, player_id, self.current_frame);
        self.board.arrows.set_arrow_players(
            id,
            Some(player_id.to_string()),
            None,
            &mut self.board.scene,
        );
        self.board.tint_arrow(id, self.team_colors(team).main);

        if outcome == AssociationOutcome::Associated
            && self.prompt.as_ref().is_some_and(|p| p.arrow == id)
        {
            self.prompt = None;
        }
        Some(outcome)
    }

    /// Resolve the latest pending pass; `false` when none is pending
    pub fn set_pass_receiver(&mut self, receiver_id: &str) -> bool {
        if !self.tactics.set_pass_receiver(receiver_id) {
            return false;
        }
        if let Some(link) = self.tactics.possession_chain().last() {
            let (id, from) = (link.arrow, link.from_player.clone());
            self.board.arrows.set_arrow_players(
                id,
                Some(from),
                Some(receiver_id.to_string()),
                &mut self.board.scene,
            );
            if self.prompt.as_ref().is_some_and(|p| p.arrow == id) {
                self.prompt = None;
            }
        }
        true
    }

    fn team_colors(&self, team: Team) -> TeamColors {
        match team {
            Team::Home => self.home_colors,
            Team::Away => self.away_colors,
        }
    }

    /// Main kit colour of a player's side
    pub fn player_color(&self, player_id: &str) -> ShapeColor {
        self.tracking
            .team_of(player_id)
            .map_or(ShapeColor::BLACK, |team| self.team_colors(team).main)
    }

    // ========================================================================
    // Simulation and rendering
    // ========================================================================

    /// Re-run the tactical simulation from the playhead
    pub fn simulate(&mut self) -> &SimulatedTrajectories {
        self.tactics
            .calculate_simulated_trajectories(self.interval_secs, self.current_frame, &self.tracking)
    }

    fn trail_style(&self, horizon_frames: f64) -> TrailStyle {
        TrailStyle {
            current_frame: self.current_frame,
            horizon_frames,
            fading: self.fading,
            sizes: self.sizes,
            ball_color: ShapeColor::BALL,
        }
    }

    /// Render pitch, annotations, trajectories and players at the playhead
    pub fn render(&mut self, width: u32, height: u32) -> RgbaImage {
        let view = View::fit(self.pitch, width, height, PITCH_MARGIN);
        let mut img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        draw_pitch(
            &mut img,
            self.pitch,
            &view,
            ShapeColor::rgb(0.18, 0.49, 0.2),
            ShapeColor::rgb(0.95, 0.95, 0.95),
        );
        draw_board_on_image(&mut img, &self.board, &view);

        let horizon = (self.interval_secs * FPS).floor();
        let style = self.trail_style(horizon);
        let (home, away) = (self.home_colors, self.away_colors);
        let future = self.trajectories.calculate_future_trajectories(
            self.current_frame,
            self.interval_secs,
            &self.tracking,
        );
        draw_future_trajectories(
            &mut img,
            future,
            |team, _| match team {
                Team::Home => home.main,
                Team::Away => away.main,
            },
            &style,
            &view,
        );

        let frame = self.current_frame;
        let tracking = &self.tracking;
        let players: Vec<PlayerMarker> = [(Team::Home, home), (Team::Away, away)]
            .into_iter()
            .flat_map(|(team, colors)| {
                tracking
                    .roster(team)
                    .iter()
                    .filter_map(move |id| tracking.real_player_position(id, frame))
                    .map(move |pos| PlayerMarker {
                        pos,
                        main: colors.main,
                        secondary: colors.secondary,
                    })
            })
            .collect();
        draw_players(
            &mut img,
            &players,
            tracking.real_ball_position(frame),
            &self.sizes,
            &view,
        );

        let simulated = self.tactics.get_simulated_trajectories();
        let sim_horizon = simulated
            .ball
            .last()
            .or_else(|| simulated.players.values().filter_map(|s| s.last()).next())
            .map_or(horizon, |last| last.frame.saturating_sub(frame) as f64);
        draw_simulated_trajectories(
            &mut img,
            simulated,
            |id| self.player_color(id),
            &self.trail_style(sim_horizon),
            &view,
        );
        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{PointerAction, PointerButton, Tool};
    use crate::domain::Point;
    use crate::simulation::{FrameSample, Half, MatchTracking};

    fn session() -> Session<MatchTracking> {
        let mut t = MatchTracking::new(vec!["H1".into()], vec!["A1".into()]);
        for _ in 0..300 {
            t.push_frame(
                Half::First,
                FrameSample {
                    home: vec![Some([10.0, 10.0])],
                    away: vec![Some([30.0, 10.0])],
                    ball: Some([10.5, 10.0]),
                },
            );
        }
        Session::new(&TactiboardConfig::default(), t, Rect::new(0.0, 0.0, 105.0, 68.0))
    }

    fn draw_arrow(s: &mut Session<MatchTracking>, from: (f64, f64), to: (f64, f64)) -> ShapeId {
        s.handle_board_msg(BoardMsg::SetTool(Tool::Arrow));
        s.handle_board_msg(BoardMsg::Pointer(PointerAction::Press(
            Point::new(from.0, from.1),
            PointerButton::Left,
        )));
        match s.handle_board_msg(BoardMsg::Pointer(PointerAction::Press(
            Point::new(to.0, to.1),
            PointerButton::Left,
        ))) {
            Some(BoardEvent::ArrowCommitted(id)) => id,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_commit_raises_prompt_with_suggestions() {
        let mut s = session();
        let id = draw_arrow(&mut s, (10.0, 10.0), (30.0, 10.0));
        let prompt = s.pending_prompt().unwrap();
        assert_eq!(prompt.arrow, id);
        assert!(prompt.needs_to);
        assert_eq!(prompt.suggested_from.as_deref(), Some("H1"));
        assert_eq!(prompt.suggested_to.as_deref(), Some("A1"));
    }

    #[test]
    fn test_pass_association_tints_and_links() {
        let mut s = session();
        let id = draw_arrow(&mut s, (10.0, 10.0), (30.0, 10.0));
        assert_eq!(
            s.associate_arrow(id, "H1"),
            Some(AssociationOutcome::WaitingForReceiver)
        );
        assert!(s.pending_prompt().is_some());
        assert!(s.set_pass_receiver("A1"));
        assert!(s.pending_prompt().is_none());

        let arrow = s.board.arrows.get(id).unwrap();
        assert_eq!(arrow.color(), s.home_colors.main);
        assert_eq!(arrow.from_player(), Some("H1"));
        assert_eq!(arrow.to_player(), Some("A1"));
        assert_eq!(s.associate_arrow(id, "nobody"), None);
    }

    #[test]
    fn test_delete_removes_association() {
        let mut s = session();
        let id = draw_arrow(&mut s, (10.0, 10.0), (30.0, 10.0));
        s.associate_arrow(id, "H1");
        s.set_pass_receiver("A1");
        s.board.select(id);
        assert_eq!(
            s.handle_board_msg(BoardMsg::DeleteSelected),
            Some(BoardEvent::Deleted(ShapeKind::Arrow, id))
        );
        assert!(s.tactics.get_associated_arrows().is_empty());
        assert!(s.tactics.possession_chain().is_empty());
    }

    #[test]
    fn test_simulate_and_render() {
        let mut s = session();
        s.interval_secs = 2.0;
        let id = draw_arrow(&mut s, (10.0, 10.0), (30.0, 10.0));
        s.associate_arrow(id, "H1");
        s.set_pass_receiver("A1");
        let sim = s.simulate();
        assert_eq!(sim.ball.len(), 50);
        assert_eq!(sim.ball.last().unwrap().pos, Point::new(30.0, 10.0));

        let img = s.render(210, 136);
        assert_eq!(img.dimensions(), (210, 136));
        assert!(s.trajectories.is_cached(0, 2.0));
    }
}
