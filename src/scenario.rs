//! Scenario files: tracking data plus the annotations drawn over it
//!
//! A scenario is replayed through the same board messages pointer input
//! produces, so drawing, association and styling follow the interactive path.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::annotations::{BoardEvent, BoardMsg, PointerAction, PointerButton, StyleMsg, Tool};
use crate::config::{ShapeColor, TactiboardConfig};
use crate::domain::{ArrowStyle, Point, Rect, ShapeId, ZoneStyle};
use crate::session::{Session, TeamColors};
use crate::simulation::{ActionType, MatchTracking, TrackingData};

fn default_pitch() -> Rect {
    Rect::new(0.0, 0.0, 105.0, 68.0)
}

fn default_image_width() -> u32 {
    1050
}

fn default_image_height() -> u32 {
    680
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Pitch extent in scene units
    #[serde(default = "default_pitch")]
    pub pitch: Rect,
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    #[serde(default = "default_image_height")]
    pub image_height: u32,
    #[serde(default)]
    pub home_colors: Option<TeamColors>,
    #[serde(default)]
    pub away_colors: Option<TeamColors>,
    #[serde(default)]
    pub tracking: MatchTracking,
    /// Frame the arrows are drawn at and the simulation starts from
    #[serde(default)]
    pub start_frame: usize,
    /// Overrides the configured simulation window
    #[serde(default)]
    pub interval_seconds: Option<f64>,
    #[serde(default)]
    pub arrows: Vec<ScenarioArrow>,
    #[serde(default)]
    pub zones: Vec<ScenarioZone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioArrow {
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub style: ArrowStyle,
    /// Draw with the curve tool; otherwise only the first and last points count
    #[serde(default)]
    pub curved: bool,
    #[serde(default)]
    pub width: Option<f64>,
    /// Hex color, `#RRGGBB` or `#RRGGBBAA`
    #[serde(default)]
    pub color: Option<String>,
    /// Player performing the action; the nearest player when omitted
    #[serde(default)]
    pub player: Option<String>,
    /// Pass receiver; the player nearest the arrow end when omitted
    #[serde(default)]
    pub receiver: Option<String>,
}

/// Zone geometry, given as the two clicks that create it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ZoneShape {
    Rectangle { from: [f64; 2], to: [f64; 2] },
    Ellipse { center: [f64; 2], far: [f64; 2] },
    Cone {
        apex: [f64; 2],
        direction: [f64; 2],
        #[serde(default)]
        spread_deg: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioZone {
    #[serde(flatten)]
    pub shape: ZoneShape,
    #[serde(default)]
    pub rotation_deg: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub style: Option<ZoneStyle>,
    #[serde(default)]
    pub fill_alpha: Option<u8>,
    #[serde(default)]
    pub width: Option<f64>,
}

fn parse_color(hex: Option<&str>, fallback: ShapeColor) -> Result<ShapeColor> {
    match hex {
        Some(hex) => ShapeColor::from_hex(hex).with_context(|| format!("Invalid color: {hex}")),
        None => Ok(fallback),
    }
}

fn point(xy: [f64; 2]) -> Result<Point> {
    Point::from_xy(xy).with_context(|| format!("Non-finite point: {xy:?}"))
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid scenario: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a session with every annotation drawn and associated
    pub fn into_session(self, config: &TactiboardConfig) -> Result<Session<MatchTracking>> {
        let mut session = Session::new(config, self.tracking, self.pitch);
        if let Some(colors) = self.home_colors {
            session.home_colors = colors;
        }
        if let Some(colors) = self.away_colors {
            session.away_colors = colors;
        }
        if let Some(interval) = self.interval_seconds {
            session.interval_secs = interval.max(0.0);
        }
        session.seek(self.start_frame);

        for (i, entry) in self.arrows.iter().enumerate() {
            let id = draw_arrow(&mut session, entry, config)
                .with_context(|| format!("Arrow {i}"))?;
            associate(&mut session, id, entry).with_context(|| format!("Arrow {i}"))?;
        }
        for (i, entry) in self.zones.iter().enumerate() {
            draw_zone(&mut session, entry, config).with_context(|| format!("Zone {i}"))?;
        }
        session.dismiss_prompt();

        log::info!(
            "Scenario ready: {} arrows, {} zones, {} tactical",
            session.board.arrows.arrows().len(),
            session.board.shapes().len() - session.board.arrows.arrows().len(),
            session.tactics.get_associated_arrows().len()
        );
        Ok(session)
    }
}

fn press(session: &mut Session<MatchTracking>, pos: Point) -> Option<BoardEvent> {
    session.handle_board_msg(BoardMsg::Pointer(PointerAction::Press(pos, PointerButton::Left)))
}

fn release(session: &mut Session<MatchTracking>, pos: Point) -> Option<BoardEvent> {
    session.handle_board_msg(BoardMsg::Pointer(PointerAction::Release(pos, PointerButton::Left)))
}

fn draw_arrow(
    session: &mut Session<MatchTracking>,
    entry: &ScenarioArrow,
    config: &TactiboardConfig,
) -> Result<ShapeId> {
    let points = entry.points.iter().copied().map(point).collect::<Result<Vec<_>>>()?;
    let (&first, &last) = match points.as_slice() {
        [first, .., last] => (first, last),
        _ => bail!("Arrow needs at least two points"),
    };

    let color = parse_color(entry.color.as_deref(), config.arrow_color)?;
    let tool = if entry.curved { Tool::Curve } else { Tool::Arrow };
    session.handle_board_msg(BoardMsg::SetTool(tool));
    session.handle_board_msg(BoardMsg::Style(StyleMsg::Color(color)));
    session.handle_board_msg(BoardMsg::Style(StyleMsg::Width(
        entry.width.unwrap_or(config.arrow_width),
    )));
    session.handle_board_msg(BoardMsg::Style(StyleMsg::ArrowStyle(entry.style)));

    let event = if entry.curved {
        for pos in &points {
            press(session, *pos);
        }
        session.handle_board_msg(BoardMsg::Interrupt)
    } else {
        press(session, first);
        press(session, last)
    };
    match event {
        Some(BoardEvent::ArrowCommitted(id)) => Ok(id),
        _ => bail!("Arrow was not committed"),
    }
}

fn associate(session: &mut Session<MatchTracking>, id: ShapeId, entry: &ScenarioArrow) -> Result<()> {
    let prompt = session.pending_prompt().cloned();
    let suggested_from = prompt.as_ref().and_then(|p| p.suggested_from.clone());
    let Some(player) = entry.player.clone().or(suggested_from) else {
        log::warn!("Arrow {} has no player nearby, left as annotation", id);
        return Ok(());
    };
    if session.tracking().team_of(&player).is_none() {
        bail!("Unknown player: {player}");
    }
    session
        .associate_arrow(id, &player)
        .with_context(|| format!("Could not associate arrow {id}"))?;

    if ActionType::from_style(entry.style) == ActionType::Pass {
        let suggested_to = prompt.and_then(|p| p.suggested_to);
        match entry.receiver.clone().or(suggested_to) {
            Some(receiver) => {
                if session.tracking().team_of(&receiver).is_none() {
                    bail!("Unknown receiver: {receiver}");
                }
                session.set_pass_receiver(&receiver);
            }
            None => log::warn!("Pass {} has no receiver, ball stays with {}", id, player),
        }
    }
    Ok(())
}

fn draw_zone(
    session: &mut Session<MatchTracking>,
    entry: &ScenarioZone,
    config: &TactiboardConfig,
) -> Result<ShapeId> {
    let (tool, anchor, far) = match entry.shape {
        ZoneShape::Rectangle { from, to } => (Tool::RectangleZone, from, to),
        ZoneShape::Ellipse { center, far } => (Tool::EllipseZone, center, far),
        ZoneShape::Cone { apex, direction, .. } => (Tool::ConeZone, apex, direction),
    };
    let (anchor, far) = (point(anchor)?, point(far)?);
    let color = parse_color(entry.color.as_deref(), config.zone_color)?;
    let style = entry.style.unwrap_or(config.zone_style);

    session.handle_board_msg(BoardMsg::SetTool(tool));
    for msg in [
        StyleMsg::Color(color),
        StyleMsg::Width(entry.width.unwrap_or(config.zone_width)),
        StyleMsg::ZoneStyle(style.as_str().to_string()),
        StyleMsg::FillAlpha(entry.fill_alpha.unwrap_or(config.zone_fill_alpha)),
    ] {
        session.handle_board_msg(BoardMsg::Style(msg));
    }
    if let ZoneShape::Cone { spread_deg, .. } = entry.shape {
        let spread = spread_deg.unwrap_or(config.cone_spread_deg);
        session.handle_board_msg(BoardMsg::Style(StyleMsg::Spread(spread)));
    }

    press(session, anchor);
    let Some(BoardEvent::ZoneCommitted(_, id)) = release(session, far) else {
        bail!("Zone was not committed");
    };

    if entry.rotation_deg != 0.0 {
        session.board.select(id);
        session.handle_board_msg(BoardMsg::Style(StyleMsg::Rotation(entry.rotation_deg)));
        session.board.clear_all_selections();
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ShapeKind, ShapeOps};

    const TRACKING: &str = r#"{
        "home": ["H1"],
        "away": ["A1"],
        "first_half": [
            {"home": [[0.0, 0.0]], "away": [[20.0, 0.0]], "ball": [0.5, 0.0]},
            {"home": [[0.0, 0.0]], "away": [[20.0, 0.0]], "ball": [0.5, 0.0]}
        ]
    }"#;

    fn scenario(rest: &str) -> Scenario {
        Scenario::from_json(&format!(r#"{{"tracking": {TRACKING}, {rest}}}"#)).unwrap()
    }

    #[test]
    fn test_defaults() {
        let s = Scenario::from_json("{}").unwrap();
        assert_eq!(s.pitch, Rect::new(0.0, 0.0, 105.0, 68.0));
        assert_eq!((s.image_width, s.image_height), (1050, 680));
        assert!(s.arrows.is_empty());
        assert_eq!(s.interval_seconds, None);
    }

    #[test]
    fn test_pass_uses_suggested_players() {
        let s = scenario(r#""arrows": [{"points": [[1.0, 0.0], [19.0, 0.0]], "style": "solid"}]"#);
        let session = s.into_session(&TactiboardConfig::default()).unwrap();
        let chain = session.tactics.possession_chain();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].from_player, "H1");
        assert_eq!(chain[0].to_player, "A1");
        assert!(session.pending_prompt().is_none());
    }

    #[test]
    fn test_unknown_player_is_an_error() {
        let s = scenario(r#""arrows": [{"points": [[1.0, 0.0], [5.0, 0.0]], "player": "Z9"}]"#);
        let err = s.into_session(&TactiboardConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Unknown player: Z9"));
    }

    #[test]
    fn test_bad_color_is_an_error() {
        let s = scenario(r##""arrows": [{"points": [[1.0, 0.0], [5.0, 0.0]], "color": "#12"}]"##);
        assert!(s.into_session(&TactiboardConfig::default()).is_err());
    }

    #[test]
    fn test_zones_are_drawn_and_rotated() {
        let s = scenario(
            r##""zones": [
                {"kind": "rectangle", "from": [0.0, 0.0], "to": [10.0, 4.0], "rotation_deg": 90.0},
                {"kind": "cone", "apex": [50.0, 30.0], "direction": [60.0, 30.0], "spread_deg": 40.0,
                 "color": "#00FF00", "fill_alpha": 64}
            ]"##,
        );
        let session = s.into_session(&TactiboardConfig::default()).unwrap();
        let board = &session.board;
        let rect = &board.rectangles.zones()[0];
        assert_eq!(rect.rotation_deg(), 90.0);
        let cone = &board.cones.zones()[0];
        assert!((cone.spread_deg() - 40.0).abs() < 1e-9);
        assert_eq!(cone.appearance.fill_alpha, 64);
        assert_eq!(board.kind_of(cone.id()), Some(ShapeKind::Cone));
        assert!(board.selection().is_none());
    }

    #[test]
    fn test_far_arrow_stays_an_annotation() {
        let s = scenario(r#""arrows": [{"points": [[60.0, 40.0], [70.0, 40.0]], "style": "dotted"}]"#);
        let session = s.into_session(&TactiboardConfig::default()).unwrap();
        assert_eq!(session.board.arrows.arrows().len(), 1);
        assert!(session.tactics.get_associated_arrows().is_empty());
    }
}
