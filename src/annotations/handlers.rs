//! Annotation board message handlers
//!
//! Routes tool switches, pointer input and property edits to the right
//! manager. Managers never see each other; all cross-family coordination
//! (exclusive selection, tool resets) happens here.

use super::arrows::ArrowMode;
use super::board::{Board, HANDLE_TOLERANCE};
use super::messages::{BoardEvent, BoardMsg, PointerAction, PointerButton, StyleMsg, Tool};
use super::zones::ZoneMode;
use crate::domain::{HandleEvent, HandlePhase, Point, ShapeKind};

/// Handle a BoardMsg, modifying board state
///
/// Returns the notable outcome, if any.
pub fn handle_board_msg(board: &mut Board, msg: BoardMsg) -> Option<BoardEvent> {
    match msg {
        BoardMsg::SetTool(tool) => set_tool(board, tool),
        BoardMsg::Pointer(action) => match board.tool {
            Tool::Select => handle_select(board, action),
            Tool::Arrow | Tool::Curve => handle_arrow(board, action),
            Tool::RectangleZone | Tool::EllipseZone | Tool::ConeZone => handle_zone(board, action),
        },
        BoardMsg::Handle(event) => {
            route_handle_event(board, event);
            None
        }
        BoardMsg::Interrupt => interrupt(board),
        BoardMsg::DeleteSelected => delete_selected(board),
        BoardMsg::Style(style) => {
            handle_style(board, style);
            None
        }
    }
}

// ============================================================================
// Tool switching
// ============================================================================

fn set_tool(board: &mut Board, tool: Tool) -> Option<BoardEvent> {
    log::debug!("Tool {:?} -> {:?}", board.tool, tool);
    let mut event = None;
    board.dragging = None;
    let scene = &mut board.scene;

    match tool {
        Tool::Select => {
            event = board.arrows.try_finish_arrow(scene).map(BoardEvent::ArrowCommitted);
            board.arrows.set_mode(ArrowMode::Select, scene);
            board.cancel_zones();
        }
        Tool::Arrow | Tool::Curve => {
            let mode = if tool == Tool::Curve {
                ArrowMode::Curve
            } else {
                ArrowMode::Straight
            };
            board.arrows.set_mode(mode, scene);
            board.rectangles.set_mode(ZoneMode::Select, scene);
            board.ellipses.set_mode(ZoneMode::Select, scene);
            board.cones.set_mode(ZoneMode::Select, scene);
        }
        Tool::RectangleZone | Tool::EllipseZone | Tool::ConeZone => {
            board.arrows.set_mode(ArrowMode::Select, scene);
            let mode_for = |t: Tool| {
                if t == tool {
                    ZoneMode::Create
                } else {
                    ZoneMode::Select
                }
            };
            board.rectangles.set_mode(mode_for(Tool::RectangleZone), scene);
            board.ellipses.set_mode(mode_for(Tool::EllipseZone), scene);
            board.cones.set_mode(mode_for(Tool::ConeZone), scene);
        }
    }
    board.tool = tool;
    event
}

/// Finish or cancel whatever is being drawn and go back to select
fn interrupt(board: &mut Board) -> Option<BoardEvent> {
    if board.tool == Tool::Select {
        return None;
    }
    set_tool(board, Tool::Select)
}

// ============================================================================
// Select tool
// ============================================================================

fn handle_select(board: &mut Board, action: PointerAction) -> Option<BoardEvent> {
    match action {
        PointerAction::Press(pos, button) => {
            // Handles sit on top of everything
            if button == PointerButton::Left
                && let Some((shape, corner)) = board.scene.handles().hit(pos, HANDLE_TOLERANCE)
            {
                let event = HandleEvent {
                    shape,
                    corner,
                    pos,
                    phase: HandlePhase::Press,
                };
                if route_handle_event(board, event) {
                    board.dragging = board.kind_of(shape);
                    return None;
                }
            }

            let Some((kind, id)) = board.shape_at(pos) else {
                board.clear_all_selections();
                return None;
            };
            board.clear_all_selections();
            let scene = &mut board.scene;
            match kind {
                ShapeKind::Arrow => {
                    board.arrows.select_arrow(id, scene);
                    board.arrows.begin_move(id, pos);
                }
                ShapeKind::Rectangle => {
                    board.rectangles.select_zone(id, scene);
                    board.rectangles.begin_move(id, pos);
                }
                ShapeKind::Ellipse => {
                    board.ellipses.select_zone(id, scene);
                    board.ellipses.begin_move(id, pos);
                }
                ShapeKind::Cone => {
                    board.cones.select_zone(id, scene);
                    board.cones.begin_move(id, pos);
                }
            }
            // Right click only selects (properties)
            board.dragging = (button == PointerButton::Left).then_some(kind);
            Some(BoardEvent::Selected(kind, id))
        }
        PointerAction::Move(pos) => {
            let kind = board.dragging?;
            let scene = &mut board.scene;
            match kind {
                ShapeKind::Arrow => {
                    board.arrows.drag_resize(pos, scene) || board.arrows.drag_move(pos, scene)
                }
                ShapeKind::Rectangle => {
                    board.rectangles.drag_resize(pos, scene)
                        || board.rectangles.drag_move(pos, scene)
                }
                ShapeKind::Ellipse => {
                    board.ellipses.drag_resize(pos, scene) || board.ellipses.drag_move(pos, scene)
                }
                ShapeKind::Cone => {
                    board.cones.drag_resize(pos, scene) || board.cones.drag_move(pos, scene)
                }
            };
            None
        }
        PointerAction::Release(_, _) => {
            if let Some(kind) = board.dragging.take() {
                match kind {
                    ShapeKind::Arrow => board.arrows.end_resize() || board.arrows.end_move(),
                    ShapeKind::Rectangle => {
                        board.rectangles.end_resize() || board.rectangles.end_move()
                    }
                    ShapeKind::Ellipse => board.ellipses.end_resize() || board.ellipses.end_move(),
                    ShapeKind::Cone => board.cones.end_resize() || board.cones.end_move(),
                };
            }
            None
        }
    }
}

/// Deliver a handle event to the manager owning the shape
fn route_handle_event(board: &mut Board, event: HandleEvent) -> bool {
    let kind = board.kind_of(event.shape);
    let scene = &mut board.scene;
    match kind {
        Some(ShapeKind::Arrow) => board.arrows.handle_event(event, scene),
        Some(ShapeKind::Rectangle) => board.rectangles.handle_event(event, scene),
        Some(ShapeKind::Ellipse) => board.ellipses.handle_event(event, scene),
        Some(ShapeKind::Cone) => board.cones.handle_event(event, scene),
        None => {
            log::warn!("Handle event for unknown shape {}", event.shape);
            false
        }
    }
}

// ============================================================================
// Arrow tools
// ============================================================================

fn handle_arrow(board: &mut Board, action: PointerAction) -> Option<BoardEvent> {
    match action {
        PointerAction::Press(pos, PointerButton::Left) => {
            board.arrows.add_point(pos);
            // Straight arrows commit on the second click
            if board.tool == Tool::Arrow && board.arrows.pending_points().len() == 2 {
                let event = board
                    .arrows
                    .finish_arrow(&mut board.scene)
                    .map(BoardEvent::ArrowCommitted);
                set_tool(board, Tool::Select);
                return event;
            }
            None
        }
        PointerAction::Press(_, PointerButton::Right) => {
            if board.arrows.pending_points().len() < 2 {
                board.arrows.cancel_arrow();
                set_tool(board, Tool::Select);
            }
            None
        }
        PointerAction::Move(pos) => {
            if board.arrows.is_drawing() {
                board.arrows.update_preview(pos);
            }
            None
        }
        PointerAction::Release(_, _) => None,
    }
}

// ============================================================================
// Zone tools
// ============================================================================

fn handle_zone(board: &mut Board, action: PointerAction) -> Option<BoardEvent> {
    let tool = board.tool;
    let scene = &mut board.scene;
    // Dispatch to the manager for the active zone tool
    macro_rules! with_zone_manager {
        (|$mgr:ident| $body:expr) => {
            match tool {
                Tool::RectangleZone => {
                    let $mgr = &mut board.rectangles;
                    $body
                }
                Tool::EllipseZone => {
                    let $mgr = &mut board.ellipses;
                    $body
                }
                _ => {
                    let $mgr = &mut board.cones;
                    $body
                }
            }
        };
    }

    match action {
        PointerAction::Press(pos, PointerButton::Left) => {
            with_zone_manager!(|mgr| {
                mgr.add_point(pos);
                mgr.update_preview(pos);
            });
            None
        }
        PointerAction::Press(_, PointerButton::Right) => {
            with_zone_manager!(|mgr| mgr.cancel_zone());
            set_tool(board, Tool::Select);
            None
        }
        PointerAction::Move(pos) => {
            with_zone_manager!(|mgr| mgr.update_preview(pos));
            None
        }
        PointerAction::Release(pos, PointerButton::Left) => {
            let committed = with_zone_manager!(|mgr| {
                if mgr.is_drawing() {
                    mgr.add_point(pos);
                    mgr.finish_zone(scene).map(|id| (mgr.kind(), id))
                } else {
                    None
                }
            });
            let (kind, id) = committed?;
            set_tool(board, Tool::Select);
            Some(BoardEvent::ZoneCommitted(kind, id))
        }
        PointerAction::Release(_, PointerButton::Right) => None,
    }
}

// ============================================================================
// Deletion and style
// ============================================================================

fn delete_selected(board: &mut Board) -> Option<BoardEvent> {
    let (kind, id) = board.selection()?;
    let scene = &mut board.scene;
    let removed = match kind {
        ShapeKind::Arrow => board.arrows.delete_selected(scene).is_some(),
        ShapeKind::Rectangle => board.rectangles.delete_selected_zone(scene).is_some(),
        ShapeKind::Ellipse => board.ellipses.delete_selected_zone(scene).is_some(),
        ShapeKind::Cone => board.cones.delete_selected_zone(scene).is_some(),
    };
    board.dragging = None;
    removed.then_some(BoardEvent::Deleted(kind, id))
}

/// Which families a style edit reaches when nothing is selected
fn default_targets(tool: Tool) -> [bool; 4] {
    match tool {
        Tool::Select => [true; 4],
        Tool::Arrow | Tool::Curve => [true, false, false, false],
        Tool::RectangleZone => [false, true, false, false],
        Tool::EllipseZone => [false, false, true, false],
        Tool::ConeZone => [false, false, false, true],
    }
}

fn handle_style(board: &mut Board, style: StyleMsg) {
    let selection = board.selection().map(|(kind, _)| kind);
    let [arrows, rects, ellipses, cones] = match selection {
        Some(ShapeKind::Arrow) => [true, false, false, false],
        Some(ShapeKind::Rectangle) => [false, true, false, false],
        Some(ShapeKind::Ellipse) => [false, false, true, false],
        Some(ShapeKind::Cone) => [false, false, false, true],
        None => default_targets(board.tool),
    };
    let scene = &mut board.scene;

    match style {
        StyleMsg::Color(color) => {
            if arrows {
                board.arrows.set_color(color, scene);
            }
            if rects {
                board.rectangles.set_color(color, scene);
            }
            if ellipses {
                board.ellipses.set_color(color, scene);
            }
            if cones {
                board.cones.set_color(color, scene);
            }
        }
        StyleMsg::Width(width) => {
            if arrows {
                board.arrows.set_width(width, scene);
            }
            if rects {
                board.rectangles.set_width(width, scene);
            }
            if ellipses {
                board.ellipses.set_width(width, scene);
            }
            if cones {
                board.cones.set_width(width, scene);
            }
        }
        StyleMsg::ArrowStyle(arrow_style) => {
            if arrows {
                board.arrows.set_style(arrow_style, scene);
            }
        }
        StyleMsg::ZoneStyle(name) => {
            if rects {
                board.rectangles.set_style(&name, scene);
            }
            if ellipses {
                board.ellipses.set_style(&name, scene);
            }
            if cones {
                board.cones.set_style(&name, scene);
            }
        }
        StyleMsg::FillAlpha(alpha) => {
            if rects {
                board.rectangles.set_fill_alpha(alpha, scene);
            }
            if ellipses {
                board.ellipses.set_fill_alpha(alpha, scene);
            }
            if cones {
                board.cones.set_fill_alpha(alpha, scene);
            }
        }
        StyleMsg::Rotation(deg) => {
            let rotated = board.rectangles.set_rotation(deg, scene)
                || board.ellipses.set_rotation(deg, scene)
                || board.cones.set_rotation(deg, scene);
            if !rotated {
                log::debug!("Rotation ignored: no zone selected");
            }
        }
        StyleMsg::Spread(deg) => {
            if cones {
                board.cones.set_spread_deg(deg, scene);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeColor;
    use crate::domain::{ArrowStyle, Corner, Rect, ShapeOps, ZoneStyle};

    fn press(board: &mut Board, x: f64, y: f64) -> Option<BoardEvent> {
        handle_board_msg(
            board,
            BoardMsg::Pointer(PointerAction::Press(Point::new(x, y), PointerButton::Left)),
        )
    }

    fn moved(board: &mut Board, x: f64, y: f64) -> Option<BoardEvent> {
        handle_board_msg(board, BoardMsg::Pointer(PointerAction::Move(Point::new(x, y))))
    }

    fn release(board: &mut Board, x: f64, y: f64) -> Option<BoardEvent> {
        handle_board_msg(
            board,
            BoardMsg::Pointer(PointerAction::Release(Point::new(x, y), PointerButton::Left)),
        )
    }

    fn tool(board: &mut Board, t: Tool) -> Option<BoardEvent> {
        handle_board_msg(board, BoardMsg::SetTool(t))
    }

    #[test]
    fn test_straight_arrow_commits_on_second_click() {
        let mut board = Board::default();
        tool(&mut board, Tool::Arrow);
        assert!(press(&mut board, 10.0, 10.0).is_none());
        moved(&mut board, 20.0, 10.0);
        assert!(board.arrows.preview().is_some());
        let Some(BoardEvent::ArrowCommitted(id)) = press(&mut board, 30.0, 10.0) else {
            panic!("arrow not committed");
        };
        assert_eq!(board.tool, Tool::Select);
        assert!(board.scene.contains(id));
        assert!(board.arrows.preview().is_none());
    }

    #[test]
    fn test_curve_commits_on_interrupt() {
        let mut board = Board::default();
        tool(&mut board, Tool::Curve);
        for (x, y) in [(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)] {
            press(&mut board, x, y);
        }
        let event = handle_board_msg(&mut board, BoardMsg::Interrupt);
        let Some(BoardEvent::ArrowCommitted(id)) = event else {
            panic!("curve not committed");
        };
        assert_eq!(board.arrows.get(id).unwrap().points().len(), 3);
        assert_eq!(board.tool, Tool::Select);
    }

    #[test]
    fn test_right_click_cancels_arrow() {
        let mut board = Board::default();
        tool(&mut board, Tool::Arrow);
        press(&mut board, 0.0, 0.0);
        handle_board_msg(
            &mut board,
            BoardMsg::Pointer(PointerAction::Press(Point::new(1.0, 1.0), PointerButton::Right)),
        );
        assert!(!board.is_drawing());
        assert_eq!(board.tool, Tool::Select);
        assert!(board.arrows.arrows().is_empty());
    }

    #[test]
    fn test_zone_commits_on_release() {
        let mut board = Board::default();
        tool(&mut board, Tool::RectangleZone);
        press(&mut board, 0.0, 0.0);
        moved(&mut board, 5.0, 5.0);
        assert!(board.rectangles.preview().is_some());
        let Some(BoardEvent::ZoneCommitted(ShapeKind::Rectangle, id)) = release(&mut board, 10.0, 8.0)
        else {
            panic!("zone not committed");
        };
        assert_eq!(board.rectangles.get(id).unwrap().rect(), Rect::new(0.0, 0.0, 10.0, 8.0));
        assert_eq!(board.tool, Tool::Select);
    }

    #[test]
    fn test_zone_tool_cancel_on_right_click() {
        let mut board = Board::default();
        tool(&mut board, Tool::ConeZone);
        press(&mut board, 0.0, 0.0);
        handle_board_msg(
            &mut board,
            BoardMsg::Pointer(PointerAction::Press(Point::new(3.0, 3.0), PointerButton::Right)),
        );
        assert!(!board.cones.is_drawing());
        assert_eq!(board.tool, Tool::Select);
    }

    #[test]
    fn test_selection_is_exclusive_across_families() {
        let mut board = Board::default();
        tool(&mut board, Tool::EllipseZone);
        press(&mut board, 50.0, 50.0);
        release(&mut board, 60.0, 60.0);
        tool(&mut board, Tool::Arrow);
        press(&mut board, 0.0, 0.0);
        press(&mut board, 20.0, 0.0);

        // Select the ellipse, then the arrow
        assert!(matches!(
            press(&mut board, 50.0, 50.0),
            Some(BoardEvent::Selected(ShapeKind::Ellipse, _))
        ));
        release(&mut board, 50.0, 50.0);
        assert!(matches!(
            press(&mut board, 10.0, 0.0),
            Some(BoardEvent::Selected(ShapeKind::Arrow, _))
        ));
        release(&mut board, 10.0, 0.0);
        assert!(board.ellipses.selected().is_none());
        assert_eq!(board.selection().map(|s| s.0), Some(ShapeKind::Arrow));

        // Empty click clears
        press(&mut board, 200.0, 200.0);
        assert!(board.selection().is_none());
        assert!(board.scene.handles().is_empty());
    }

    #[test]
    fn test_drag_moves_selected_shape() {
        let mut board = Board::default();
        tool(&mut board, Tool::RectangleZone);
        press(&mut board, 0.0, 0.0);
        let Some(BoardEvent::ZoneCommitted(_, id)) = release(&mut board, 10.0, 10.0) else {
            panic!("zone not committed");
        };
        press(&mut board, 5.0, 5.0);
        moved(&mut board, 8.0, 9.0);
        release(&mut board, 8.0, 9.0);
        assert_eq!(board.rectangles.get(id).unwrap().rect(), Rect::new(3.0, 4.0, 10.0, 10.0));
    }

    #[test]
    fn test_handle_drag_resizes() {
        let mut board = Board::default();
        tool(&mut board, Tool::RectangleZone);
        press(&mut board, 0.0, 0.0);
        let Some(BoardEvent::ZoneCommitted(_, id)) = release(&mut board, 10.0, 10.0) else {
            panic!("zone not committed");
        };
        press(&mut board, 5.0, 5.0);
        release(&mut board, 5.0, 5.0);

        // Bottom-right handle
        let corner = board.scene.handles().markers(id).unwrap()[3].corner;
        assert_eq!(corner, Corner::BottomRight);
        press(&mut board, 10.0, 10.0);
        moved(&mut board, 14.0, 12.0);
        release(&mut board, 14.0, 12.0);
        assert_eq!(board.rectangles.get(id).unwrap().rect(), Rect::new(0.0, 0.0, 14.0, 12.0));
    }

    #[test]
    fn test_delete_selected() {
        let mut board = Board::default();
        tool(&mut board, Tool::Arrow);
        press(&mut board, 0.0, 0.0);
        let Some(BoardEvent::ArrowCommitted(id)) = press(&mut board, 20.0, 0.0) else {
            panic!("arrow not committed");
        };
        assert!(handle_board_msg(&mut board, BoardMsg::DeleteSelected).is_none());
        press(&mut board, 10.0, 0.0);
        release(&mut board, 10.0, 0.0);
        assert_eq!(
            handle_board_msg(&mut board, BoardMsg::DeleteSelected),
            Some(BoardEvent::Deleted(ShapeKind::Arrow, id))
        );
        assert!(board.scene.is_empty());
        assert!(board.shape(id).is_none());
    }

    #[test]
    fn test_style_goes_to_selection_or_tool_defaults() {
        let mut board = Board::default();
        let red = ShapeColor::rgb(1.0, 0.0, 0.0);
        tool(&mut board, Tool::Arrow);
        handle_board_msg(&mut board, BoardMsg::Style(StyleMsg::Color(red)));
        handle_board_msg(&mut board, BoardMsg::Style(StyleMsg::ArrowStyle(ArrowStyle::Zigzag)));
        assert_eq!(board.arrows.default_color(), red);
        assert_eq!(board.rectangles.defaults().appearance.color, ShapeColor::BLACK);

        tool(&mut board, Tool::RectangleZone);
        press(&mut board, 0.0, 0.0);
        let Some(BoardEvent::ZoneCommitted(_, id)) = release(&mut board, 10.0, 10.0) else {
            panic!("zone not committed");
        };
        press(&mut board, 5.0, 5.0);
        release(&mut board, 5.0, 5.0);
        handle_board_msg(&mut board, BoardMsg::Style(StyleMsg::ZoneStyle("dashed".into())));
        handle_board_msg(&mut board, BoardMsg::Style(StyleMsg::Rotation(45.0)));
        let zone = board.rectangles.get(id).unwrap();
        assert_eq!(zone.appearance.style, ZoneStyle::Dashed);
        assert_eq!(zone.rotation_deg(), 45.0);
        assert!(zone.bounds().width > 10.0);
        assert_eq!(board.rectangles.defaults().appearance.style, ZoneStyle::Solid);
    }

    #[test]
    fn test_switching_to_zone_tool_drops_arrow_selection() {
        let mut board = Board::default();
        tool(&mut board, Tool::Arrow);
        press(&mut board, 0.0, 0.0);
        press(&mut board, 20.0, 0.0);
        press(&mut board, 10.0, 0.0);
        release(&mut board, 10.0, 0.0);
        assert!(board.arrows.selected().is_some());
        tool(&mut board, Tool::ConeZone);
        assert!(board.arrows.selected().is_none());
        assert_eq!(board.cones.mode(), ZoneMode::Create);
        assert_eq!(board.rectangles.mode(), ZoneMode::Select);
    }
}
