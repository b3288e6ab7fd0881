//! Image rendering for the board using tiny-skia
//!
//! These functions draw the pitch, annotations, players and trajectories
//! onto an RgbaImage for saving to disk. All geometry arrives in scene
//! units (already rotated); a [`View`] maps it to pixels.

use image::RgbaImage;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform,
};

use super::geometry::shape;
use crate::annotations::Board;
use crate::config::{ScaleConfig, ShapeColor};
use crate::domain::{
    Arrow, PathCommand, Point, Rect, ShapePath, ShapeRef, ZoneAppearance, ZoneStyle,
};
use crate::simulation::{
    FutureTrajectories, SimulatedTrajectories, Team, TrailKind, TrajectorySample,
};

/// Selection outline width in scene units
const SELECTION_OUTLINE: f64 = 0.15;

/// Real player trail dash, in pen widths
const PLAYER_TRAIL_DASH: [f64; 2] = [1.0, 4.0];

/// Uniform scene-to-pixel mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    /// Scene point drawn at pixel (0, 0)
    pub origin: Point,
    /// Pixels per scene unit
    pub scale: f64,
}

impl View {
    pub fn new(origin: Point, scale: f64) -> Self {
        Self { origin, scale }
    }

    /// Fit `area` into a `width × height` image with `margin` pixels around it
    pub fn fit(area: Rect, width: u32, height: u32, margin: f64) -> Self {
        let avail_w = (width as f64 - 2.0 * margin).max(1.0);
        let avail_h = (height as f64 - 2.0 * margin).max(1.0);
        let scale = (avail_w / area.width.max(f64::EPSILON))
            .min(avail_h / area.height.max(f64::EPSILON));
        let origin = Point::new(
            area.x - (width as f64 / scale - area.width) / 2.0,
            area.y - (height as f64 / scale - area.height) / 2.0,
        );
        Self { origin, scale }
    }

    pub fn to_px(&self, p: Point) -> (f32, f32) {
        (
            ((p.x - self.origin.x) * self.scale) as f32,
            ((p.y - self.origin.y) * self.scale) as f32,
        )
    }

    /// Scene length in pixels
    pub fn len(&self, d: f64) -> f32 {
        (d * self.scale) as f32
    }
}

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    // Copy back
    img.copy_from_slice(pixmap.data());
}

fn paint(color: ShapeColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Round-capped stroke; `dash` is in multiples of the stroke width
fn stroke(width: f32, dash: Option<[f64; 2]>) -> Stroke {
    let width = width.max(0.5);
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash: dash.and_then(|[on, off]| {
            StrokeDash::new(vec![on as f32 * width, off as f32 * width], 0.0)
        }),
        ..Default::default()
    }
}

/// Build a tiny-skia path from a scene-space path
fn build_path(path: &ShapePath, view: &View) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for cmd in path.commands() {
        match *cmd {
            PathCommand::MoveTo(p) => {
                let (x, y) = view.to_px(p);
                pb.move_to(x, y);
            }
            PathCommand::LineTo(p) => {
                let (x, y) = view.to_px(p);
                pb.line_to(x, y);
            }
            PathCommand::QuadTo(c, p) => {
                let (cx, cy) = view.to_px(c);
                let (x, y) = view.to_px(p);
                pb.quad_to(cx, cy, x, y);
            }
            PathCommand::CubicTo(c1, c2, p) => {
                let (x1, y1) = view.to_px(c1);
                let (x2, y2) = view.to_px(c2);
                let (x, y) = view.to_px(p);
                pb.cubic_to(x1, y1, x2, y2, x, y);
            }
            PathCommand::Close => pb.close(),
        }
    }
    pb.finish()
}

fn build_polygon(points: &[Point], view: &View) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    let (x, y) = view.to_px(*first);
    pb.move_to(x, y);
    for p in rest {
        let (x, y) = view.to_px(*p);
        pb.line_to(x, y);
    }
    pb.close();
    pb.finish()
}

fn build_rect(rect: Rect, view: &View) -> Option<tiny_skia::Path> {
    let (l, t) = view.to_px(Point::new(rect.left(), rect.top()));
    let (r, b) = view.to_px(Point::new(rect.right(), rect.bottom()));
    tiny_skia::Rect::from_ltrb(l, t, r, b).map(PathBuilder::from_rect)
}

fn build_circle(center: Point, radius: f64, view: &View) -> Option<tiny_skia::Path> {
    let (cx, cy) = view.to_px(center);
    PathBuilder::from_circle(cx, cy, view.len(radius).max(0.5))
}

fn build_line(a: Point, b: Point, view: &View) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    let (x1, y1) = view.to_px(a);
    let (x2, y2) = view.to_px(b);
    pb.move_to(x1, y1);
    pb.line_to(x2, y2);
    pb.finish()
}

// ============================================================================
// Pitch
// ============================================================================

/// Fill the image with grass and draw the pitch markings for `pitch`
pub fn draw_pitch(
    img: &mut RgbaImage,
    pitch: Rect,
    view: &View,
    grass: ShapeColor,
    lines: ShapeColor,
) {
    with_pixmap(img, |pixmap| {
        let [r, g, b, a] = grass.to_rgba_u8();
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));

        let line_paint = paint(lines);
        let line_stroke = stroke(view.len(0.12), None);
        let center = pitch.center();

        let mut pb = PathBuilder::new();
        let (l, t) = view.to_px(Point::new(pitch.left(), pitch.top()));
        let (rgt, btm) = view.to_px(Point::new(pitch.right(), pitch.bottom()));
        pb.move_to(l, t);
        pb.line_to(rgt, t);
        pb.line_to(rgt, btm);
        pb.line_to(l, btm);
        pb.close();
        // Halfway line
        let (cx, _) = view.to_px(center);
        pb.move_to(cx, t);
        pb.line_to(cx, btm);
        let center_circle_radius = 9.15f64.min(pitch.height / 4.0);
        let (ccx, ccy) = view.to_px(center);
        pb.push_circle(ccx, ccy, view.len(center_circle_radius));

        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &line_paint, &line_stroke, Transform::identity(), None);
        }
    });
}

// ============================================================================
// Annotations
// ============================================================================

fn draw_zone(pixmap: &mut Pixmap, outline: &ShapePath, appearance: &ZoneAppearance, view: &View) {
    let Some(path) = build_path(outline, view) else {
        return;
    };
    if appearance.fill_alpha > 0 {
        pixmap.fill_path(
            &path,
            &paint(appearance.fill_color()),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
    let dash = (appearance.style == ZoneStyle::Dashed).then_some(shape::DASH_PATTERN);
    pixmap.stroke_path(
        &path,
        &paint(appearance.color),
        &stroke(view.len(appearance.pen_width()), dash),
        Transform::identity(),
        None,
    );
}

fn draw_arrow(pixmap: &mut Pixmap, arrow: &Arrow, view: &View) {
    let geometry = arrow.geometry();
    let color = paint(arrow.color());

    if let Some(path) = build_path(&geometry.body, view) {
        let dash = geometry.dashed.then_some(shape::DASH_PATTERN);
        let body = stroke(view.len(geometry.pen_width), dash);
        pixmap.stroke_path(&path, &color, &body, Transform::identity(), None);
    }

    if let Some(path) = geometry.head.and_then(|head| build_polygon(&head, view)) {
        pixmap.fill_path(&path, &color, FillRule::Winding, Transform::identity(), None);
    }
}

fn draw_shape(pixmap: &mut Pixmap, shape: ShapeRef<'_>, view: &View) {
    match shape {
        ShapeRef::Arrow(arrow) => draw_arrow(pixmap, arrow, view),
        ShapeRef::Rectangle(zone) => draw_zone(pixmap, &zone.outline(), &zone.appearance, view),
        ShapeRef::Ellipse(zone) => draw_zone(pixmap, &zone.outline(), &zone.appearance, view),
        ShapeRef::Cone(zone) => draw_zone(pixmap, &zone.outline(), &zone.appearance, view),
    }
}

fn shape_color(shape: ShapeRef<'_>) -> ShapeColor {
    match shape {
        ShapeRef::Arrow(arrow) => arrow.color(),
        ShapeRef::Rectangle(zone) => zone.appearance.color,
        ShapeRef::Ellipse(zone) => zone.appearance.color,
        ShapeRef::Cone(zone) => zone.appearance.color,
    }
}

/// Selection AABB outline plus the four corner markers
fn draw_selection(pixmap: &mut Pixmap, shape: ShapeRef<'_>, board: &Board, view: &View) {
    let color = paint(shape_color(shape));
    let bounds = shape.bounds();
    if let Some(path) = build_rect(bounds, view) {
        let outline = stroke(view.len(SELECTION_OUTLINE), Some([4.0, 4.0]));
        pixmap.stroke_path(&path, &color, &outline, Transform::identity(), None);
    }

    let Some(markers) = board.scene.handles().markers(shape.id()) else {
        return;
    };
    let fill = paint(ShapeColor::rgb(1.0, 1.0, 1.0));
    let border = stroke(view.len(SELECTION_OUTLINE), None);
    for marker in markers {
        let Some(path) = build_rect(marker.rect(), view) else {
            continue;
        };
        pixmap.fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
        pixmap.stroke_path(&path, &color, &border, Transform::identity(), None);
    }
}

/// Draw every live shape in z-order, then previews, then selection handles
pub fn draw_board_on_image(img: &mut RgbaImage, board: &Board, view: &View) {
    let shapes = board.shapes();
    let previews = board.previews();
    if shapes.is_empty() && previews.is_empty() {
        return;
    }

    with_pixmap(img, |pixmap| {
        for shape in &shapes {
            draw_shape(pixmap, *shape, view);
        }
        for preview in &previews {
            draw_shape(pixmap, *preview, view);
        }
        for shape in shapes.iter().filter(|s| s.is_selected()) {
            draw_selection(pixmap, *shape, board, view);
        }
    });
}

// ============================================================================
// Players and trajectories
// ============================================================================

/// A player disc to draw
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMarker {
    pub pos: Point,
    pub main: ShapeColor,
    pub secondary: ShapeColor,
}

/// Player discs (outer ring in the secondary colour) and the ball
pub fn draw_players(
    img: &mut RgbaImage,
    players: &[PlayerMarker],
    ball: Option<Point>,
    sizes: &ScaleConfig,
    view: &View,
) {
    with_pixmap(img, |pixmap| {
        for player in players {
            if let Some(outer) = build_circle(player.pos, sizes.player_outer_radius(), view) {
                pixmap.fill_path(
                    &outer,
                    &paint(player.secondary),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
            if let Some(inner) = build_circle(player.pos, sizes.player_inner_radius(), view) {
                pixmap.fill_path(
                    &inner,
                    &paint(player.main),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
        }
        if let Some(path) = ball.and_then(|b| build_circle(b, sizes.ball_radius(), view)) {
            pixmap.fill_path(
                &path,
                &paint(ShapeColor::BALL),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    });
}

/// How trails are faded and sized
#[derive(Debug, Clone, Copy)]
pub struct TrailStyle {
    pub current_frame: usize,
    /// Frames over which a trail fades to its floor
    pub horizon_frames: f64,
    pub fading: bool,
    pub sizes: ScaleConfig,
    pub ball_color: ShapeColor,
}

/// Ring marking where the ball ends up, shown until the playhead gets there
fn draw_final_ring(
    pixmap: &mut Pixmap,
    at: Point,
    final_frame: usize,
    radius: f64,
    pen: f64,
    style: &TrailStyle,
    view: &View,
) {
    if style.current_frame >= final_frame {
        return;
    }
    if let Some(path) = build_circle(at, radius, view) {
        pixmap.stroke_path(
            &path,
            &paint(style.ball_color),
            &stroke(view.len(pen), None),
            Transform::identity(),
            None,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_segments(
    pixmap: &mut Pixmap,
    samples: &[(Point, usize)],
    color: ShapeColor,
    width: f64,
    dash: Option<[f64; 2]>,
    kind: TrailKind,
    style: &TrailStyle,
    view: &View,
) {
    for pair in samples.windows(2) {
        let [(a, frame), (b, _)] = pair else {
            continue;
        };
        let Some(alpha) =
            kind.segment_alpha(style.current_frame, *frame, style.horizon_frames, style.fading)
        else {
            continue;
        };
        let Some(path) = build_line(*a, *b, view) else {
            continue;
        };
        pixmap.stroke_path(
            &path,
            &paint(color.with_alpha(alpha as f32)),
            &stroke(view.len(width), dash),
            Transform::identity(),
            None,
        );
    }
}

/// Every other cached sample, as drawn for real trails
fn thinned(samples: &[TrajectorySample]) -> Vec<(Point, usize)> {
    samples.iter().step_by(2).map(|s| (s.pos, s.frame)).collect()
}

/// Real future trails: thin dashed lines for players, solid for the ball
pub fn draw_future_trajectories(
    img: &mut RgbaImage,
    future: &FutureTrajectories,
    team_color: impl Fn(Team, &str) -> ShapeColor,
    style: &TrailStyle,
    view: &View,
) {
    if future.is_empty() {
        return;
    }
    let sizes = style.sizes;

    with_pixmap(img, |pixmap| {
        for team in Team::ALL {
            for (id, samples) in future.team(team) {
                draw_segments(
                    pixmap,
                    &thinned(samples),
                    team_color(team, id),
                    sizes.trajectory_player_line_width(),
                    Some(PLAYER_TRAIL_DASH),
                    TrailKind::RealPlayer,
                    style,
                    view,
                );
            }
        }

        draw_segments(
            pixmap,
            &thinned(&future.ball),
            style.ball_color,
            sizes.trajectory_ball_line_width(),
            None,
            TrailKind::RealBall,
            style,
            view,
        );
        if let Some(last) = future.ball.last() {
            draw_final_ring(
                pixmap,
                last.pos,
                last.frame,
                sizes.ball_radius() * 1.2,
                0.4,
                style,
                view,
            );
        }
    });
}

/// Simulated trails: thicker solid lines drawn over the real ones
pub fn draw_simulated_trajectories(
    img: &mut RgbaImage,
    simulated: &SimulatedTrajectories,
    player_color: impl Fn(&str) -> ShapeColor,
    style: &TrailStyle,
    view: &View,
) {
    if simulated.is_empty() {
        return;
    }
    let sizes = style.sizes;

    with_pixmap(img, |pixmap| {
        for (id, samples) in &simulated.players {
            let samples: Vec<_> = samples.iter().map(|s| (s.pos, s.frame)).collect();
            draw_segments(
                pixmap,
                &samples,
                player_color(id),
                sizes.trajectory_player_line_width() * 2.0,
                None,
                TrailKind::SimulatedPlayer,
                style,
                view,
            );
        }

        let ball: Vec<_> = simulated.ball.iter().map(|s| (s.pos, s.frame)).collect();
        draw_segments(
            pixmap,
            &ball,
            style.ball_color,
            sizes.trajectory_ball_line_width() * 2.0,
            None,
            TrailKind::SimulatedBall,
            style,
            view,
        );
        if let Some(last) = simulated.ball.last() {
            draw_final_ring(
                pixmap,
                last.pos,
                last.frame,
                sizes.ball_radius() * 1.3,
                0.6,
                style,
                view,
            );
        }
    });
}
