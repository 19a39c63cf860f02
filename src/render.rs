//! Braille rasterizer for [`Frame`]s
//!
//! Orthographic view from +Z with an adjustable tilt about X. Each terminal
//! cell holds a 2x4 braille dot block, so dots come out roughly square.

use crate::colors::{self, Rgb};
use crate::engine::Frame;
use crate::geo::{rotate_y, SpatialPoint};
use crate::tables::OutlineKind;
use crate::terminal::Terminal;
use glam::Vec3;

/// World units from the centre to the nearest canvas edge at zoom 1
const VIEW_EXTENT: f32 = 3.3;

/// Star dust is pulled in toward the globe so the shell shows on screen
const DUST_SCALE: f32 = 0.3;

/// Dot radius of a pulse ring at scale 1
const RING_DOT_RADIUS: f32 = 1.0;

const MIN_VISIBLE_OPACITY: f32 = 0.05;

const DOT_BITS: [u8; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];

/// Draw order; a dot keeps the colour of its highest layer
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Layer {
    Dust = 1,
    Grid,
    Outline,
    Trail,
    Flow,
    Pulse,
    Satellite,
}

#[derive(Clone, Copy)]
struct Dot {
    layer: Layer,
    color: Rgb,
}

/// Braille dot grid: `cols * 2` by `rows * 4` dots
pub struct Canvas {
    cols: usize,
    rows: usize,
    dots: Vec<Option<Dot>>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let (cols, rows) = (cols as usize, rows as usize);
        Self { cols, rows, dots: vec![None; cols * 2 * rows * 4] }
    }

    pub fn dot_width(&self) -> usize {
        self.cols * 2
    }

    pub fn dot_height(&self) -> usize {
        self.rows * 4
    }

    pub fn plot(&mut self, x: i32, y: i32, layer: Layer, color: Rgb) {
        if x < 0 || y < 0 || x as usize >= self.dot_width() || y as usize >= self.dot_height() {
            return;
        }
        let idx = y as usize * self.dot_width() + x as usize;
        match self.dots[idx] {
            Some(d) if d.layer > layer => {}
            _ => self.dots[idx] = Some(Dot { layer, color }),
        }
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < self.dot_width() && y < self.dot_height() && self.dots[y * self.dot_width() + x].is_some()
    }

    pub fn lit_count(&self) -> usize {
        self.dots.iter().filter(|d| d.is_some()).count()
    }

    /// Braille glyph and colour for cell (cx, cy), if any dot is lit
    pub fn cell(&self, cx: usize, cy: usize) -> Option<(char, Rgb, bool)> {
        let bx = cx * 2;
        let by = cy * 4;
        let positions = [
            (by, bx), (by + 1, bx), (by + 2, bx),
            (by, bx + 1), (by + 1, bx + 1), (by + 2, bx + 1),
            (by + 3, bx), (by + 3, bx + 1),
        ];

        let mut bits: u8 = 0;
        let mut top: Option<Dot> = None;
        for (i, &(py, px)) in positions.iter().enumerate() {
            if let Some(d) = self.dots[py * self.dot_width() + px] {
                bits |= DOT_BITS[i];
                if top.map_or(true, |t| d.layer > t.layer) {
                    top = Some(d);
                }
            }
        }

        let top = top?;
        let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
        Some((ch, top.color, top.layer >= Layer::Pulse))
    }

    pub fn blit(&self, term: &mut Terminal) {
        for cy in 0..self.rows {
            for cx in 0..self.cols {
                if let Some((ch, color, bold)) = self.cell(cx, cy) {
                    term.set(cx as i32, cy as i32, ch, Some(color.to_terminal()), bold);
                }
            }
        }
    }
}

/// View parameters for turning world space into dot coordinates
#[derive(Clone, Copy, Debug)]
pub struct View {
    pub tilt: f32,
    pub zoom: f32,
    pub labels: bool,
}

impl Default for View {
    fn default() -> Self {
        Self { tilt: 0.3, zoom: 1.0, labels: false }
    }
}

struct Projector {
    cx: f32,
    cy: f32,
    scale: f32,
    sin_tilt: f32,
    cos_tilt: f32,
    globe_radius: f32,
}

impl Projector {
    fn new(canvas: &Canvas, view: &View, globe_radius: f32) -> Self {
        let cx = canvas.dot_width() as f32 / 2.0;
        let cy = canvas.dot_height() as f32 / 2.0;
        let (sin_tilt, cos_tilt) = view.tilt.sin_cos();
        Self {
            cx,
            cy,
            scale: cx.min(cy) / VIEW_EXTENT * view.zoom,
            sin_tilt,
            cos_tilt,
            globe_radius,
        }
    }

    /// Tilt toward the viewer about X
    fn view_space(&self, p: SpatialPoint) -> Vec3 {
        Vec3::new(
            p.x,
            p.y * self.cos_tilt - p.z * self.sin_tilt,
            p.y * self.sin_tilt + p.z * self.cos_tilt,
        )
    }

    /// Dot coordinates, or `None` when the globe body hides the point
    fn to_dot(&self, p: SpatialPoint) -> Option<(i32, i32)> {
        let v = self.view_space(p);
        let behind = v.z < 0.0 && v.x * v.x + v.y * v.y < self.globe_radius * self.globe_radius;
        if behind {
            return None;
        }
        Some(((self.cx + v.x * self.scale) as i32, (self.cy - v.y * self.scale) as i32))
    }

    fn segment(&self, canvas: &mut Canvas, a: SpatialPoint, b: SpatialPoint, layer: Layer, color: Rgb) {
        let va = self.view_space(a);
        let vb = self.view_space(b);
        let span = ((vb.x - va.x).abs().max((vb.y - va.y).abs()) * self.scale).ceil() as usize;
        let steps = span.clamp(1, 512);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            if let Some((x, y)) = self.to_dot(a.lerp(b, t)) {
                canvas.plot(x, y, layer, color);
            }
        }
    }

    fn polyline(&self, canvas: &mut Canvas, points: &[SpatialPoint], spin: f32, layer: Layer, color: Rgb) {
        for w in points.windows(2) {
            self.segment(canvas, rotate_y(w[0], spin), rotate_y(w[1], spin), layer, color);
        }
    }
}

/// Rasterize one frame onto `canvas`
pub fn rasterize(frame: &Frame, view: &View, canvas: &mut Canvas) {
    let proj = Projector::new(canvas, view, frame.globe_radius);
    let spin = frame.globe_rotation;

    for star in frame.dust.iter() {
        let p = rotate_y(star.position, frame.dust_rotation) * DUST_SCALE;
        if let Some((x, y)) = proj.to_dot(p) {
            canvas.plot(x, y, Layer::Dust, star.tint.dim(0.4));
        }
    }

    for line in &frame.geometry.grid {
        proj.polyline(canvas, line, spin, Layer::Grid, colors::GRID);
    }

    for outline in &frame.geometry.outlines {
        let color = match outline.kind {
            OutlineKind::Continent => colors::CONTINENT,
            OutlineKind::Island => colors::ISLAND,
        };
        proj.polyline(canvas, &outline.points, spin, Layer::Outline, color);
    }

    for sat in &frame.satellites {
        if let Some(trail) = &sat.trail {
            proj.polyline(canvas, trail, 0.0, Layer::Trail, sat.color.dim(0.5));
        }
    }

    for flow in &frame.flows {
        let color = flow.color.dim(flow.opacity / 0.45);
        proj.polyline(canvas, &flow.arc.points, spin, Layer::Flow, color);
    }

    for marker in &frame.markers {
        let Some((mx, my)) = proj.to_dot(rotate_y(marker.anchor, spin)) else {
            continue;
        };
        canvas.plot(mx, my, Layer::Pulse, marker.color);
        for layer in &marker.layers {
            if layer.opacity < MIN_VISIBLE_OPACITY {
                continue;
            }
            let r = layer.scale * RING_DOT_RADIUS;
            let color = marker.color.dim(layer.opacity / 0.6);
            let steps = (r * 8.0).ceil().max(8.0) as usize;
            for i in 0..steps {
                let a = i as f32 / steps as f32 * std::f32::consts::TAU;
                let x = mx + (a.cos() * r).round() as i32;
                let y = my + (a.sin() * r).round() as i32;
                canvas.plot(x, y, Layer::Pulse, color);
            }
        }
    }

    for sat in &frame.satellites {
        if let Some((x, y)) = proj.to_dot(sat.position) {
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                canvas.plot(x + dx, y + dy, Layer::Satellite, sat.color);
            }
        }
    }
}

/// Draw a frame, plus optional city labels and a status line, into `term`
pub fn draw(frame: &Frame, view: &View, term: &mut Terminal, status: &str) {
    let (w, h) = term.size();
    let mut canvas = Canvas::new(w, h);
    rasterize(frame, view, &mut canvas);

    term.clear();
    canvas.blit(term);

    if view.labels {
        let proj = Projector::new(&canvas, view, frame.globe_radius);
        for marker in &frame.markers {
            if let Some((x, y)) = proj.to_dot(rotate_y(marker.label_anchor, frame.globe_rotation)) {
                let name = marker.name.to_uppercase();
                term.set_str(x / 2 + 1, y / 4, &name, Some(marker.color.to_terminal()), false);
            }
        }
    }

    if !status.is_empty() && h > 0 {
        term.set_str(0, h as i32 - 1, status, Some(colors::ISLAND.to_terminal()), false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::Engine;
    use crate::scene::Record;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn plot_keeps_highest_layer() {
        let mut c = Canvas::new(2, 2);
        c.plot(0, 0, Layer::Flow, colors::FLOW_PALETTE[0]);
        c.plot(0, 0, Layer::Grid, colors::GRID);
        let (_, color, _) = c.cell(0, 0).unwrap();
        assert_eq!(color, colors::FLOW_PALETTE[0]);
        assert!(c.is_set(0, 0));
        assert!(!c.is_set(1, 0));
    }

    #[test]
    fn out_of_bounds_plots_are_ignored() {
        let mut c = Canvas::new(2, 2);
        c.plot(-1, 0, Layer::Grid, colors::GRID);
        c.plot(4, 0, Layer::Grid, colors::GRID);
        c.plot(0, 8, Layer::Grid, colors::GRID);
        assert_eq!(c.lit_count(), 0);
    }

    #[test]
    fn braille_bits_follow_dot_layout() {
        let mut c = Canvas::new(1, 1);
        c.plot(0, 0, Layer::Grid, colors::GRID);
        c.plot(1, 3, Layer::Grid, colors::GRID);
        let (ch, _, bold) = c.cell(0, 0).unwrap();
        assert_eq!(ch, '\u{2881}');
        assert!(!bold);
    }

    #[test]
    fn far_side_of_globe_is_hidden() {
        let c = Canvas::new(40, 20);
        let view = View { tilt: 0.0, ..View::default() };
        let proj = Projector::new(&c, &view, 2.0);
        assert!(proj.to_dot(Vec3::new(0.0, 0.0, 2.0)).is_some());
        assert!(proj.to_dot(Vec3::new(0.0, 0.0, -2.0)).is_none());
        // Beyond the limb a rear point is still visible
        assert!(proj.to_dot(Vec3::new(2.8, 0.0, -0.5)).is_some());
    }

    #[test]
    fn frame_rasterizes_to_something() {
        let mut engine = Engine::new(EngineConfig::default(), &mut StdRng::seed_from_u64(5));
        engine.replace_records(vec![Record { name: "x".into(), ..Record::default() }; 4]);
        let frame = engine.tick(3.0);
        let mut canvas = Canvas::new(80, 40);
        rasterize(&frame, &View::default(), &mut canvas);
        assert!(canvas.lit_count() > 500);
    }

    #[test]
    fn draw_writes_labels_and_status() {
        let mut engine = Engine::new(EngineConfig::default(), &mut StdRng::seed_from_u64(5));
        engine.replace_records(vec![Record::default(); 2]);
        let frame = engine.tick(0.0);
        let mut term = Terminal::with_size(60, 30, false);
        let view = View { labels: true, ..View::default() };
        draw(&frame, &view, &mut term, "status");
        let bottom: String = (0..6).filter_map(|x| term.get(x, 29)).map(|c| c.ch).collect();
        assert_eq!(bottom, "status");
        let braille = (0..30u16)
            .flat_map(|y| (0..60u16).map(move |x| (x, y)))
            .filter(|&(x, y)| term.get(x, y).is_some_and(|c| ('\u{2801}'..='\u{28ff}').contains(&c.ch)))
            .count();
        assert!(braille > 0);
    }
}
