/// ASCII rasterizer for terminal rendering
///
/// The renderer is a [`Surface`]: the viewport builds its shape tree in an
/// inner [`RecordingSurface`], and [`AsciiRenderer::rasterize`] paints that
/// tree back to front into a grid of character cells, one cell per surface
/// unit. Later shapes overwrite earlier ones.
use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use gfx3d_core::{
    surface::{transform_point, RecordedShape},
    Affine2, Color, Ellipse, Geometry, Paint, PathSegment, RecordingSurface, ShapeId, Stroke,
    Surface,
};
use nalgebra::{Point2, Vector2};
use std::f64::consts::TAU;
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Line segments used for a full turn of an ellipse or arc.
const CURVE_STEPS: usize = 48;

/// A flattened subpath in surface coordinates.
#[derive(Debug, Clone, PartialEq)]
struct Contour {
    points: Vec<Point2<f64>>,
    closed: bool,
}

pub struct AsciiRenderer {
    surface: RecordingSurface,
    width: usize,
    height: usize,
    cells: Vec<Option<Color>>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            surface: RecordingSurface::new(),
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![None; width * height];
    }

    /// The shape tree built so far.
    pub fn recording(&self) -> &RecordingSurface {
        &self.surface
    }

    /// Empties the cell grid; the shape tree is kept.
    pub fn clear_cells(&mut self) {
        self.cells.fill(None);
    }

    /// Repaints the cell grid from the shape tree.
    pub fn rasterize(&mut self) {
        self.clear_cells();
        for id in self.surface.paint_order() {
            let Some(shape) = self.surface.shape(id) else {
                continue;
            };
            let transform = self.surface.world_transform(id);
            let contours = flatten(shape, &transform);
            let (fill, stroke) = (shape.fill.clone(), shape.stroke);
            if let Some(paint) = fill {
                let local = transform.try_inverse().unwrap_or_else(Affine2::identity);
                for (x, y) in self.fill_cells(&contours) {
                    let center = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
                    let color = match &paint {
                        Paint::Solid(color) => *color,
                        Paint::Linear(gradient) => {
                            gradient.sample(&transform_point(&local, &center))
                        }
                    };
                    self.set(x, y, color);
                }
            }
            if let Some(stroke) = stroke {
                self.stroke(&contours, &stroke);
            }
        }
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            None
        }
    }

    pub fn glyph(&self, x: usize, y: usize) -> char {
        self.cell(x, y).map(glyph).unwrap_or(' ')
    }

    /// Plain-text rows of the last rasterized frame.
    pub fn rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| (0..self.width).map(|x| self.glyph(x, y)).collect())
            .collect()
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                match self.cell(x, y) {
                    Some(color) => {
                        let (r, g, b) = color.to_rgb8();
                        writer.queue(SetForegroundColor(TermColor::Rgb { r, g, b }))?;
                        writer.queue(Print(glyph(color)))?;
                    }
                    None => {
                        writer.queue(Print(' '))?;
                    }
                }
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    fn set(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = Some(color);
        }
    }

    /// Cells whose centers are inside the contours, by the even-odd rule.
    fn fill_cells(&self, contours: &[Contour]) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            let scan = y as f64 + 0.5;
            let mut crossings: Vec<f64> = Vec::new();
            for contour in contours {
                // Fills always close the contour
                for (a, b) in edges(&contour.points, true) {
                    if (a.y <= scan) != (b.y <= scan) {
                        crossings.push(a.x + (scan - a.y) / (b.y - a.y) * (b.x - a.x));
                    }
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0) as usize;
                let end = (span[1] - 0.5).floor().min(self.width as f64 - 1.0);
                if end < 0.0 {
                    continue;
                }
                for x in start..=end as usize {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    /// Walks the visible part of every edge with a DDA, one cell per step.
    fn stroke(&mut self, contours: &[Contour], stroke: &Stroke) {
        let (width, height) = (self.width as f64, self.height as f64);
        for contour in contours {
            if let [only] = contour.points.as_slice() {
                self.plot(only, stroke.color);
            }
            for (a, b) in edges(&contour.points, contour.closed) {
                let Some((a, b)) = clip_segment(a, b, width, height) else {
                    continue;
                };
                let delta = b - a;
                let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;
                for i in 0..=steps {
                    let p = a + delta * (i as f64 / steps as f64);
                    self.plot(&p, stroke.color);
                }
            }
        }
    }

    fn plot(&mut self, p: &Point2<f64>, color: Color) {
        if p.x >= 0.0 && p.y >= 0.0 {
            self.set(p.x.floor() as usize, p.y.floor() as usize, color);
        }
    }
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl Surface for AsciiRenderer {
    fn create_group(&mut self, parent: Option<ShapeId>) -> ShapeId {
        self.surface.create_group(parent)
    }

    fn create_path(&mut self, parent: ShapeId) -> ShapeId {
        self.surface.create_path(parent)
    }

    fn create_polyline(&mut self, parent: ShapeId, points: &[Point2<f64>]) -> ShapeId {
        self.surface.create_polyline(parent, points)
    }

    fn create_ellipse(&mut self, parent: ShapeId, ellipse: Ellipse) -> ShapeId {
        self.surface.create_ellipse(parent, ellipse)
    }

    fn set_shape(&mut self, shape: ShapeId, geometry: Geometry) {
        self.surface.set_shape(shape, geometry)
    }

    fn set_stroke(&mut self, shape: ShapeId, stroke: Option<Stroke>) {
        self.surface.set_stroke(shape, stroke)
    }

    fn set_fill(&mut self, shape: ShapeId, fill: Option<Paint>) {
        self.surface.set_fill(shape, fill)
    }

    fn set_transform(&mut self, shape: ShapeId, transform: Affine2) {
        self.surface.set_transform(shape, transform)
    }

    fn apply_transform(&mut self, shape: ShapeId, transform: &Affine2) {
        self.surface.apply_transform(shape, transform)
    }

    fn clear(&mut self, group: ShapeId) {
        self.surface.clear(group)
    }

    fn remove(&mut self, shape: ShapeId) {
        self.surface.remove(shape)
    }
}

/// Ramp character for a color's brightness; anything painted is at least a dot.
fn glyph(color: Color) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = 1 + (color.luminance().clamp(0.0, 1.0) * (last - 1) as f64).round() as usize;
    LUMINOSITY_RAMP[index.min(last)]
}

fn edges(points: &[Point2<f64>], closed: bool) -> Vec<(Point2<f64>, Point2<f64>)> {
    let mut out: Vec<_> = points.windows(2).map(|w| (w[0], w[1])).collect();
    if closed && points.len() > 2 {
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            if first != last {
                out.push((*last, *first));
            }
        }
    }
    out
}

/// Liang-Barsky clip of the segment `a..b` to `[0, width] x [0, height]`.
fn clip_segment(
    a: Point2<f64>,
    b: Point2<f64>,
    width: f64,
    height: f64,
) -> Option<(Point2<f64>, Point2<f64>)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-d.x, a.x), (d.x, width - a.x), (-d.y, a.y), (d.y, height - a.y)] {
        if p == 0.0 {
            // Parallel to this boundary and outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((a + d * t0, a + d * t1))
}

/// Point on an ellipse at parametric angle `t`.
fn ellipse_point(center: &Point2<f64>, rx: f64, ry: f64, rotation: f64, t: f64) -> Point2<f64> {
    let major = Vector2::new(rotation.cos(), rotation.sin());
    let minor = Vector2::new(-rotation.sin(), rotation.cos());
    center + major * (rx * t.cos()) + minor * (ry * t.sin())
}

/// Turns a shape into contours in surface coordinates.
fn flatten(shape: &RecordedShape, transform: &Affine2) -> Vec<Contour> {
    let mut contours = match &shape.geometry {
        Geometry::Group => Vec::new(),
        Geometry::Polyline(points) => vec![Contour {
            points: points.clone(),
            closed: points.len() > 2 && points.first() == points.last(),
        }],
        Geometry::Ellipse(e) => vec![Contour {
            points: (0..CURVE_STEPS)
                .map(|i| {
                    let t = TAU * i as f64 / CURVE_STEPS as f64;
                    ellipse_point(&e.center, e.rx, e.ry, 0.0, t)
                })
                .collect(),
            closed: true,
        }],
        Geometry::Path(segments) => flatten_path(segments),
    };
    for contour in &mut contours {
        for p in &mut contour.points {
            *p = transform_point(transform, p);
        }
    }
    contours
}

fn flatten_path(segments: &[PathSegment]) -> Vec<Contour> {
    let mut contours = Vec::new();
    let mut current: Vec<Point2<f64>> = Vec::new();
    for segment in segments {
        match *segment {
            PathSegment::MoveTo(p) => {
                if current.len() > 1 {
                    contours.push(Contour {
                        points: std::mem::take(&mut current),
                        closed: false,
                    });
                }
                current = vec![p];
            }
            PathSegment::LineTo(p) => current.push(p),
            PathSegment::Arc {
                center,
                rx,
                ry,
                rotation,
                start,
                sweep,
            } => {
                let steps = ((sweep.abs() / TAU) * CURVE_STEPS as f64).ceil().max(1.0) as usize;
                current.extend((0..=steps).map(|i| {
                    let t = start + sweep * i as f64 / steps as f64;
                    ellipse_point(&center, rx, ry, rotation, t)
                }));
            }
            PathSegment::Close => {
                if !current.is_empty() {
                    let start = current[0];
                    contours.push(Contour {
                        points: std::mem::take(&mut current),
                        closed: true,
                    });
                    // Drawing continues from the start of the closed subpath
                    current.push(start);
                }
            }
        }
    }
    if current.len() > 1 {
        contours.push(Contour {
            points: current,
            closed: false,
        });
    }
    contours
}
