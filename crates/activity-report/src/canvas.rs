//! Vector drawing surface for one PDF page.
//!
//! [`PageCanvas`] records PDF content-stream operators in page coordinates
//! (origin top-left, y down, one unit per point). [`PdfBackend`] lets
//! `plotters` draw charts onto a canvas; once the backend is dropped the
//! canvas can be annotated directly and handed to the document.

use std::convert::Infallible;

use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind, FontTransform,
};
use unicode_width::UnicodeWidthStr;

use activity_core::error::{ActivityError, Result};

/// Resource name of the page font (Helvetica, WinAnsi encoding).
pub const FONT_RESOURCE: &str = "F1";

/// Average Helvetica advance width, in em.
const AVERAGE_GLYPH_WIDTH: f64 = 0.55;
const ASCENT: f64 = 0.72;
const DESCENT: f64 = 0.21;
/// Control-point distance for a quarter circle drawn with one cubic Bézier.
const BEZIER_CIRCLE: f64 = 0.552_284_8;

/// 8-bit RGB.
pub type Rgb = (u8, u8, u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Estimated advance width of `text` at `size` points.
pub fn text_width(text: &str, size: f64) -> f64 {
    text.width() as f64 * size * AVERAGE_GLYPH_WIDTH
}

/// Encode `text` for a WinAnsi simple font. Characters the encoding lacks
/// become `?`.
pub fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

/// Composite a possibly translucent color over the white page.
fn flatten(color: BackendColor) -> Option<Rgb> {
    if color.alpha <= 0.0 {
        return None;
    }
    let alpha = color.alpha.min(1.0);
    let mix = |c: u8| (255.0 - (255.0 - c as f64) * alpha).round() as u8;
    let (r, g, b) = color.rgb;
    Some((mix(r), mix(g), mix(b)))
}

fn num(value: f64) -> Object {
    let rounded = (value * 100.0).round() / 100.0;
    Object::Real((rounded as f32).into())
}

fn rgb_operands((r, g, b): Rgb) -> Vec<Object> {
    vec![
        num(r as f64 / 255.0),
        num(g as f64 / 255.0),
        num(b as f64 / 255.0),
    ]
}

// ── PageCanvas ────────────────────────────────────────────────────────────────

/// A string drawn on the page and the point it was anchored at, in
/// top-down page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub anchor: (f64, f64),
    pub size: f64,
}

/// Recorded drawing operations for a single page.
#[derive(Debug)]
pub struct PageCanvas {
    width: u32,
    height: u32,
    operations: Vec<Operation>,
    text_runs: Vec<TextRun>,
}

impl PageCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            operations: vec![
                Operation::new("J", vec![1.into()]),
                Operation::new("j", vec![1.into()]),
            ],
            text_runs: Vec::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Every string drawn on the page, in drawing order.
    pub fn text_runs(&self) -> &[TextRun] {
        &self.text_runs
    }

    /// Flip a top-down y coordinate into PDF space.
    fn flip(&self, y: f64) -> f64 {
        self.height as f64 - y
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn point(&mut self, operator: &str, (x, y): (f64, f64)) {
        let y = self.flip(y);
        self.op(operator, vec![num(x), num(y)]);
    }

    fn set_stroke(&mut self, color: Rgb, width: f64) {
        self.op("RG", rgb_operands(color));
        self.op("w", vec![num(width.max(0.1))]);
    }

    fn set_fill(&mut self, color: Rgb) {
        self.op("rg", rgb_operands(color));
    }

    pub fn stroke_polyline(&mut self, points: &[(f64, f64)], color: Rgb, width: f64) {
        if points.len() < 2 {
            return;
        }
        self.set_stroke(color, width);
        self.point("m", points[0]);
        for &p in &points[1..] {
            self.point("l", p);
        }
        self.op("S", vec![]);
    }

    pub fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb, width: f64) {
        self.stroke_polyline(&[from, to], color, width);
    }

    /// Axis-aligned rectangle between two opposite corners.
    pub fn rect(&mut self, a: (f64, f64), b: (f64, f64), color: Rgb, fill: bool, width: f64) {
        let x = a.0.min(b.0);
        let top = a.1.min(b.1);
        let w = (a.0 - b.0).abs();
        let h = (a.1 - b.1).abs();
        let bottom = self.flip(top + h);
        if fill {
            self.set_fill(color);
        } else {
            self.set_stroke(color, width);
        }
        self.op("re", vec![num(x), num(bottom), num(w), num(h)]);
        self.op(if fill { "f" } else { "S" }, vec![]);
    }

    pub fn fill_polygon(&mut self, points: &[(f64, f64)], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        self.set_fill(color);
        self.point("m", points[0]);
        for &p in &points[1..] {
            self.point("l", p);
        }
        self.op("h", vec![]);
        self.op("f", vec![]);
    }

    pub fn circle(&mut self, center: (f64, f64), radius: f64, color: Rgb, fill: bool, width: f64) {
        let (cx, cy) = (center.0, self.flip(center.1));
        let (r, k) = (radius, radius * BEZIER_CIRCLE);
        if fill {
            self.set_fill(color);
        } else {
            self.set_stroke(color, width);
        }
        self.op("m", vec![num(cx + r), num(cy)]);
        let arcs = [
            [(cx + r, cy + k), (cx + k, cy + r), (cx, cy + r)],
            [(cx - k, cy + r), (cx - r, cy + k), (cx - r, cy)],
            [(cx - r, cy - k), (cx - k, cy - r), (cx, cy - r)],
            [(cx + k, cy - r), (cx + r, cy - k), (cx + r, cy)],
        ];
        for arc in arcs {
            let operands = arc.iter().flat_map(|&(x, y)| [num(x), num(y)]).collect();
            self.op("c", operands);
        }
        self.op("h", vec![]);
        self.op(if fill { "f" } else { "S" }, vec![]);
    }

    /// Draw `text` so that the point `anchor` sits at the given alignment of
    /// the text box. `angle` is counter-clockwise, in degrees, and rotates the
    /// text around the anchor.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        text: &str,
        anchor: (f64, f64),
        size: f64,
        color: Rgb,
        angle: f64,
        h: HAlign,
        v: VAlign,
    ) {
        if text.is_empty() {
            return;
        }
        let width = text_width(text, size);
        let dx = match h {
            HAlign::Left => 0.0,
            HAlign::Center => -width / 2.0,
            HAlign::Right => -width,
        };
        // Baseline offset in the text's own frame (y up).
        let dy = match v {
            VAlign::Top => -size * ASCENT,
            VAlign::Center => -size * (ASCENT - DESCENT) / 2.0,
            VAlign::Bottom => size * DESCENT,
        };

        let (sin, cos) = angle.to_radians().sin_cos();
        let ax = anchor.0;
        let ay = self.flip(anchor.1);
        let origin_x = ax + dx * cos - dy * sin;
        let origin_y = ay + dx * sin + dy * cos;

        self.op("BT", vec![]);
        self.set_fill(color);
        self.op(
            "Tf",
            vec![Object::Name(FONT_RESOURCE.as_bytes().to_vec()), num(size)],
        );
        self.op(
            "Tm",
            vec![
                num(cos),
                num(sin),
                num(-sin),
                num(cos),
                num(origin_x),
                num(origin_y),
            ],
        );
        self.op(
            "Tj",
            vec![Object::String(win_ansi_bytes(text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
        self.text_runs.push(TextRun {
            text: text.to_string(),
            anchor,
            size,
        });
    }

    /// Encode the recorded operations as a content stream.
    pub fn into_content(self) -> Result<Vec<u8>> {
        Content {
            operations: self.operations,
        }
        .encode()
        .map_err(|e| ActivityError::Pdf(e.to_string()))
    }
}

// ── PdfBackend ────────────────────────────────────────────────────────────────

/// `plotters` drawing backend writing into a [`PageCanvas`].
pub struct PdfBackend<'a> {
    canvas: &'a mut PageCanvas,
}

impl<'a> PdfBackend<'a> {
    pub fn new(canvas: &'a mut PageCanvas) -> Self {
        Self { canvas }
    }
}

fn to_point((x, y): BackendCoord) -> (f64, f64) {
    (x as f64, y as f64)
}

/// Counter-clockwise page rotation for a plotters font transform.
/// Plotters rotates clockwise on a y-down surface.
fn rotation_degrees(transform: FontTransform) -> f64 {
    match transform {
        FontTransform::None => 0.0,
        FontTransform::Rotate90 => -90.0,
        FontTransform::Rotate180 => 180.0,
        FontTransform::Rotate270 => 90.0,
    }
}

impl DrawingBackend for PdfBackend<'_> {
    type ErrorType = Infallible;

    fn get_size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    fn ensure_prepared(&mut self) -> std::result::Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn present(&mut self) -> std::result::Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> std::result::Result<(), DrawingErrorKind<Infallible>> {
        if let Some(rgb) = flatten(color) {
            let (x, y) = to_point(point);
            self.canvas.rect((x, y), (x + 1.0, y + 1.0), rgb, true, 0.0);
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> std::result::Result<(), DrawingErrorKind<Infallible>> {
        if let Some(rgb) = flatten(style.color()) {
            self.canvas
                .stroke_line(to_point(from), to_point(to), rgb, style.stroke_width() as f64);
        }
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> std::result::Result<(), DrawingErrorKind<Infallible>> {
        if let Some(rgb) = flatten(style.color()) {
            self.canvas.rect(
                to_point(upper_left),
                to_point(bottom_right),
                rgb,
                fill,
                style.stroke_width() as f64,
            );
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> std::result::Result<(), DrawingErrorKind<Infallible>> {
        if let Some(rgb) = flatten(style.color()) {
            let points: Vec<(f64, f64)> = path.into_iter().map(to_point).collect();
            self.canvas
                .stroke_polyline(&points, rgb, style.stroke_width() as f64);
        }
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> std::result::Result<(), DrawingErrorKind<Infallible>> {
        if let Some(rgb) = flatten(style.color()) {
            self.canvas.circle(
                to_point(center),
                radius as f64,
                rgb,
                fill,
                style.stroke_width() as f64,
            );
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> std::result::Result<(), DrawingErrorKind<Infallible>> {
        if let Some(rgb) = flatten(style.color()) {
            let points: Vec<(f64, f64)> = vert.into_iter().map(to_point).collect();
            self.canvas.fill_polygon(&points, rgb);
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> std::result::Result<(), DrawingErrorKind<Infallible>> {
        let Some(rgb) = flatten(style.color()) else {
            return Ok(());
        };
        let anchor = style.anchor();
        let h = match anchor.h_pos {
            HPos::Left => HAlign::Left,
            HPos::Center => HAlign::Center,
            HPos::Right => HAlign::Right,
        };
        let v = match anchor.v_pos {
            VPos::Top => VAlign::Top,
            VPos::Center => VAlign::Center,
            VPos::Bottom => VAlign::Bottom,
        };
        self.canvas.text(
            text,
            to_point(pos),
            style.size(),
            rgb,
            rotation_degrees(style.transform()),
            h,
            v,
        );
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> std::result::Result<(u32, u32), DrawingErrorKind<Infallible>> {
        let size = style.size();
        Ok((text_width(text, size).ceil() as u32, size.ceil() as u32))
    }
}
