//! Drawing primitives that append PDF content-stream operations.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner of
//! the page.

use air_quality_style::Rgb;
use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

use crate::fonts::{Font, encode};

/// Bezier control distance for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// A run of text in a single face and colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// Text to draw.
    pub text: String,
    /// Face.
    pub font: Font,
    /// Fill colour.
    pub color: Rgb,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub fn new(text: impl Into<String>, font: Font, color: Rgb) -> Self {
        Self {
            text: text.into(),
            font,
            color,
        }
    }

    /// Width in points at `size`.
    #[must_use]
    pub fn width(&self, size: f32) -> f32 {
        self.font.width(&self.text, size)
    }
}

/// Total width of a line of spans.
#[must_use]
pub fn spans_width(spans: &[Span], size: f32) -> f32 {
    spans.iter().map(|s| s.width(size)).sum()
}

/// Accumulates the operations for one page layer.
#[derive(Debug, Default)]
pub struct Canvas {
    operations: Vec<Operation>,
}

fn real(v: f32) -> Object {
    Object::Real(v)
}

fn name(n: &str) -> Object {
    Object::Name(n.as_bytes().to_vec())
}

impl Canvas {
    /// Creates an empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations drawn so far.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Consumes the canvas, returning its operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    /// Saves the graphics state.
    pub fn save(&mut self) {
        self.op("q", vec![]);
    }

    /// Restores the graphics state.
    pub fn restore(&mut self) {
        self.op("Q", vec![]);
    }

    /// Sets the non-stroking colour.
    pub fn set_fill(&mut self, color: Rgb) {
        let [r, g, b] = color.unit();
        self.op("rg", vec![real(r), real(g), real(b)]);
    }

    /// Sets the stroking colour.
    pub fn set_stroke(&mut self, color: Rgb) {
        let [r, g, b] = color.unit();
        self.op("RG", vec![real(r), real(g), real(b)]);
    }

    /// Fills an axis-aligned rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.save();
        self.set_fill(color);
        self.op("re", vec![real(x), real(y), real(width), real(height)]);
        self.op("f", vec![]);
        self.restore();
    }

    /// Strokes a rectangle with rounded corners.
    #[allow(clippy::too_many_arguments)]
    pub fn stroke_round_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        line_width: f32,
        color: Rgb,
    ) {
        let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        let k = r * KAPPA;
        let (x1, y1) = (x + width, y + height);

        self.save();
        self.set_stroke(color);
        self.op("w", vec![real(line_width)]);
        self.op("m", vec![real(x + r), real(y)]);
        self.op("l", vec![real(x1 - r), real(y)]);
        self.curve([x1 - r + k, y, x1, y + r - k, x1, y + r]);
        self.op("l", vec![real(x1), real(y1 - r)]);
        self.curve([x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1]);
        self.op("l", vec![real(x + r), real(y1)]);
        self.curve([x + r - k, y1, x, y1 - r + k, x, y1 - r]);
        self.op("l", vec![real(x), real(y + r)]);
        self.curve([x, y + r - k, x + r - k, y, x + r, y]);
        self.op("h", vec![]);
        self.op("S", vec![]);
        self.restore();
    }

    fn curve(&mut self, points: [f32; 6]) {
        self.op("c", points.into_iter().map(real).collect());
    }

    /// Draws a single run of text with its baseline starting at `(x, y)`.
    pub fn text(&mut self, x: f32, y: f32, size: f32, span: &Span) {
        self.spans(x, y, size, std::slice::from_ref(span));
    }

    /// Draws consecutive spans on one baseline starting at `(x, y)`.
    pub fn spans(&mut self, x: f32, y: f32, size: f32, spans: &[Span]) {
        if spans.is_empty() {
            return;
        }
        self.op("BT", vec![]);
        self.op("Td", vec![real(x), real(y)]);
        for span in spans {
            self.op("Tf", vec![name(span.font.resource_name()), real(size)]);
            self.set_fill(span.color);
            self.op(
                "Tj",
                vec![Object::String(encode(&span.text), StringFormat::Literal)],
            );
        }
        self.op("ET", vec![]);
    }

    /// Draws consecutive spans so that the line ends at `right`.
    pub fn spans_right(&mut self, right: f32, y: f32, size: f32, spans: &[Span]) {
        let width = spans_width(spans, size);
        self.spans(right - width, y, size, spans);
    }

    /// Paints a named image `XObject` into the given box.
    pub fn image(&mut self, resource: &str, x: f32, y: f32, width: f32, height: f32) {
        self.save();
        self.op(
            "cm",
            vec![
                real(width),
                real(0.0),
                real(0.0),
                real(height),
                real(x),
                real(y),
            ],
        );
        self.op("Do", vec![name(resource)]);
        self.restore();
    }
}

/// Concatenated text of every `Tj` operation, in drawing order.
#[must_use]
pub fn shown_text(operations: &[Operation]) -> Vec<u8> {
    operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .flat_map(|op| &op.operands)
        .filter_map(|operand| match operand {
            Object::String(bytes, _) => Some(bytes.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}
