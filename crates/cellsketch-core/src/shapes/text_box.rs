//! Text box shape: a fixed-width frame holding a label.

use super::{ShapeStyle, ShapeTrait, box_attachment, box_hit, map_point, scale_factors, MIN_EXTENT};
use super::rectangle::normalize_box;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Light,
    #[default]
    Regular,
    Bold,
}

/// Horizontal alignment of the label inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Top-left corner of the frame.
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub content: String,
    /// Font size in world units.
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub align: TextAlign,
}

impl TextBox {
    pub const DEFAULT_WIDTH: f64 = 160.0;
    pub const DEFAULT_HEIGHT: f64 = 40.0;
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;
    pub const MIN_FONT_SIZE: f64 = 4.0;
    pub const MAX_FONT_SIZE: f64 = 400.0;
    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.25;

    pub fn new(origin: Point, width: f64, height: f64, content: impl Into<String>) -> Self {
        Self {
            origin,
            width,
            height,
            content: content.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_weight: FontWeight::default(),
            align: TextAlign::default(),
        }
    }

    pub fn placed(origin: Point) -> Self {
        Self::new(origin, Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT, "")
    }

    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, (self.width, self.height))
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.origin = rect.origin();
        self.width = rect.width();
        self.height = rect.height();
    }

    /// Height of a single line of text at the current font size.
    pub fn line_height(&self) -> f64 {
        self.font_size * Self::LINE_HEIGHT
    }
}

impl ShapeTrait for TextBox {
    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, style: &ShapeStyle, tolerance: f64) -> bool {
        // The label occupies the whole frame, so text boxes are always solid
        box_hit(self.as_rect(), point, style, tolerance, true)
    }

    fn attachment_point(&self, near: Point) -> Point {
        box_attachment(self.as_rect(), near)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn translate(&mut self, delta: Vec2) {
        self.origin += delta;
    }

    fn scale_to_bounds(&mut self, from: Rect, to: Rect) {
        let (sx, sy) = scale_factors(from, to);
        self.origin = map_point(self.origin, from, to);
        self.width *= sx;
        self.height *= sy;
    }

    fn finalize(&mut self) {
        self.font_size = if self.font_size.is_finite() {
            self.font_size.clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE)
        } else {
            Self::DEFAULT_FONT_SIZE
        };
        normalize_box(&mut self.origin, &mut self.width, &mut self.height);
        self.height = self.height.max(self.line_height()).max(MIN_EXTENT);
    }
}
