//! Image shape: a placed raster reference.
//!
//! The engine only tracks the frame and the source reference; decoding and
//! drawing pixels belongs to the renderer.

use super::{ShapeStyle, ShapeTrait, box_attachment, box_hit, map_point, scale_factors, MIN_EXTENT};
use super::rectangle::normalize_box;
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Size, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Top-left corner position.
    pub origin: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Opaque source reference (URL, asset key or data URI); empty until assigned.
    #[serde(default)]
    pub source: String,
    /// Pixel size of the source, when known.
    #[serde(default)]
    pub source_size: Option<Size>,
    /// Keep the source aspect ratio when resizing.
    #[serde(default = "default_lock_aspect")]
    pub lock_aspect: bool,
}

fn default_lock_aspect() -> bool {
    true
}

impl Image {
    pub const DEFAULT_WIDTH: f64 = 160.0;
    pub const DEFAULT_HEIGHT: f64 = 120.0;

    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
            source: String::new(),
            source_size: None,
            lock_aspect: true,
        }
    }

    pub fn placed(origin: Point) -> Self {
        Self::new(origin, Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, (self.width, self.height))
    }

    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.origin = rect.origin();
        self.width = rect.width();
        self.height = rect.height();
    }

    /// Source height divided by source width, if the source size is usable.
    pub fn source_aspect(&self) -> Option<f64> {
        self.source_size
            .filter(|s| s.width > 0.0 && s.height > 0.0 && s.width.is_finite() && s.height.is_finite())
            .map(|s| s.height / s.width)
    }

    /// Assign a source and fit the frame height to its aspect ratio.
    pub fn set_source(&mut self, source: impl Into<String>, size: Option<Size>) {
        self.source = source.into();
        self.source_size = size;
        self.finalize();
    }
}

impl ShapeTrait for Image {
    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, style: &ShapeStyle, tolerance: f64) -> bool {
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
        normalize_box(&mut self.origin, &mut self.width, &mut self.height);
        if !self.lock_aspect {
            return;
        }
        if let Some(aspect) = self.source_aspect() {
            self.height = (self.width * aspect).max(MIN_EXTENT);
        }
    }
}
