//! Stroke and fill styling shared by every diagram object.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Same color with its alpha channel multiplied by `opacity`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let alpha = (f64::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a: alpha, ..self }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Dash pattern of an outline or connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl StrokeStyle {
    /// Cycle to the next stroke style.
    pub fn next(self) -> Self {
        match self {
            StrokeStyle::Solid => StrokeStyle::Dashed,
            StrokeStyle::Dashed => StrokeStyle::Dotted,
            StrokeStyle::Dotted => StrokeStyle::Solid,
        }
    }
}

/// Style properties for diagram objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width in world units.
    pub stroke_width: f64,
    /// Fill color (None = outline only).
    #[serde(default)]
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub stroke_style: StrokeStyle,
}

fn default_opacity() -> f64 {
    1.0
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
            stroke_style: StrokeStyle::Solid,
        }
    }
}

impl ShapeStyle {
    /// Whether the interior of closed shapes is painted (and therefore hittable).
    pub fn is_filled(&self) -> bool {
        self.fill_color.is_some_and(|c| c.a > 0)
    }

    /// Half the stroke width, never negative.
    pub fn half_stroke(&self) -> f64 {
        self.stroke_width.max(0.0) / 2.0
    }

    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Color {
        self.stroke_color.with_opacity(self.opacity).into()
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill_color.map(|c| c.with_opacity(self.opacity).into())
    }

    /// Set the fill color from a peniko Color.
    pub fn set_fill(&mut self, color: Option<Color>) {
        self.fill_color = color.map(Into::into);
    }

    /// Clamp out-of-range values into their valid domain.
    pub fn normalize(&mut self) {
        self.stroke_width = if self.stroke_width.is_finite() {
            self.stroke_width.max(0.0)
        } else {
            0.0
        };
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_roundtrip_through_peniko() {
        let color = SerializableColor::new(10, 20, 30, 200);
        let peniko: Color = color.into();
        assert_eq!(SerializableColor::from(peniko), color);
    }

    #[test]
    fn test_opacity_applied() {
        let style = ShapeStyle {
            opacity: 0.5,
            ..ShapeStyle::default()
        };
        let stroke = SerializableColor::from(style.stroke_with_opacity());
        assert_eq!(stroke.a, 128);
    }

    #[test]
    fn test_normalize_clamps() {
        let mut style = ShapeStyle {
            stroke_width: -3.0,
            opacity: f64::NAN,
            ..ShapeStyle::default()
        };
        style.normalize();
        assert_eq!(style.stroke_width, 0.0);
        assert_eq!(style.opacity, 1.0);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"stroke_color":{"r":1,"g":2,"b":3,"a":255},"stroke_width":1.5}"#;
        let style: ShapeStyle = serde_json::from_str(json).unwrap();
        assert!(style.fill_color.is_none());
        assert_eq!(style.opacity, 1.0);
        assert_eq!(style.stroke_style, StrokeStyle::Solid);
    }

    #[test]
    fn test_transparent_fill_is_not_filled() {
        let mut style = ShapeStyle::default();
        style.fill_color = Some(SerializableColor::new(0, 0, 0, 0));
        assert!(!style.is_filled());
        style.fill_color = Some(SerializableColor::white());
        assert!(style.is_filled());
    }
}
