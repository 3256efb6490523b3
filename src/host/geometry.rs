//! Geometry values with their `{...}` string forms

use std::fmt;

use crate::parser::raw::format_number;

/// Pull every number out of a brace-and-comma string such as `{{0, 0}, {10, 20}}`
fn numbers(source: &str) -> Option<Vec<f64>> {
    source
        .split(|c: char| c == '{' || c == '}' || c == ',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok())
        .collect()
}

fn exactly<const N: usize>(source: &str) -> Option<[f64; N]> {
    numbers(source)?.try_into().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `{x, y}`
    pub fn parse(source: &str) -> Option<Self> {
        let [x, y] = exactly::<2>(source)?;
        Some(Self::new(x, y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", format_number(self.x), format_number(self.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `{{x, y}, {width, height}}`
    pub fn parse(source: &str) -> Option<Self> {
        let [x, y, width, height] = exactly::<4>(source)?;
        Some(Self::new(x, y, width, height))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}, {}}}",
            Point::new(self.x, self.y),
            Point::new(self.width, self.height)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// `{top, left, bottom, right}`
    pub fn parse(source: &str) -> Option<Self> {
        let [top, left, bottom, right] = exactly::<4>(source)?;
        Some(Self::new(top, left, bottom, right))
    }
}

impl fmt::Display for EdgeInsets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}, {}, {}, {}}}",
            format_number(self.top),
            format_number(self.left),
            format_number(self.bottom),
            format_number(self.right)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_string_form() {
        let rect = Rect::parse("{{10, 20}, {100, 50.5}}").unwrap();
        assert_eq!(rect, Rect::new(10.0, 20.0, 100.0, 50.5));
        assert_eq!(rect.to_string(), "{{10, 20}, {100, 50.5}}");
        assert_eq!(rect.right(), 110.0);
    }

    #[test]
    fn test_insets_and_points() {
        assert_eq!(
            EdgeInsets::parse("{1, 2, 3, 4}"),
            Some(EdgeInsets::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(Point::parse("{-5, 7}"), Some(Point::new(-5.0, 7.0)));
        assert_eq!(Point::new(0.0, 3.0).to_string(), "{0, 3}");
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        assert_eq!(Rect::parse("{1, 2}"), None);
        assert_eq!(Point::parse("{a, b}"), None);
        assert_eq!(EdgeInsets::parse(""), None);
    }
}
