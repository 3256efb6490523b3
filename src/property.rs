//! Property dispatch
//!
//! Maps a flat property name to a capability on the live widget. Setting goes through
//! [`apply`]; reading the current value back as a string, for the properties that can be
//! restored, goes through [`retrieve`]. Names that are not in the vocabulary and widgets that
//! lack the capability are skipped without complaint.

use crate::host::{ContentMode, EdgeInsets, LineBreakMode, Point, Rect, TextAlignment, Widget};
use crate::parser::raw::format_number;
use crate::stylesheet::{Color, Palette};

/// Every name [`apply`] understands
pub const SETTABLE_PROPERTIES: &[&str] = &[
    "frame",
    "backgroundColor",
    "cornerRadius",
    "borderWidth",
    "borderColor",
    "alpha",
    "clipToBounds",
    "clipsToBounds",
    "contentMode",
    "hidden",
    "text",
    "textColor",
    "lineBreakMode",
    "textAlignment",
    "numberOfLines",
    "fontSize",
    "image",
    "backgroundImage",
    "contentInset",
    "contentOffset",
    "placeholder",
    "translucent",
    "tintColor",
];

/// Every name [`retrieve`] can read back
pub const RETRIEVABLE_PROPERTIES: &[&str] = &[
    "frame",
    "backgroundColor",
    "cornerRadius",
    "borderWidth",
    "borderColor",
    "alpha",
    "clipToBounds",
    "clipsToBounds",
    "contentMode",
    "hidden",
    "text",
    "textColor",
    "lineBreakMode",
    "textAlignment",
    "numberOfLines",
    "fontSize",
    "contentInset",
    "contentOffset",
    "placeholder",
    "translucent",
    "tintColor",
];

/// Locale-independent float parsing
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn bool_text(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

fn optional_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Apply one property. Returns `false` when the name is not in the vocabulary.
pub fn apply(widget: &mut dyn Widget, name: &str, value: &str, palette: &Palette) -> bool {
    match name {
        "frame" => {
            if let Some(frame) = Rect::parse(value) {
                widget.set_frame(frame);
            }
        }
        "backgroundColor" => {
            let color = palette.resolve(value).unwrap_or(Color::CLEAR);
            widget.set_background_color(Some(color));
        }
        "cornerRadius" => widget.set_corner_radius(parse_number(value).unwrap_or(0.0)),
        "borderWidth" => widget.set_border_width(parse_number(value).unwrap_or(0.0)),
        "borderColor" => widget.set_border_color(palette.resolve(value)),
        "alpha" => widget.set_alpha(parse_number(value).unwrap_or(1.0)),
        "clipToBounds" | "clipsToBounds" => widget.set_clips_to_bounds(parse_bool(value)),
        "contentMode" => {
            if let Some(mode) = ContentMode::from_name(value.trim()) {
                widget.set_content_mode(mode);
            }
        }
        "hidden" => widget.set_hidden(parse_bool(value)),

        // Text
        "text" => {
            if let Some(w) = widget.as_text() {
                w.set_text(optional_text(value));
            }
        }
        "textColor" => {
            if let (Some(w), Some(color)) = (widget.as_text_color(), palette.resolve(value)) {
                w.set_text_color(Some(color));
            }
        }
        "lineBreakMode" => {
            if let (Some(w), Some(mode)) =
                (widget.as_line_break_mode(), LineBreakMode::from_name(value.trim()))
            {
                w.set_line_break_mode(mode);
            }
        }
        "textAlignment" => {
            if let (Some(w), Some(alignment)) =
                (widget.as_text_alignment(), TextAlignment::from_name(value.trim()))
            {
                w.set_text_alignment(alignment);
            }
        }
        "numberOfLines" => {
            if let (Some(w), Some(lines)) = (widget.as_number_of_lines(), parse_number(value)) {
                w.set_number_of_lines(lines as i64);
            }
        }
        "fontSize" => {
            if let (Some(w), Some(size)) = (widget.as_font_size(), parse_number(value)) {
                w.set_font_size(size);
            }
        }

        // Images
        "image" => {
            if let Some(w) = widget.as_image() {
                w.set_image(optional_text(value));
            }
        }
        "backgroundImage" => {
            if let Some(w) = widget.as_background_image() {
                w.set_background_image(optional_text(value));
            }
        }

        // Scrolling
        "contentInset" => {
            if let (Some(w), Some(inset)) = (widget.as_content_inset(), EdgeInsets::parse(value)) {
                w.set_content_inset(inset);
            }
        }
        "contentOffset" => {
            if let (Some(w), Some(offset)) = (widget.as_content_offset(), Point::parse(value)) {
                w.set_content_offset(offset);
            }
        }

        "placeholder" => {
            if let Some(w) = widget.as_placeholder() {
                w.set_placeholder(optional_text(value));
            }
        }

        // Bars
        "translucent" => {
            if let Some(w) = widget.as_translucent() {
                w.set_translucent(parse_bool(value));
            }
        }
        "tintColor" => {
            if let (Some(w), Some(color)) = (widget.as_tint_color(), palette.resolve(value)) {
                w.set_tint_color(Some(color));
            }
        }

        _ => return false,
    }
    true
}

/// Read the current value of a property as a string that [`apply`] accepts
pub fn retrieve(widget: &mut dyn Widget, name: &str, palette: &Palette) -> Option<String> {
    match name {
        "frame" => Some(widget.frame().to_string()),
        "backgroundColor" => Some(palette.describe(widget.background_color().unwrap_or(Color::CLEAR))),
        "cornerRadius" => Some(format_number(widget.corner_radius())),
        "borderWidth" => Some(format_number(widget.border_width())),
        "borderColor" => widget.border_color().map(|c| palette.describe(c)),
        "alpha" => Some(format_number(widget.alpha())),
        "clipToBounds" | "clipsToBounds" => Some(bool_text(widget.clips_to_bounds())),
        "contentMode" => Some(widget.content_mode().name().to_string()),
        "hidden" => Some(bool_text(widget.is_hidden())),

        "text" => widget.as_text().map(|w| w.text().unwrap_or_default()),
        "textColor" => widget
            .as_text_color()
            .and_then(|w| w.text_color())
            .map(|c| palette.describe(c)),
        "lineBreakMode" => widget
            .as_line_break_mode()
            .map(|w| w.line_break_mode().name().to_string()),
        "textAlignment" => widget
            .as_text_alignment()
            .map(|w| w.text_alignment().name().to_string()),
        "numberOfLines" => widget
            .as_number_of_lines()
            .map(|w| w.number_of_lines().to_string()),
        "fontSize" => widget.as_font_size().map(|w| format_number(w.font_size())),

        "contentInset" => widget.as_content_inset().map(|w| w.content_inset().to_string()),
        "contentOffset" => widget.as_content_offset().map(|w| w.content_offset().to_string()),

        "placeholder" => widget.as_placeholder().map(|w| w.placeholder().unwrap_or_default()),

        "translucent" => widget.as_translucent().map(|w| bool_text(w.is_translucent())),
        "tintColor" => widget
            .as_tint_color()
            .and_then(|w| w.tint_color())
            .map(|c| palette.describe(c)),

        _ => None,
    }
}
