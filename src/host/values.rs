//! Enumerated widget settings and their property-value names

macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            pub const NAMES: &'static [(&'static str, $name)] = &[$(($text, $name::$variant)),+];

            pub fn from_name(name: &str) -> Option<Self> {
                Self::NAMES.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
            }

            pub fn name(self) -> &'static str {
                Self::NAMES
                    .iter()
                    .find(|(_, v)| *v == self)
                    .map(|(n, _)| *n)
                    .unwrap_or_default()
            }
        }
    };
}

named_enum!(
    /// How a view lays out its content when its size changes
    ContentMode {
        ScaleToFill => "scaleToFill",
        ScaleAspectFit => "scaleAspectFit",
        ScaleAspectFill => "scaleAspectFill",
        Redraw => "redraw",
        Center => "center",
        Top => "top",
        Bottom => "bottom",
        Left => "left",
        Right => "right",
        TopLeft => "topLeft",
        TopRight => "topRight",
        BottomLeft => "bottomLeft",
        BottomRight => "bottomRight",
    }
);

named_enum!(
    /// How text that does not fit is wrapped or truncated
    LineBreakMode {
        ByTruncatingTail => "byTruncatingTail",
        ByWordWrapping => "byWordWrapping",
        ByCharWrapping => "byCharWrapping",
        ByClipping => "byClipping",
        ByTruncatingHead => "byTruncatingHead",
        ByTruncatingMiddle => "byTruncatingMiddle",
    }
);

named_enum!(
    TextAlignment {
        Natural => "natural",
        Left => "left",
        Center => "center",
        Right => "right",
        Justified => "justified",
    }
);
