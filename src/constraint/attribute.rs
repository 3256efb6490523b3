//! Geometric attribute, relation and size-class tables

use std::fmt;

/// An axis-aligned attribute a relation can pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Left,
    Right,
    Top,
    Bottom,
    Leading,
    Trailing,
    Width,
    Height,
    CenterX,
    CenterY,
    LastBaseline,
    FirstBaseline,
    LeftMargin,
    RightMargin,
    TopMargin,
    BottomMargin,
    LeadingMargin,
    TrailingMargin,
    CenterXWithinMargins,
    CenterYWithinMargins,
}

/// Name table for single attributes
pub const ATTRIBUTE_KEYS: &[(&str, Attribute)] = &[
    ("left", Attribute::Left),
    ("right", Attribute::Right),
    ("top", Attribute::Top),
    ("bottom", Attribute::Bottom),
    ("leading", Attribute::Leading),
    ("trailing", Attribute::Trailing),
    ("width", Attribute::Width),
    ("height", Attribute::Height),
    ("centerX", Attribute::CenterX),
    ("centerY", Attribute::CenterY),
    ("lastBaseline", Attribute::LastBaseline),
    ("firstBaseline", Attribute::FirstBaseline),
    ("leftMargin", Attribute::LeftMargin),
    ("rightMargin", Attribute::RightMargin),
    ("topMargin", Attribute::TopMargin),
    ("bottomMargin", Attribute::BottomMargin),
    ("leadingMargin", Attribute::LeadingMargin),
    ("trailingMargin", Attribute::TrailingMargin),
    ("centerXWithinMargins", Attribute::CenterXWithinMargins),
    ("centerYWithinMargins", Attribute::CenterYWithinMargins),
];

/// Name table for compound attributes, expanded in this order
pub const COMPOUND_ATTRIBUTE_KEYS: &[(&str, &[Attribute])] = &[
    (
        "edges",
        &[
            Attribute::Top,
            Attribute::Left,
            Attribute::Bottom,
            Attribute::Right,
        ],
    ),
    ("center", &[Attribute::CenterX, Attribute::CenterY]),
];

/// Attributes that can be sized without a peer
pub const INDEPENDENT_ATTRIBUTES: &[Attribute] = &[Attribute::Width, Attribute::Height];

/// Attributes where an inset constant pulls inward, so the sign flips
pub const INSET_FLIPPED: &[Attribute] = &[
    Attribute::Right,
    Attribute::Trailing,
    Attribute::Bottom,
    Attribute::RightMargin,
    Attribute::TrailingMargin,
    Attribute::BottomMargin,
    Attribute::Width,
    Attribute::Height,
];

/// Attributes where an offset constant pushes outward, so the sign flips
pub const OFFSET_FLIPPED: &[Attribute] = &[
    Attribute::Left,
    Attribute::Top,
    Attribute::LeftMargin,
    Attribute::TopMargin,
    Attribute::Width,
    Attribute::Height,
];

/// Which way an attribute runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Attribute {
    pub fn from_name(name: &str) -> Option<Self> {
        ATTRIBUTE_KEYS
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, attr)| *attr)
    }

    pub fn name(self) -> &'static str {
        ATTRIBUTE_KEYS
            .iter()
            .find(|(_, attr)| *attr == self)
            .map(|(key, _)| *key)
            .unwrap_or("unknown")
    }

    /// Expand a left-hand token: a single attribute or a compound group.
    /// Unknown tokens yield nothing.
    pub fn expand(token: &str) -> Vec<Attribute> {
        if let Some(attr) = Self::from_name(token) {
            return vec![attr];
        }
        COMPOUND_ATTRIBUTE_KEYS
            .iter()
            .find(|(key, _)| *key == token)
            .map(|(_, attrs)| attrs.to_vec())
            .unwrap_or_default()
    }

    /// Parse a whole left-hand side ("width height", "edges") into attributes
    pub fn parse_list(source: &str) -> Vec<Attribute> {
        source
            .split(' ')
            .filter(|token| !token.is_empty())
            .flat_map(Self::expand)
            .collect()
    }

    pub fn is_independent(self) -> bool {
        INDEPENDENT_ATTRIBUTES.contains(&self)
    }

    pub fn flips_inset(self) -> bool {
        INSET_FLIPPED.contains(&self)
    }

    pub fn flips_offset(self) -> bool {
        OFFSET_FLIPPED.contains(&self)
    }

    pub fn axis(self) -> Axis {
        match self {
            Attribute::Left
            | Attribute::Right
            | Attribute::Leading
            | Attribute::Trailing
            | Attribute::Width
            | Attribute::CenterX
            | Attribute::LeftMargin
            | Attribute::RightMargin
            | Attribute::LeadingMargin
            | Attribute::TrailingMargin
            | Attribute::CenterXWithinMargins => Axis::Horizontal,
            _ => Axis::Vertical,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison between the two sides of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Relation {
    #[default]
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

impl Relation {
    /// Shorthand symbols: `<=`, `=`, `>=`
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<=" => Some(Relation::LessOrEqual),
            "=" | "==" => Some(Relation::Equal),
            ">=" => Some(Relation::GreaterOrEqual),
            _ => None,
        }
    }

    /// Long-form keys: `gte`, `lte`; anything else is equal
    pub fn from_key(key: &str) -> Self {
        match key {
            "gte" => Relation::GreaterOrEqual,
            "lte" => Relation::LessOrEqual,
            _ => Relation::Equal,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "==",
            Relation::LessOrEqual => "<=",
            Relation::GreaterOrEqual => ">=",
        }
    }
}

/// Coarse horizontal or vertical size bucket reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Compact,
    Regular,
}

impl SizeClass {
    /// Accepts `compact`/`regular` and their single-letter forms
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "compact" | "c" => Some(SizeClass::Compact),
            "regular" | "r" => Some(SizeClass::Regular),
            _ => None,
        }
    }
}

/// Size classes currently in effect; `None` means unspecified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraitCollection {
    pub horizontal: Option<SizeClass>,
    pub vertical: Option<SizeClass>,
}

impl TraitCollection {
    pub fn new(horizontal: Option<SizeClass>, vertical: Option<SizeClass>) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Whether a relation gated on the given classes should be active
    pub fn satisfies(&self, horizontal: Option<SizeClass>, vertical: Option<SizeClass>) -> bool {
        let horizontal_ok = horizontal.map_or(true, |gate| self.horizontal == Some(gate));
        let vertical_ok = vertical.map_or(true, |gate| self.vertical == Some(gate));
        horizontal_ok && vertical_ok
    }
}
