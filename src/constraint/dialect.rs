//! Constraint dialects
//!
//! Three ways of writing a constraint decode into the same [`ConstraintDescriptor`]:
//!
//! - shorthand: `"width height": "@title.height:*2:+8:$750"`
//! - comprehensive: `"width": { "to": "title", "relation": "gte", "constant": 8 }`
//! - markup: `<constraint leftAttribute="width" to="title" relation="&gt;=" constant="8"/>`

use indexmap::IndexMap;

use super::attribute::{Attribute, Relation, SizeClass};
use super::descriptor::{
    ConstantSign, ConstraintDescriptor, MultiplierSign, PeerRef, CONSTANT_PRECEDENCE,
    MULTIPLIER_PRECEDENCE,
};
use super::grammar::{parse_argument, Argument};
use crate::parser::{RawConstraint, RawValue};
use crate::report::Reporter;

/// Characters that open a shorthand argument
pub const MODIFIERS: &[char] = &['@', '%', '+', '-', '<', '>', '*', '/', '$', '!'];

/// Shorthand arguments are separated by either of these
pub fn is_argument_separator(c: char) -> bool {
    c == ':' || c.is_whitespace()
}

/// Turns one raw constraint entry into a descriptor
pub trait ConstraintDecoder {
    /// `None` means the entry is skipped; any problem has already been reported
    fn decode(&self, raw: &RawConstraint, reporter: &Reporter) -> Option<ConstraintDescriptor>;
}

/// Pick the decoder that matches the entry's shape and run it
pub fn decode_constraint(raw: &RawConstraint, reporter: &Reporter) -> Option<ConstraintDescriptor> {
    match raw {
        RawConstraint::Pair {
            rhs: RawValue::String(_),
            ..
        } => ShorthandDecoder.decode(raw, reporter),
        RawConstraint::Pair {
            rhs: RawValue::Map(_),
            ..
        } => ComprehensiveDecoder.decode(raw, reporter),
        RawConstraint::Markup(_) => MarkupDecoder.decode(raw, reporter),
        RawConstraint::Pair { .. } => unrecognized(reporter),
    }
}

fn unrecognized(reporter: &Reporter) -> Option<ConstraintDescriptor> {
    reporter.error("Constraint source in unrecognized format.");
    None
}

/// Split a shorthand right-hand side into arguments. A modifier written on its own
/// (`+:100`) takes the following piece as its value.
pub fn split_arguments(rhs: &str) -> Vec<String> {
    let mut arguments: Vec<String> = Vec::new();
    let mut pending: Option<String> = None;
    for piece in rhs.split(is_argument_separator).filter(|p| !p.is_empty()) {
        match pending.take() {
            Some(modifier) => arguments.push(modifier + piece),
            None => {
                let mut chars = piece.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if MODIFIERS.contains(&c) => pending = Some(piece.to_string()),
                    _ => arguments.push(piece.to_string()),
                }
            }
        }
    }
    arguments.extend(pending);
    arguments
}

/// The terse single-line dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct ShorthandDecoder;

impl ShorthandDecoder {
    fn arguments(rhs: &str, reporter: &Reporter) -> Vec<Argument> {
        split_arguments(rhs)
            .into_iter()
            .filter_map(|text| match parse_argument(&text) {
                Ok(argument) => Some(argument),
                Err(errors) => {
                    for error in errors {
                        reporter.warning(format!("Invalid constraint argument '{}': {}", text, error));
                    }
                    None
                }
            })
            .collect()
    }
}

impl ConstraintDecoder for ShorthandDecoder {
    fn decode(&self, raw: &RawConstraint, reporter: &Reporter) -> Option<ConstraintDescriptor> {
        let RawConstraint::Pair {
            lhs,
            rhs: RawValue::String(rhs),
        } = raw
        else {
            return unrecognized(reporter);
        };

        let arguments = Self::arguments(rhs, reporter);
        let mut descriptor = ConstraintDescriptor::new(Attribute::parse_list(lhs));

        if let Some((peer, attribute)) = arguments.iter().find_map(|arg| match arg {
            Argument::Target { peer, attribute } => Some((peer, attribute)),
            _ => None,
        }) {
            descriptor.peer = Some(PeerRef::parse(peer));
            descriptor.right = attribute.as_deref().and_then(Attribute::from_name);
        }

        if let Some(relation) = arguments.iter().find_map(|arg| match arg {
            Argument::Relation(relation) => Some(*relation),
            _ => None,
        }) {
            descriptor.relation = relation;
        }

        if let Some((sign, value)) = CONSTANT_PRECEDENCE.iter().find_map(|wanted| {
            arguments.iter().find_map(|arg| match arg {
                Argument::Constant(sign, value) if sign == wanted => Some((*sign, *value)),
                _ => None,
            })
        }) {
            descriptor = descriptor.with_constant(value, sign);
        }

        if let Some((sign, value)) = MULTIPLIER_PRECEDENCE.iter().find_map(|wanted| {
            arguments.iter().find_map(|arg| match arg {
                Argument::Multiplier(sign, value) if sign == wanted => Some((*sign, *value)),
                _ => None,
            })
        }) {
            descriptor = descriptor.with_multiplier(value, sign);
        }

        descriptor.priority = arguments.iter().find_map(|arg| match arg {
            Argument::Priority(priority) => Some(*priority),
            _ => None,
        });

        descriptor.identifier = arguments.iter().find_map(|arg| match arg {
            Argument::Identifier(identifier) => Some(identifier.clone()),
            _ => None,
        });

        Some(descriptor)
    }
}

/// The key-value dialect: the right-hand side is a map of named fields
#[derive(Debug, Clone, Copy, Default)]
pub struct ComprehensiveDecoder;

impl ConstraintDecoder for ComprehensiveDecoder {
    fn decode(&self, raw: &RawConstraint, reporter: &Reporter) -> Option<ConstraintDescriptor> {
        let RawConstraint::Pair {
            lhs,
            rhs: RawValue::Map(fields),
        } = raw
        else {
            return unrecognized(reporter);
        };

        let text = |key: &str| fields.get(key).and_then(RawValue::as_str);
        let number = |key: &str| fields.get(key).and_then(RawValue::as_f64);

        let mut descriptor = ConstraintDescriptor::new(Attribute::parse_list(lhs))
            .with_relation(text("relation").map(Relation::from_key).unwrap_or_default());
        descriptor.right = text("attribute").and_then(Attribute::from_name);
        descriptor.peer = text("to").map(PeerRef::parse);
        if let Some(constant) = number("constant") {
            descriptor = descriptor.with_constant(constant, ConstantSign::Positive);
        }
        if let Some(multiplier) = number("multiplier") {
            descriptor = descriptor.with_multiplier(multiplier, MultiplierSign::Multiply);
        }
        descriptor.priority = number("priority");
        descriptor.identifier = text("identifier").map(str::to_string);
        descriptor.horizontal_size_class = text("horizontalSizeClass").and_then(SizeClass::from_key);
        descriptor.vertical_size_class = text("verticalSizeClass").and_then(SizeClass::from_key);
        Some(descriptor)
    }
}

/// The attribute-markup dialect used by XML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupDecoder;

impl MarkupDecoder {
    fn number(attributes: &IndexMap<String, String>, key: &str) -> Option<f64> {
        attributes.get(key).and_then(|v| v.trim().parse().ok())
    }
}

impl ConstraintDecoder for MarkupDecoder {
    fn decode(&self, raw: &RawConstraint, reporter: &Reporter) -> Option<ConstraintDescriptor> {
        let RawConstraint::Markup(attributes) = raw else {
            return unrecognized(reporter);
        };
        let text = |key: &str| attributes.get(key).map(String::as_str);

        let mut descriptor =
            ConstraintDescriptor::new(Attribute::parse_list(text("leftAttribute").unwrap_or_default()))
                .with_relation(
                    text("relation")
                        .and_then(Relation::from_symbol)
                        .unwrap_or_default(),
                );
        descriptor.right = text("rightAttribute").and_then(Attribute::from_name);
        descriptor.peer = text("to").map(PeerRef::parse);

        // An inset wins over a plain constant, a divisor over a multiplier
        if attributes.contains_key("inset") {
            if let Some(inset) = Self::number(attributes, "inset") {
                descriptor = descriptor.with_constant(inset, ConstantSign::Inset);
            }
        } else if let Some(constant) = Self::number(attributes, "constant") {
            descriptor = descriptor.with_constant(constant, ConstantSign::Positive);
        }
        if attributes.contains_key("divide") {
            if let Some(divisor) = Self::number(attributes, "divide") {
                descriptor = descriptor.with_multiplier(divisor, MultiplierSign::Divide);
            }
        } else if let Some(multiplier) = Self::number(attributes, "multiply") {
            descriptor = descriptor.with_multiplier(multiplier, MultiplierSign::Multiply);
        }

        descriptor.priority = Self::number(attributes, "priority");
        descriptor.identifier = text("name").map(str::to_string);
        descriptor.horizontal_size_class = text("horizontalSizeClass").and_then(SizeClass::from_key);
        descriptor.vertical_size_class = text("verticalSizeClass").and_then(SizeClass::from_key);
        Some(descriptor)
    }
}
