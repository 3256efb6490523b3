//! Constraint expressions: attribute tables, the shorthand grammar, the three source dialects
//! and resolution onto a host

pub mod attribute;
pub mod descriptor;
pub mod dialect;
pub mod grammar;
pub mod lexer;
pub mod resolve;

pub use attribute::{Attribute, Relation, SizeClass, TraitCollection};
pub use descriptor::{
    Constant, ConstantSign, ConstraintDescriptor, Multiplier, MultiplierSign, PeerRef,
};
pub use dialect::{
    decode_constraint, ComprehensiveDecoder, ConstraintDecoder, MarkupDecoder, ShorthandDecoder,
};
pub use resolve::ConstraintContext;
