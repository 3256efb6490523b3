//! Normalized constraint descriptor shared by every dialect

use super::attribute::{Attribute, Relation, SizeClass};

/// How a constant's magnitude is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstantSign {
    #[default]
    Positive,
    Negative,
    /// Pulls the subject inward from the peer
    Inset,
    /// Pushes the subject outward from the peer
    Offset,
}

/// Tie-break order when an expression carries more than one constant
pub const CONSTANT_PRECEDENCE: [ConstantSign; 4] = [
    ConstantSign::Positive,
    ConstantSign::Negative,
    ConstantSign::Inset,
    ConstantSign::Offset,
];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Constant {
    pub value: f64,
    pub sign: ConstantSign,
}

impl Constant {
    pub fn new(value: f64, sign: ConstantSign) -> Self {
        Self { value, sign }
    }

    /// The constant as installed against `attribute`
    pub fn effective(&self, attribute: Attribute) -> f64 {
        let flip = match self.sign {
            ConstantSign::Positive => false,
            ConstantSign::Negative => true,
            ConstantSign::Inset => attribute.flips_inset(),
            ConstantSign::Offset => attribute.flips_offset(),
        };
        if flip {
            -self.value
        } else {
            self.value
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiplierSign {
    #[default]
    Multiply,
    Divide,
}

/// Tie-break order when an expression carries more than one multiplier
pub const MULTIPLIER_PRECEDENCE: [MultiplierSign; 2] =
    [MultiplierSign::Multiply, MultiplierSign::Divide];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multiplier {
    pub value: f64,
    pub sign: MultiplierSign,
}

impl Default for Multiplier {
    fn default() -> Self {
        Self {
            value: 1.0,
            sign: MultiplierSign::Multiply,
        }
    }
}

impl Multiplier {
    pub fn new(value: f64, sign: MultiplierSign) -> Self {
        Self { value, sign }
    }

    pub fn effective(&self) -> f64 {
        match self.sign {
            MultiplierSign::Multiply => self.value,
            MultiplierSign::Divide if self.value != 0.0 => 1.0 / self.value,
            // A zero divisor would poison the solver; treat it as identity.
            MultiplierSign::Divide => 1.0,
        }
    }
}

/// Literals that refer to the subject's own superview
pub const PARENT_SENTINELS: &[&str] = &["super", "superview", "parent"];

/// The node a relation compares against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerRef {
    Parent,
    Named(String),
}

impl PeerRef {
    pub fn parse(reference: &str) -> Self {
        if PARENT_SENTINELS.contains(&reference) {
            PeerRef::Parent
        } else {
            PeerRef::Named(reference.to_string())
        }
    }
}

/// One decoded constraint expression
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstraintDescriptor {
    pub left: Vec<Attribute>,
    pub right: Option<Attribute>,
    pub relation: Relation,
    pub constant: Constant,
    pub multiplier: Multiplier,
    pub priority: Option<f64>,
    pub identifier: Option<String>,
    pub peer: Option<PeerRef>,
    pub horizontal_size_class: Option<SizeClass>,
    pub vertical_size_class: Option<SizeClass>,
}

impl ConstraintDescriptor {
    pub fn new(left: Vec<Attribute>) -> Self {
        Self {
            left,
            ..Default::default()
        }
    }

    pub fn with_right(mut self, right: Attribute) -> Self {
        self.right = Some(right);
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = relation;
        self
    }

    pub fn with_constant(mut self, value: f64, sign: ConstantSign) -> Self {
        self.constant = Constant::new(value, sign);
        self
    }

    pub fn with_multiplier(mut self, value: f64, sign: MultiplierSign) -> Self {
        self.multiplier = Multiplier::new(value, sign);
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_peer(mut self, peer: PeerRef) -> Self {
        self.peer = Some(peer);
        self
    }

    pub fn is_gated(&self) -> bool {
        self.horizontal_size_class.is_some() || self.vertical_size_class.is_some()
    }
}
