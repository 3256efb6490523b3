//! Frame solving for the headless toolkit
//!
//! Wraps the kasuari Cassowary solver. Every widget under the solved root gets four
//! variables (absolute x, y, width, height) and every active installed relation becomes one
//! solver constraint with a strength derived from its priority.

use std::collections::HashMap;

use indexmap::IndexMap;
use kasuari::{
    Expression, Solver as KasuariSolver, Strength, Variable as KasuariVariable, WeightedRelation::*,
};
use thiserror::Error;

use crate::constraint::attribute::{Attribute, Relation};
use crate::host::{LayoutConstraint, Rect, WidgetId, PRIORITY_REQUIRED};

/// Inset applied by the margin attributes
pub const LAYOUT_MARGIN: f64 = 8.0;

/// Base properties of a widget's frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameProperty {
    X,
    Y,
    Width,
    Height,
}

/// Errors from the frame solver
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    #[error("Unsatisfiable relation: {description}")]
    Unsatisfiable { description: String },

    #[error("Duplicate relation: {description}")]
    Duplicate { description: String },

    #[error("Internal solver error: {0}")]
    Internal(String),
}

/// Map a relation priority onto a solver strength
pub fn strength_for(priority: f64) -> Strength {
    if priority >= PRIORITY_REQUIRED {
        Strength::REQUIRED
    } else if priority >= 750.0 {
        Strength::STRONG
    } else if priority >= 250.0 {
        Strength::MEDIUM
    } else {
        Strength::WEAK
    }
}

/// Solved frames, relative to each widget's superview
#[derive(Debug, Clone, Default)]
pub struct FrameSolution {
    pub frames: IndexMap<WidgetId, Rect>,
    /// Relations the solver had to drop
    pub conflicts: Vec<SolverError>,
}

pub struct FrameSolver {
    solver: KasuariSolver,
    variables: HashMap<(WidgetId, FrameProperty), KasuariVariable>,
    conflicts: Vec<SolverError>,
}

impl Default for FrameSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSolver {
    pub fn new() -> Self {
        Self {
            solver: KasuariSolver::new(),
            variables: HashMap::new(),
            conflicts: Vec::new(),
        }
    }

    fn var(&mut self, view: WidgetId, property: FrameProperty) -> KasuariVariable {
        *self
            .variables
            .entry((view, property))
            .or_insert_with(KasuariVariable::new)
    }

    fn base(&mut self, view: WidgetId, property: FrameProperty) -> Expression {
        self.var(view, property).into()
    }

    /// Expression for one attribute of a widget, in absolute coordinates
    pub fn expression(&mut self, view: WidgetId, attribute: Attribute) -> Expression {
        let x = self.base(view, FrameProperty::X);
        let y = self.base(view, FrameProperty::Y);
        let width = self.base(view, FrameProperty::Width);
        let height = self.base(view, FrameProperty::Height);
        match attribute {
            Attribute::Left | Attribute::Leading => x,
            Attribute::Right | Attribute::Trailing => x + width,
            Attribute::Top => y,
            Attribute::Bottom | Attribute::LastBaseline | Attribute::FirstBaseline => y + height,
            Attribute::Width => width,
            Attribute::Height => height,
            Attribute::CenterX | Attribute::CenterXWithinMargins => x + width * 0.5,
            Attribute::CenterY | Attribute::CenterYWithinMargins => y + height * 0.5,
            Attribute::LeftMargin | Attribute::LeadingMargin => x + LAYOUT_MARGIN,
            Attribute::RightMargin | Attribute::TrailingMargin => x + width - LAYOUT_MARGIN,
            Attribute::TopMargin => y + LAYOUT_MARGIN,
            Attribute::BottomMargin => y + height - LAYOUT_MARGIN,
        }
    }

    fn add(&mut self, constraint: kasuari::Constraint, description: String) {
        if let Err(e) = self.solver.add_constraint(constraint) {
            let error = match e {
                kasuari::AddConstraintError::UnsatisfiableConstraint => {
                    SolverError::Unsatisfiable { description }
                }
                kasuari::AddConstraintError::DuplicateConstraint => {
                    SolverError::Duplicate { description }
                }
                kasuari::AddConstraintError::InternalSolverError(msg) => {
                    SolverError::Internal(format!("{}: {}", description, msg))
                }
            };
            self.conflicts.push(error);
        }
    }

    /// Pin a widget to a fixed absolute rectangle
    pub fn pin(&mut self, view: WidgetId, rect: Rect) {
        for (property, value) in [
            (FrameProperty::X, rect.x),
            (FrameProperty::Y, rect.y),
            (FrameProperty::Width, rect.width),
            (FrameProperty::Height, rect.height),
        ] {
            let expr = self.base(view, property);
            self.add(
                expr | EQ(Strength::REQUIRED) | value,
                format!("{} {:?} = {}", view, property, value),
            );
        }
    }

    /// Add one installed relation
    pub fn relate(&mut self, constraint: &LayoutConstraint) {
        let strength = strength_for(constraint.priority);
        let lhs = self.expression(constraint.item, constraint.attribute);
        // Everything is moved to the left so the right-hand side is always zero
        let difference = match constraint.to_item {
            Some(peer) => {
                let attribute = constraint.to_attribute.unwrap_or(constraint.attribute);
                lhs - (self.expression(peer, attribute) * constraint.multiplier + constraint.constant)
            }
            None => lhs - constraint.constant,
        };
        let description = describe(constraint);
        let solver_constraint = match constraint.relation {
            Relation::Equal => difference | EQ(strength) | 0.0,
            Relation::LessOrEqual => difference | LE(strength) | 0.0,
            Relation::GreaterOrEqual => difference | GE(strength) | 0.0,
        };
        self.add(solver_constraint, description);
    }

    /// Solve and convert absolute positions into superview-relative frames.
    /// `parents` lists every solved widget with its superview.
    pub fn solve(mut self, parents: &[(WidgetId, Option<WidgetId>)]) -> FrameSolution {
        let values: HashMap<KasuariVariable, f64> =
            self.solver.fetch_changes().iter().copied().collect();
        let mut value = |view: WidgetId, property: FrameProperty| {
            let var = self.var(view, property);
            values.get(&var).copied().unwrap_or(0.0)
        };

        let mut frames = IndexMap::new();
        for &(view, parent) in parents {
            let (origin_x, origin_y) = match parent {
                Some(parent) => (value(parent, FrameProperty::X), value(parent, FrameProperty::Y)),
                None => (0.0, 0.0),
            };
            frames.insert(
                view,
                Rect::new(
                    value(view, FrameProperty::X) - origin_x,
                    value(view, FrameProperty::Y) - origin_y,
                    value(view, FrameProperty::Width),
                    value(view, FrameProperty::Height),
                ),
            );
        }
        FrameSolution {
            frames,
            conflicts: self.conflicts,
        }
    }
}

fn describe(constraint: &LayoutConstraint) -> String {
    let subject = format!("{}.{}", constraint.item, constraint.attribute);
    let object = match (constraint.to_item, constraint.to_attribute) {
        (Some(peer), attribute) => format!(
            "{}.{} * {} + {}",
            peer,
            attribute.unwrap_or(constraint.attribute),
            constraint.multiplier,
            constraint.constant
        ),
        (None, _) => constraint.constant.to_string(),
    };
    match &constraint.identifier {
        Some(id) => format!("{} {} {} ({})", subject, constraint.relation.symbol(), object, id),
        None => format!("{} {} {}", subject, constraint.relation.symbol(), object),
    }
}
