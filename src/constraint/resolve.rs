//! Constraint resolution
//!
//! Turns a [`ConstraintDescriptor`] into concrete relations on the host. Each left-hand
//! attribute becomes one relation against a resolved peer, with the descriptor's constant
//! signed for that attribute. Relations are attached to the root widget of the layout so a
//! single clear removes all of them.

use super::attribute::Attribute;
use super::descriptor::{ConstraintDescriptor, PeerRef};
use super::dialect::decode_constraint;
use crate::host::{LayoutConstraint, ViewEnvironment, ViewHost, WidgetId, PRIORITY_REQUIRED};
use crate::index::ViewIndex;
use crate::node::{AppliedConstraint, NodeIdentity, ViewNode};
use crate::report::Reporter;

/// What resolution needs besides the host
#[derive(Clone, Copy)]
pub struct ConstraintContext<'a> {
    pub index: &'a ViewIndex,
    pub environment: Option<&'a dyn ViewEnvironment>,
    pub reporter: &'a Reporter,
}

impl<'a> ConstraintContext<'a> {
    pub fn new(
        index: &'a ViewIndex,
        environment: Option<&'a dyn ViewEnvironment>,
        reporter: &'a Reporter,
    ) -> Self {
        Self {
            index,
            environment,
            reporter,
        }
    }

    /// Find a named peer: the layout's own nodes first, then the environment
    pub fn find_peer(&self, reference: &str) -> Option<WidgetId> {
        let id = NodeIdentity::parse(reference).id;
        self.index
            .target_of(id)
            .or_else(|| self.environment.and_then(|env| env.view(id)))
    }

    /// Decode and install every constraint affecting `node`
    pub fn establish(&self, host: &mut dyn ViewHost, node: &ViewNode) -> Vec<AppliedConstraint> {
        node.affecting_constraints()
            .filter_map(|raw| decode_constraint(raw, self.reporter))
            .flat_map(|descriptor| self.install(host, node, &descriptor))
            .collect()
    }

    /// Install one relation per left-hand attribute of `descriptor`
    pub fn install(
        &self,
        host: &mut dyn ViewHost,
        node: &ViewNode,
        descriptor: &ConstraintDescriptor,
    ) -> Vec<AppliedConstraint> {
        let Some(subject) = node.target() else {
            return Vec::new();
        };
        let superview = host
            .superview(subject)
            .or_else(|| node.parent().and_then(|parent| self.index.target_of(parent)));

        let named_peer = match &descriptor.peer {
            Some(PeerRef::Parent) => Some(superview),
            Some(PeerRef::Named(reference)) => {
                let found = self.find_peer(reference);
                if found.is_none() {
                    self.reporter.warning(format!(
                        "Could not find view '{}' referenced by a constraint on '{}'.",
                        reference,
                        node.id()
                    ));
                }
                found.map(Some)
            }
            None => None,
        };

        let mut applied = Vec::new();
        for &attribute in &descriptor.left {
            let intrinsic =
                attribute.is_independent() && named_peer.is_none() && descriptor.right.is_none();
            let peer = match named_peer {
                Some(peer) => peer,
                None if intrinsic => None,
                None => superview,
            };
            if peer.is_none() && !intrinsic {
                self.reporter.warning(format!(
                    "View '{}' has no superview to relate its {} to.",
                    node.id(),
                    attribute
                ));
                continue;
            }
            let to_attribute = match (descriptor.right, peer) {
                (Some(right), _) => Some(right),
                (None, None) => None,
                (None, Some(_)) => Some(attribute),
            };
            let constraint = LayoutConstraint {
                item: subject,
                attribute,
                relation: descriptor.relation,
                to_item: peer,
                to_attribute: peer.and(to_attribute),
                multiplier: descriptor.multiplier.effective(),
                constant: descriptor.constant.effective(attribute),
                priority: descriptor.priority.unwrap_or(PRIORITY_REQUIRED),
                identifier: descriptor.identifier.clone(),
                active: !descriptor.is_gated(),
            };
            if let Some(installed) = self.install_relation(host, descriptor, constraint) {
                applied.push(installed);
            }
        }
        applied
    }

    fn install_relation(
        &self,
        host: &mut dyn ViewHost,
        descriptor: &ConstraintDescriptor,
        constraint: LayoutConstraint,
    ) -> Option<AppliedConstraint> {
        let subject = constraint.item;
        if let Some(peer) = constraint.to_item {
            if !host.shares_ancestry(subject, peer) {
                self.reporter.error(ancestry_message(descriptor.identifier.as_deref()));
                return None;
            }
        }

        let owner = self
            .index
            .root_target()
            .or_else(|| host.superview(subject))
            .unwrap_or(subject);
        let attribute: Attribute = constraint.attribute;
        let identifier = constraint.identifier.clone();
        let id = host.add_constraint(owner, constraint);
        let applied = AppliedConstraint {
            id,
            owner,
            attribute,
            identifier,
            horizontal_size_class: descriptor.horizontal_size_class,
            vertical_size_class: descriptor.vertical_size_class,
        };
        let traits = host.trait_collection(subject);
        applied.update_active(host, &traits);
        Some(applied)
    }
}

/// Error reported when two widgets in a relation are in different trees
pub fn ancestry_message(identifier: Option<&str>) -> String {
    match identifier {
        Some(identifier) => format!(
            "Some views do not share a view ancestry and so this constraint cannot be made. Constraint: {}",
            identifier
        ),
        None => "Some views do not share a view ancestry and so this constraint cannot be made. \
                 Use constraint identifiers to determine which constraint is causing the problem."
            .to_string(),
    }
}
