//! Total specificity order over path specs.
//!
//! The order ranks more specific specs first and is used both to keep a
//! [`RoutingTable`](crate::RoutingTable) sorted and to rank simultaneous
//! matches. It is deterministic: any remaining ties fall back to the
//! declaration string.

use std::cmp::Ordering;

use crate::spec::{PathSpec, SpecGroup, SpecKind, TemplateSegment};

impl Ord for PathSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.group()
            .cmp(&other.group())
            .then_with(|| within_group(self, other))
            .then_with(|| self.declaration().cmp(other.declaration()))
            .then_with(|| self.variant_rank().cmp(&other.variant_rank()))
    }
}

impl PartialOrd for PathSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn within_group(a: &PathSpec, b: &PathSpec) -> Ordering {
    match a.group() {
        // longer declared prefix or suffix wins
        SpecGroup::PrefixGlob | SpecGroup::SuffixGlob => b.specificity().cmp(&a.specificity()),

        SpecGroup::Patterned => patterned(a, b),

        // exact specs matching the same path are definitionally identical and
        // at most one canonical default exists; the declaration tie-break in
        // `cmp` keeps the order deterministic
        SpecGroup::Exact | SpecGroup::Default => Ordering::Equal,
    }
}

/// Shape of one patterned segment. A literal position beats a placeholder
/// position at the first point of difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Literal,
    Placeholder,
}

/// Segment shapes of a patterned spec. A regex declaration carries no segment
/// model and is weighted as a single literal unit.
fn shapes(spec: &PathSpec) -> Vec<Shape> {
    match &spec.kind {
        SpecKind::Template(template) => template
            .segments
            .iter()
            .map(|segment| match segment {
                TemplateSegment::Literal(_) => Shape::Literal,
                TemplateSegment::Placeholder(_) => Shape::Placeholder,
            })
            .collect(),
        _ => vec![Shape::Literal],
    }
}

fn patterned(a: &PathSpec, b: &PathSpec) -> Ordering {
    let shapes_a = shapes(a);
    let shapes_b = shapes(b);

    for (shape_a, shape_b) in shapes_a.iter().zip(shapes_b.iter()) {
        match (shape_a, shape_b) {
            (Shape::Literal, Shape::Placeholder) => return Ordering::Less,
            (Shape::Placeholder, Shape::Literal) => return Ordering::Greater,
            _ => {}
        }
    }

    // no deciding position: more segments, then the longer declaration, is
    // more specific; lexicographic order is applied by the caller
    shapes_b
        .len()
        .cmp(&shapes_a.len())
        .then_with(|| b.declaration().len().cmp(&a.declaration().len()))
}
