//! # Mesh Copy
//!
//! Reuse of one discretization across geometrically identical instances.
//!
//! A [`MeshTemplate`] captures the nodes and elements of a meshed reference
//! (one or more entities, lower dimensions first). [`MeshTemplate::stamp`]
//! re-emits them onto target entities, translated, with node and element tags
//! shifted into a fresh range. The shift is an explicit [`TagOffsets`] value
//! that every stamp consumes and returns, so consecutive copies never overlap:
//!
//! ```text
//! offsets₀ ─stamp─► offsets₁ ─stamp─► offsets₂ ─► ...
//!           [n₀+1 ..= n₀+span]  [n₁+1 ..= n₁+span]
//! ```

use std::collections::HashSet;

use glam::DVec3;
use tracing::debug;

use crate::error::{KernelError, KernelResult};
use crate::kernel::GeometryKernel;
use crate::types::{DimTag, ElementBlock, ElementTag, NodeBlock, NodeTag};

/// Running node/element tag offsets of the copy phase.
///
/// # Example
///
/// ```rust
/// use kernel_api::TagOffsets;
///
/// let start = TagOffsets::default();
/// let next = start.advanced(100, 400);
/// assert_eq!(next, TagOffsets::new(100, 400));
/// assert_eq!(next.max(TagOffsets::new(50, 900)), TagOffsets::new(100, 900));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagOffsets {
    pub node: NodeTag,
    pub element: ElementTag,
}

impl TagOffsets {
    pub const fn new(node: NodeTag, element: ElementTag) -> Self {
        Self { node, element }
    }

    /// Offsets just past every tag the kernel currently uses.
    pub fn of_kernel<K: GeometryKernel + ?Sized>(kernel: &K) -> Self {
        Self::new(kernel.max_node_tag(), kernel.max_element_tag())
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.node.max(other.node), self.element.max(other.element))
    }

    #[must_use]
    pub fn advanced(self, nodes: NodeTag, elements: ElementTag) -> Self {
        Self::new(self.node + nodes, self.element + elements)
    }
}

#[derive(Debug, Clone)]
struct TemplateEntry {
    nodes: NodeBlock,
    elements: Vec<ElementBlock>,
}

/// Captured reference discretization.
#[derive(Debug, Clone)]
pub struct MeshTemplate {
    entries: Vec<TemplateEntry>,
    origin: DVec3,
    node_span: NodeTag,
    element_span: ElementTag,
}

impl MeshTemplate {
    /// Captures the mesh of `entities`, each including the nodes of its
    /// boundary closure not already captured by an earlier entity.
    ///
    /// `origin` is the reference position that stamps translate from.
    pub fn capture<K: GeometryKernel + ?Sized>(
        kernel: &K,
        entities: &[DimTag],
        origin: DVec3,
    ) -> KernelResult<Self> {
        let mut seen: HashSet<NodeTag> = HashSet::new();
        let mut entries = Vec::with_capacity(entities.len());
        let mut node_span = 0;
        let mut element_span = 0;

        for &entity in entities {
            let all_nodes = kernel.nodes(entity, true)?;
            let mut nodes = NodeBlock::default();
            for (tag, coord) in all_nodes.tags.iter().zip(&all_nodes.coords) {
                if seen.insert(*tag) {
                    nodes.tags.push(*tag);
                    nodes.coords.push(*coord);
                    node_span = node_span.max(*tag);
                }
            }

            let elements = kernel.elements(entity)?;
            for block in &elements {
                if !block.is_consistent() {
                    return Err(KernelError::mismatch(format!(
                        "element block of {entity} has inconsistent connectivity"
                    )));
                }
                if let Some(missing) = block.nodes.iter().find(|n| !seen.contains(*n)) {
                    return Err(KernelError::mismatch(format!(
                        "element of {entity} references node {missing} outside the reference"
                    )));
                }
                element_span = block.tags.iter().copied().fold(element_span, ElementTag::max);
            }
            entries.push(TemplateEntry { nodes, elements });
        }

        let template = Self {
            entries,
            origin,
            node_span,
            element_span,
        };
        if template.element_count() == 0 {
            return Err(KernelError::mismatch("reference entities carry no mesh"));
        }
        debug!(
            entities = entities.len(),
            nodes = template.node_count(),
            elements = template.element_count(),
            "Captured reference mesh"
        );
        Ok(template)
    }

    /// Number of captured entities; stamps need as many targets.
    pub fn entity_count(&self) -> usize {
        self.entries.len()
    }

    pub fn node_count(&self) -> usize {
        self.entries.iter().map(|e| e.nodes.len()).sum()
    }

    pub fn element_count(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|e| &e.elements)
            .map(ElementBlock::len)
            .sum()
    }

    /// Width of the node tag range one stamp occupies.
    pub fn node_span(&self) -> NodeTag {
        self.node_span
    }

    /// Width of the element tag range one stamp occupies.
    pub fn element_span(&self) -> ElementTag {
        self.element_span
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Copies the template onto `targets` (one per captured entity, same
    /// order), translated so that the origin lands on `position`.
    ///
    /// Tags are shifted by the larger of `offsets` and the kernel's current
    /// maximum tags; the returned offsets lie past the emitted range.
    pub fn stamp<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &mut K,
        targets: &[DimTag],
        position: DVec3,
        offsets: TagOffsets,
    ) -> KernelResult<TagOffsets> {
        if targets.len() != self.entries.len() {
            return Err(KernelError::mismatch(format!(
                "template has {} entities, got {} targets",
                self.entries.len(),
                targets.len()
            )));
        }

        let start = offsets.max(TagOffsets::of_kernel(kernel));
        let shift = position - self.origin;

        for (entry, &target) in self.entries.iter().zip(targets) {
            if !entry.nodes.is_empty() {
                let nodes = NodeBlock {
                    tags: entry.nodes.tags.iter().map(|t| t + start.node).collect(),
                    coords: entry.nodes.coords.iter().map(|c| *c + shift).collect(),
                };
                kernel.add_nodes(target, &nodes)?;
            }
            for block in &entry.elements {
                let shifted = ElementBlock {
                    element_type: block.element_type,
                    tags: block.tags.iter().map(|t| t + start.element).collect(),
                    nodes: block.nodes.iter().map(|n| n + start.node).collect(),
                };
                kernel.add_elements(target, &shifted)?;
            }
        }

        Ok(start.advanced(self.node_span, self.element_span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_advance() {
        let offsets = TagOffsets::new(10, 20).advanced(5, 7);
        assert_eq!(offsets, TagOffsets::new(15, 27));
    }

    #[test]
    fn test_offsets_max_is_componentwise() {
        let a = TagOffsets::new(10, 1);
        let b = TagOffsets::new(3, 8);
        assert_eq!(a.max(b), TagOffsets::new(10, 8));
        assert_eq!(b.max(a), TagOffsets::new(10, 8));
    }
}
