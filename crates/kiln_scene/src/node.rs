use glam::Affine3A;

use crate::NodeHandle;

/// A transform in the imported hierarchy.
///
/// Nodes only exist where geometry sits under a non-identity transform;
/// meshes without a parent live in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    /// Transform relative to `parent` (or to the world for root nodes).
    pub relative_transform: Affine3A,
    pub(crate) parent: Option<NodeHandle>,
}

impl Node {
    /// Creates a root node carrying `relative_transform`.
    #[must_use]
    pub fn new(relative_transform: Affine3A) -> Self {
        Self {
            name: String::new(),
            relative_transform,
            parent: None,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new(Affine3A::IDENTITY)
    }
}
