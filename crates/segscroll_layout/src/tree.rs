//! Layout tree management

use slotmap::{new_key_type, SlotMap};
use taffy::geometry::Size;
use taffy::style::{AvailableSpace, Style};
use taffy::tree::{Layout, NodeId};
use taffy::TaffyTree;

use crate::error::{LayoutError, Result};

new_key_type! {
    pub struct LayoutNodeId;
}

/// Maps between container node IDs and Taffy node IDs
pub struct LayoutTree {
    taffy: TaffyTree,
    node_map: SlotMap<LayoutNodeId, NodeId>,
}

impl LayoutTree {
    pub fn new() -> Self {
        let mut taffy = TaffyTree::new();
        // Frames are compared exactly; keep fractional points
        taffy.disable_rounding();
        Self {
            taffy,
            node_map: SlotMap::with_key(),
        }
    }

    fn taffy_node(&self, id: LayoutNodeId) -> Result<NodeId> {
        self.node_map
            .get(id)
            .copied()
            .ok_or(LayoutError::UnknownNode)
    }

    /// Create a new layout node with the given style
    pub fn create_node(&mut self, style: Style) -> Result<LayoutNodeId> {
        let taffy_node = self.taffy.new_leaf(style)?;
        Ok(self.node_map.insert(taffy_node))
    }

    /// Set the style for a node
    pub fn set_style(&mut self, id: LayoutNodeId, style: Style) -> Result<()> {
        let node = self.taffy_node(id)?;
        self.taffy.set_style(node, style)?;
        Ok(())
    }

    /// Replace a parent's children, in order
    pub fn set_children(&mut self, parent: LayoutNodeId, children: &[LayoutNodeId]) -> Result<()> {
        let parent_node = self.taffy_node(parent)?;
        let child_nodes = children
            .iter()
            .map(|&child| self.taffy_node(child))
            .collect::<Result<Vec<_>>>()?;
        self.taffy.set_children(parent_node, &child_nodes)?;
        Ok(())
    }

    /// Compute layout for a tree rooted at the given node
    pub fn compute_layout(
        &mut self,
        root: LayoutNodeId,
        available_space: Size<AvailableSpace>,
    ) -> Result<()> {
        let node = self.taffy_node(root)?;
        self.taffy.compute_layout(node, available_space)?;
        Ok(())
    }

    /// Get the computed layout for a node
    pub fn get_layout(&self, id: LayoutNodeId) -> Option<&Layout> {
        self.node_map
            .get(id)
            .and_then(|&taffy_node| self.taffy.layout(taffy_node).ok())
    }

    /// Remove a node
    pub fn remove_node(&mut self, id: LayoutNodeId) {
        if let Some(taffy_node) = self.node_map.remove(id) {
            let _ = self.taffy.remove(taffy_node);
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::LayoutStyle;
    use taffy::prelude::TaffyMaxContent;

    #[test]
    fn test_fixed_leaf_layout() {
        let mut tree = LayoutTree::new();
        let root = tree.create_node(LayoutStyle::fixed_size(320.0, 480.0)).unwrap();

        tree.compute_layout(root, Size::MAX_CONTENT).unwrap();

        let layout = tree.get_layout(root).unwrap();
        assert_eq!(layout.size.width, 320.0);
        assert_eq!(layout.size.height, 480.0);
    }

    #[test]
    fn test_removed_node_is_unknown() {
        let mut tree = LayoutTree::new();
        let node = tree.create_node(LayoutStyle::fixed_size(1.0, 1.0)).unwrap();
        tree.remove_node(node);

        assert!(tree.get_layout(node).is_none());
        assert!(matches!(
            tree.set_style(node, LayoutStyle::fixed_size(2.0, 2.0)),
            Err(LayoutError::UnknownNode)
        ));
        assert!(tree.is_empty());
    }
}
