use std::collections::HashSet;

use crate::error::{EngineError, InvariantViolation, Result};
use crate::objects::{Node, NodeId};

/// The scene: an ordered list of top-level nodes (the save set) plus the
/// current selection. All tree mutation goes through this type.
#[derive(Clone, Debug)]
pub struct Document {
    roots: Vec<Node>,
    selected_ids: Vec<NodeId>,
    next_id: NodeId,
    dirty: bool,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    pub fn new() -> Document {
        Document { roots: Vec::new(), selected_ids: Vec::new(), next_id: 1, dirty: false }
    }

    /// Builds a clean document around an existing save set.
    ///
    /// The candidate is validated before it is returned, so a caller swapping it
    /// in never installs a broken tree.
    pub fn from_save_set(roots: Vec<Node>) -> Result<Document> {
        let mut max_id = 0;
        for root in &roots {
            let mut ids = Vec::new();
            root.subtree_ids(&mut ids);
            max_id = ids.into_iter().fold(max_id, NodeId::max);
        }
        let next_id = max_id
            .checked_add(1)
            .ok_or_else(|| EngineError::invalid(format!("node id {} leaves no room for new nodes", max_id)))?;
        let doc = Document { roots, selected_ids: Vec::new(), next_id, dirty: false };
        doc.check_invariants()?;
        Ok(doc)
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(Node::subtree_len).sum()
    }

    pub fn alloc_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn next_id_mut(&mut self) -> &mut NodeId {
        &mut self.next_id
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn add_root(&mut self, node: Node) {
        debug_assert!(self.find(node.id).is_none(), "node {} is already in the document", node.id);
        if node.id >= self.next_id {
            self.next_id = node.id + 1;
        }
        self.roots.push(node);
        self.mark_dirty();
    }

    /// Detaches a top-level node. Asking for a node that is not a root means the
    /// caller's view of the document is stale.
    pub fn remove_root(&mut self, id: NodeId) -> Option<Node> {
        let pos = self.roots.iter().position(|n| n.id == id);
        debug_assert!(pos.is_some(), "node {} is not a top-level node", id);
        let node = self.roots.remove(pos?);
        self.evict_subtree(&node);
        self.mark_dirty();
        Some(node)
    }

    pub fn clear(&mut self) {
        if self.roots.is_empty() {
            return;
        }
        self.roots.clear();
        self.selected_ids.clear();
        self.mark_dirty();
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.roots.iter().find_map(|n| n.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.roots.iter_mut().find_map(|n| n.find_mut(id))
    }

    /// Where a node lives: the id of its parent group (`None` for the top level)
    /// and its index within that container.
    pub fn locate(&self, id: NodeId) -> Option<(Option<NodeId>, usize)> {
        fn search(nodes: &[Node], parent: Option<NodeId>, id: NodeId) -> Option<(Option<NodeId>, usize)> {
            for (index, node) in nodes.iter().enumerate() {
                if node.id == id {
                    return Some((parent, index));
                }
                if let Some(found) = search(node.children(), Some(node.id), id) {
                    return Some(found);
                }
            }
            None
        }
        search(&self.roots, None, id)
    }

    pub(crate) fn container_mut(&mut self, parent: Option<NodeId>) -> Option<&mut Vec<Node>> {
        match parent {
            None => Some(&mut self.roots),
            Some(id) => self.find_mut(id)?.children_mut(),
        }
    }

    /// Swaps the node `id` for `f(node)` in place, keeping its slot in the container.
    pub(crate) fn replace_node(&mut self, id: NodeId, f: impl FnOnce(Node) -> Node) -> bool {
        let Some((parent, index)) = self.locate(id) else { return false };
        let Some(container) = self.container_mut(parent) else { return false };
        let old = container.remove(index);
        let new = f(old);
        debug_assert_eq!(new.id, id, "replacement must keep the node id");
        container.insert(index, new);
        true
    }

    // ---- selection ----

    /// Replaces the selection. Unknown and non-selectable ids are dropped.
    pub fn select(&mut self, ids: &[NodeId]) {
        let mut selected = Vec::with_capacity(ids.len());
        for &id in ids {
            if selected.contains(&id) {
                continue;
            }
            match self.find(id) {
                Some(node) if node.selectable => selected.push(id),
                _ => log::debug!("ignoring selection of node {}", id),
            }
        }
        self.selected_ids = selected;
    }

    pub fn toggle_selected(&mut self, id: NodeId) {
        if let Some(pos) = self.selected_ids.iter().position(|&s| s == id) {
            self.selected_ids.remove(pos);
        } else if self.find(id).is_some_and(|n| n.selectable) {
            self.selected_ids.push(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_ids.clear();
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected_ids.contains(&id)
    }

    pub fn selected_ids(&self) -> &[NodeId] {
        &self.selected_ids
    }

    pub fn selected_nodes(&self) -> Vec<&Node> {
        self.selected_ids.iter().filter_map(|&id| self.find(id)).collect()
    }

    pub(crate) fn deselect(&mut self, id: NodeId) {
        self.selected_ids.retain(|&s| s != id);
    }

    pub(crate) fn evict_subtree(&mut self, node: &Node) {
        let mut ids = Vec::new();
        node.subtree_ids(&mut ids);
        self.selected_ids.retain(|s| !ids.contains(s));
    }

    // ---- invariants ----

    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        fn walk(
            node: &Node,
            top_level: bool,
            seen: &mut HashSet<NodeId>,
        ) -> std::result::Result<(), InvariantViolation> {
            if !seen.insert(node.id) {
                return Err(InvariantViolation::DuplicateId(node.id));
            }
            if top_level && !(node.movable && node.selectable) {
                return Err(InvariantViolation::LockedRoot(node.id));
            }
            if !top_level && (node.movable || node.selectable) {
                return Err(InvariantViolation::IndependentChild(node.id));
            }
            if node.is_group() && node.children().is_empty() {
                return Err(InvariantViolation::EmptyGroup(node.id));
            }
            node.children().iter().try_for_each(|c| walk(c, false, seen))
        }

        let mut seen = HashSet::new();
        for root in &self.roots {
            walk(root, true, &mut seen)?;
        }
        for &id in &self.selected_ids {
            match self.find(id) {
                None => return Err(InvariantViolation::DanglingSelection(id)),
                Some(node) if !node.selectable => {
                    return Err(InvariantViolation::UnselectableSelection(id))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    pub(crate) fn debug_check(&self) {
        debug_assert_eq!(self.check_invariants(), Ok(()));
    }
}
