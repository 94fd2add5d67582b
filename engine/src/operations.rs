//! Document-level commands. Each one acts on the current selection only and
//! marks the document dirty when it changes anything.

use crate::document::Document;
use crate::error::{EngineError, Result};
use crate::objects::{Node, NodeId, NodeKind};
use crate::types::{Color, CornerStyle, Vec2};

/// A combined style edit, as issued by the edit dialog.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EditRequest {
    pub color: Option<Color>,
    pub corner: Option<CornerStyle>,
}

impl Document {
    pub fn bring_to_front(&mut self) -> bool {
        self.shift_z(1)
    }

    pub fn send_to_back(&mut self) -> bool {
        self.shift_z(-1)
    }

    fn shift_z(&mut self, step: i32) -> bool {
        let ids = self.selected_ids().to_vec();
        for &id in &ids {
            if let Some(node) = self.find_mut(id) {
                node.z_order += step;
            }
        }
        self.finish(!ids.is_empty())
    }

    /// Sets an absolute rotation, in degrees, on every selected node.
    pub fn rotate(&mut self, angle: f64) -> bool {
        let angle = angle.clamp(0.0, 360.0);
        let ids = self.selected_ids().to_vec();
        for &id in &ids {
            if let Some(node) = self.find_mut(id) {
                node.rotation = angle;
            }
        }
        self.finish(!ids.is_empty())
    }

    /// Moves every selected movable node by `delta`. Refused, with nothing
    /// moved, when any node would end up with non-finite scene coordinates.
    pub fn translate_selected(&mut self, delta: Vec2) -> Result<bool> {
        let movable: Vec<NodeId> = self
            .selected_nodes()
            .into_iter()
            .filter(|n| n.movable)
            .map(|n| n.id)
            .collect();
        if let Some(&id) = movable
            .iter()
            .find(|&&id| self.find(id).is_some_and(|n| !n.is_finite_at(delta)))
        {
            return Err(EngineError::invalid(format!("moving node {} leaves the finite plane", id)));
        }
        for &id in &movable {
            if let Some(node) = self.find_mut(id) {
                node.position += delta;
            }
        }
        Ok(self.finish(!movable.is_empty() && delta != Vec2::ZERO))
    }

    /// Deep-copies each selected node next to the original, shifted by `offset`.
    ///
    /// Copies get fresh ids throughout their subtree and are not selected.
    pub fn copy_selected(&mut self, offset: Vec2) -> Vec<NodeId> {
        let ids = self.selected_ids().to_vec();
        let mut created = Vec::with_capacity(ids.len());
        for id in ids {
            let Some((parent, _)) = self.locate(id) else { continue };
            let Some(original) = self.find(id) else { continue };
            let mut clone = original.clone();
            clone.renumber(self.next_id_mut());
            clone.position += offset;
            created.push(clone.id);
            if let Some(container) = self.container_mut(parent) {
                container.push(clone);
            }
        }
        log::debug!("copied {} node(s)", created.len());
        self.finish(!created.is_empty());
        created
    }

    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selected_ids().to_vec();
        let mut removed = 0;
        for id in ids {
            let Some((parent, index)) = self.locate(id) else { continue };
            let Some(container) = self.container_mut(parent) else { continue };
            let node = container.remove(index);
            self.evict_subtree(&node);
            removed += 1;
        }
        log::debug!("deleted {} node(s)", removed);
        self.finish(removed > 0);
        removed
    }

    /// Wraps the selection in a new group appended to the selection's container.
    ///
    /// Needs at least two selected nodes sharing one container. The members keep
    /// their container order and become group-local.
    pub fn group_selected(&mut self) -> Result<NodeId> {
        let ids = self.selected_ids().to_vec();
        if ids.len() < 2 {
            return Err(EngineError::invalid("grouping needs at least two selected nodes"));
        }
        let mut parent = None;
        for (i, &id) in ids.iter().enumerate() {
            let (p, _) = self
                .locate(id)
                .ok_or_else(|| EngineError::invalid(format!("node {} is not in the document", id)))?;
            if i > 0 && p != parent {
                return Err(EngineError::invalid("selected nodes belong to different containers"));
            }
            parent = p;
        }

        let group_id = self.alloc_id();
        let container = self
            .container_mut(parent)
            .ok_or_else(|| EngineError::invalid("selection container vanished"))?;
        let (members, rest): (Vec<Node>, Vec<Node>) =
            std::mem::take(container).into_iter().partition(|n| ids.contains(&n.id));
        *container = rest;
        let mut group = Node::group(group_id, members);
        if parent.is_some() {
            group.set_group_local(true);
        }
        container.push(group);

        for id in ids {
            self.deselect(id);
        }
        log::info!("grouped nodes into group {}", group_id);
        self.finish(true);
        Ok(group_id)
    }

    /// Dissolves one level of every selected group. Members return to the
    /// group's container, in its slot, with the group's offset folded in.
    pub fn ungroup_selected(&mut self) -> Result<Vec<NodeId>> {
        self.dissolve_selected_groups(|group, out| {
            let offset = group.position;
            if let NodeKind::Group { children } = group.kind {
                for mut child in children {
                    child.position += offset;
                    child.set_group_local(false);
                    out.push(child);
                }
            }
        })
    }

    /// Dissolves every level of nesting under each selected group, leaving only
    /// leaves with their accumulated offsets.
    pub fn ungroup_all_selected(&mut self) -> Result<Vec<NodeId>> {
        self.dissolve_selected_groups(|group, out| group.flatten_leaves(Vec2::ZERO, out))
    }

    fn dissolve_selected_groups(&mut self, expand: impl Fn(Node, &mut Vec<Node>)) -> Result<Vec<NodeId>> {
        let groups: Vec<NodeId> = self
            .selected_nodes()
            .into_iter()
            .filter(|n| n.is_group())
            .map(|n| n.id)
            .collect();
        if groups.is_empty() {
            return Err(EngineError::invalid("no group is selected"));
        }

        let mut released = Vec::new();
        for group_id in groups {
            let Some((parent, index)) = self.locate(group_id) else { continue };
            let Some(container) = self.container_mut(parent) else { continue };
            let group = container.remove(index);
            let mut freed = Vec::new();
            expand(group, &mut freed);
            if parent.is_some() {
                for node in &mut freed {
                    node.set_group_local(true);
                }
            }
            released.extend(freed.iter().map(|n| n.id));
            container.splice(index..index, freed);
            self.deselect(group_id);
        }
        log::info!("ungrouped {} node(s)", released.len());
        self.finish(true);
        Ok(released)
    }

    /// Sets the stroke color of every selected shape. Refused when any group is selected.
    pub fn set_stroke_color(&mut self, color: Color) -> Result<usize> {
        self.ensure_shapes_selected()?;
        let ids = self.selected_ids().to_vec();
        let mut changed = 0;
        for id in ids {
            if let Some(style) = self.find_mut(id).and_then(Node::style_mut) {
                style.stroke_color = color;
                changed += 1;
            }
        }
        self.finish(changed > 0);
        Ok(changed)
    }

    /// Switches selected rectangles to `corner`, replacing each node in its
    /// container. Geometry, style, offset, rotation, z-order and flags carry over.
    pub fn set_corner_style(&mut self, corner: CornerStyle) -> Result<usize> {
        self.ensure_shapes_selected()?;
        let rects: Vec<NodeId> = self
            .selected_nodes()
            .into_iter()
            .filter(|n| n.corner().is_some())
            .map(|n| n.id)
            .collect();
        if rects.is_empty() {
            return Err(EngineError::invalid("corner style applies to rectangles only"));
        }

        let mut changed = 0;
        for id in rects {
            if self.find(id).and_then(Node::corner) == Some(corner) {
                continue;
            }
            let replaced = self.replace_node(id, |old| match old.kind {
                NodeKind::Rect { rect, style, .. } => Node {
                    kind: NodeKind::Rect { rect, style, corner },
                    ..old
                },
                _ => old,
            });
            if replaced {
                changed += 1;
            }
        }
        self.finish(changed > 0);
        Ok(changed)
    }

    /// Applies an edit dialog result. Validation happens before anything changes.
    pub fn edit(&mut self, request: EditRequest) -> Result<()> {
        self.ensure_shapes_selected()?;
        if request.corner.is_some() && !self.selected_nodes().iter().any(|n| n.corner().is_some()) {
            return Err(EngineError::invalid("corner style applies to rectangles only"));
        }
        if let Some(corner) = request.corner {
            self.set_corner_style(corner)?;
        }
        if let Some(color) = request.color {
            self.set_stroke_color(color)?;
        }
        Ok(())
    }

    fn ensure_shapes_selected(&self) -> Result<()> {
        let selected = self.selected_nodes();
        if selected.is_empty() {
            return Err(EngineError::invalid("no item selected"));
        }
        if selected.iter().any(|n| n.is_group()) {
            return Err(EngineError::invalid("group object(s) selected"));
        }
        Ok(())
    }

    fn finish(&mut self, changed: bool) -> bool {
        if changed {
            self.mark_dirty();
        }
        self.debug_check();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, Rect, Style};

    fn style() -> Style {
        Style::stroke(Color::WHITE, 4.0)
    }

    fn doc_with_shapes() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let a = doc.alloc_id();
        doc.add_root(Node::line(a, Point::ZERO, Point::new(10.0, 10.0), style()));
        let b = doc.alloc_id();
        doc.add_root(Node::rect(b, Rect::new(0.0, 0.0, 10.0, 5.0), style(), CornerStyle::Sharp));
        (doc, a, b)
    }

    #[test]
    fn z_order_steps() {
        let (mut doc, a, b) = doc_with_shapes();
        doc.mark_clean();
        assert!(!doc.bring_to_front());
        assert!(!doc.is_dirty());

        doc.select(&[a]);
        doc.bring_to_front();
        doc.bring_to_front();
        assert_eq!(doc.find(a).unwrap().z_order, 2);
        doc.select(&[b]);
        doc.send_to_back();
        assert_eq!(doc.find(b).unwrap().z_order, -1);
        assert!(doc.is_dirty());
    }

    #[test]
    fn rotate_is_absolute() {
        let (mut doc, a, _) = doc_with_shapes();
        doc.select(&[a]);
        doc.rotate(30.0);
        doc.rotate(45.0);
        assert_eq!(doc.find(a).unwrap().rotation, 45.0);
        doc.rotate(400.0);
        assert_eq!(doc.find(a).unwrap().rotation, 360.0);
    }

    #[test]
    fn group_needs_two() {
        let (mut doc, a, _) = doc_with_shapes();
        doc.select(&[a]);
        assert!(matches!(doc.group_selected(), Err(EngineError::InvalidOperation(_))));
        assert_eq!(doc.roots().len(), 2);
    }

    #[test]
    fn group_then_ungroup() {
        let (mut doc, a, b) = doc_with_shapes();
        doc.select(&[b, a]);
        let g = doc.group_selected().unwrap();
        assert_eq!(doc.roots().len(), 1);
        let group = doc.find(g).unwrap();
        let order: Vec<_> = group.children().iter().map(|c| c.id).collect();
        assert_eq!(order, vec![a, b]);
        assert!(doc.selected_ids().is_empty());

        doc.find_mut(g).unwrap().position = Vec2::new(5.0, 7.0);
        doc.select(&[g]);
        let released = doc.ungroup_selected().unwrap();
        assert_eq!(released, vec![a, b]);
        assert_eq!(doc.roots().len(), 2);
        for id in [a, b] {
            let n = doc.find(id).unwrap();
            assert!(n.movable && n.selectable);
            assert_eq!(n.position, Vec2::new(5.0, 7.0));
        }
        assert_eq!(doc.check_invariants(), Ok(()));
    }

    #[test]
    fn ungroup_without_group_is_rejected() {
        let (mut doc, a, _) = doc_with_shapes();
        doc.select(&[a]);
        assert!(doc.ungroup_selected().is_err());
        assert!(doc.ungroup_all_selected().is_err());
    }

    #[test]
    fn copy_offsets_clone_and_keeps_original() {
        let (mut doc, a, _) = doc_with_shapes();
        doc.find_mut(a).unwrap().position = Vec2::new(1.0, 2.0);
        let before = doc.find(a).unwrap().clone();
        doc.select(&[a]);
        let created = doc.copy_selected(Vec2::new(20.0, 20.0));
        assert_eq!(created.len(), 1);
        let clone = doc.find(created[0]).unwrap();
        assert_eq!(clone.position, Vec2::new(21.0, 22.0));
        assert!(clone.structurally_eq(&before));
        assert_eq!(doc.find(a).unwrap(), &before);
        assert_eq!(doc.selected_ids(), &[a]);
        assert_eq!(doc.roots().len(), 3);
    }

    #[test]
    fn delete_cascades_selection() {
        let (mut doc, a, b) = doc_with_shapes();
        doc.select(&[a, b]);
        let g = doc.group_selected().unwrap();
        doc.select(&[g]);
        assert_eq!(doc.delete_selected(), 1);
        assert!(doc.is_empty());
        assert!(doc.selected_ids().is_empty());
        assert_eq!(doc.check_invariants(), Ok(()));
    }

    #[test]
    fn edit_is_blocked_by_groups() {
        let (mut doc, a, b) = doc_with_shapes();
        doc.select(&[a, b]);
        let g = doc.group_selected().unwrap();
        doc.select(&[g]);
        let err = doc.set_stroke_color(Color::rgb(255, 0, 0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOperation(_)));
        doc.clear_selection();
        assert!(doc.edit(EditRequest { color: Some(Color::BLACK), corner: None }).is_err());
    }

    #[test]
    fn corner_change_preserves_everything_else() {
        let (mut doc, a, b) = doc_with_shapes();
        {
            let n = doc.find_mut(b).unwrap();
            n.position = Vec2::new(3.0, 4.0);
            n.z_order = 7;
            n.rotation = 15.0;
        }
        let before = doc.find(b).unwrap().clone();
        doc.select(&[a, b]);
        assert_eq!(doc.set_corner_style(CornerStyle::Curved).unwrap(), 1);
        let after = doc.find(b).unwrap();
        assert_eq!(after.corner(), Some(CornerStyle::Curved));
        assert_eq!(after.position, before.position);
        assert_eq!(after.z_order, before.z_order);
        assert_eq!(after.rotation, before.rotation);
        assert_eq!(after.style(), before.style());
        assert_eq!(doc.locate(b), Some((None, 1)));
        assert_eq!(doc.set_corner_style(CornerStyle::Curved).unwrap(), 0);
    }

    #[test]
    fn edit_applies_color_and_corner() {
        let (mut doc, a, b) = doc_with_shapes();
        doc.select(&[a, b]);
        let red = Color::rgb(255, 0, 0);
        doc.edit(EditRequest { color: Some(red), corner: Some(CornerStyle::Curved) }).unwrap();
        assert_eq!(doc.find(a).unwrap().style().unwrap().stroke_color, red);
        assert_eq!(doc.find(b).unwrap().style().unwrap().stroke_color, red);
        assert_eq!(doc.find(b).unwrap().corner(), Some(CornerStyle::Curved));
    }
}
