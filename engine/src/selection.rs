use crate::config::EditorConfig;
use crate::document::Document;
use crate::objects::{Node, NodeId};
use crate::types::{Affine, Point};

/// Siblings in paint order: ascending z, ties kept in container order.
pub fn paint_order(nodes: &[Node]) -> Vec<&Node> {
    let mut ordered: Vec<&Node> = nodes.iter().collect();
    ordered.sort_by_key(|n| n.z_order);
    ordered
}

impl Document {
    /// The topmost selectable top-level node under `p`.
    pub fn hit_test(&self, p: Point, config: &EditorConfig) -> Option<NodeId> {
        paint_order(self.roots())
            .into_iter()
            .rev()
            .find(|n| n.selectable && n.hit_test(Affine::IDENTITY, p, config.hit_tolerance, config.corner_radius))
            .map(|n| n.id)
    }

    /// Click selection: replaces the selection with the hit node, or toggles it
    /// when `shift` is held. Clicking an already selected node keeps the
    /// selection so the whole set can be dragged.
    pub fn select_point(&mut self, p: Point, shift: bool, config: &EditorConfig) -> Option<NodeId> {
        let hit = self.hit_test(p, config);
        match hit {
            Some(id) if shift => self.toggle_selected(id),
            Some(id) if self.is_selected(id) => {}
            Some(id) => self.select(&[id]),
            None if shift => {}
            None => self.clear_selection(),
        }
        hit
    }
}

/// Pointer handling while no draw tool is active: click to select, drag to move.
#[derive(Clone, Debug, Default)]
pub struct DragMove {
    last: Option<Point>,
    moved: bool,
}

impl DragMove {
    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    pub fn pointer_down(&mut self, doc: &mut Document, p: Point, shift: bool, config: &EditorConfig) -> Option<NodeId> {
        let hit = doc.select_point(p, shift, config);
        self.last = hit.filter(|&id| doc.is_selected(id)).map(|_| p);
        self.moved = false;
        hit
    }

    pub fn pointer_move(&mut self, doc: &mut Document, p: Point) -> bool {
        let Some(last) = self.last else { return false };
        self.last = Some(p);
        let moved = match doc.translate_selected(p - last) {
            Ok(moved) => moved,
            Err(e) => {
                log::warn!("drag step ignored: {}", e);
                false
            }
        };
        self.moved |= moved;
        moved
    }

    pub fn pointer_up(&mut self, doc: &mut Document, p: Point) -> bool {
        if self.last.is_some() {
            self.pointer_move(doc, p);
        }
        self.last = None;
        std::mem::take(&mut self.moved)
    }
}
