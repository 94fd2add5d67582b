use serde::Serialize;

use crate::config::EditorConfig;
use crate::document::Document;
use crate::draw::DrawSession;
use crate::objects::{Node, NodeId, NodeKind};
use crate::selection::paint_order;
use crate::types::{Affine, CornerStyle, Point, Rect, Style};

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Line { a: Point, b: Point },
    Rect { rect: Rect, corner: CornerStyle, corner_radius: f64 },
}

/// A leaf ready to paint: local geometry plus the affine that places it.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RenderItem {
    /// The leaf's own id, or 0 for the draw preview.
    pub node_id: NodeId,
    /// Canvas `setTransform` coefficients.
    pub transform: [f64; 6],
    pub primitive: Primitive,
    pub style: Style,
    pub selected: bool,
    pub dashed: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq, Default)]
pub struct RenderFrame {
    pub items: Vec<RenderItem>,
    /// World bounds of each selected node, for the dashed selection outline.
    pub selection_boxes: Vec<Rect>,
    pub preview: Option<RenderItem>,
}

impl RenderFrame {
    pub fn build(doc: &Document, session: &DrawSession, config: &EditorConfig) -> RenderFrame {
        let mut items = Vec::new();
        for node in paint_order(doc.roots()) {
            collect(node, Affine::IDENTITY, doc.is_selected(node.id), config, &mut items);
        }

        let selection_boxes = doc
            .selected_nodes()
            .into_iter()
            .filter_map(|n| n.world_bounds(Affine::IDENTITY))
            .collect();

        let preview = session.preview().and_then(|kind| {
            let (primitive, style) = primitive_of(kind, config)?;
            Some(RenderItem {
                node_id: 0,
                transform: Affine::IDENTITY.as_coeffs(),
                primitive,
                style,
                selected: false,
                dashed: true,
            })
        });

        RenderFrame { items, selection_boxes, preview }
    }
}

fn collect(node: &Node, parent: Affine, selected: bool, config: &EditorConfig, out: &mut Vec<RenderItem>) {
    let xf = parent * node.local_transform();
    if let NodeKind::Group { children } = &node.kind {
        for child in paint_order(children) {
            collect(child, xf, selected, config, out);
        }
        return;
    }
    if let Some((primitive, style)) = primitive_of(&node.kind, config) {
        out.push(RenderItem {
            node_id: node.id,
            transform: xf.as_coeffs(),
            primitive,
            style,
            selected,
            dashed: false,
        });
    }
}

fn primitive_of(kind: &NodeKind, config: &EditorConfig) -> Option<(Primitive, Style)> {
    match kind {
        NodeKind::Line { a, b, style } => Some((Primitive::Line { a: *a, b: *b }, *style)),
        NodeKind::Rect { rect, style, corner } => {
            let corner_radius = match corner {
                CornerStyle::Sharp => 0.0,
                CornerStyle::Curved => config.corner_radius,
            };
            Some((Primitive::Rect { rect: *rect, corner: *corner, corner_radius }, *style))
        }
        NodeKind::Group { .. } => None,
    }
}
