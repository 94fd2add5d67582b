use serde::{Serialize, Deserialize};
use kurbo::{RoundedRect, Shape};
use crate::types::{Affine, CornerStyle, Point, Rect, Style, Vec2};

pub type NodeId = u32;

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Line { a: Point, b: Point, style: Style },
    Rect { rect: Rect, style: Style, corner: CornerStyle },
    Group { children: Vec<Node> },
}

/// One entry of the scene tree.
///
/// `position` is an offset relative to the enclosing container and `rotation`
/// is an absolute angle in degrees around the node's local origin. Members of a
/// group are never movable or selectable on their own.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Node {
    pub id: NodeId,
    pub z_order: i32,
    pub position: Vec2,
    pub rotation: f64,
    pub movable: bool,
    pub selectable: bool,
    pub kind: NodeKind,
}

impl Node {
    fn with_kind(id: NodeId, kind: NodeKind) -> Node {
        Node {
            id,
            z_order: 0,
            position: Vec2::ZERO,
            rotation: 0.0,
            movable: true,
            selectable: true,
            kind,
        }
    }

    pub fn line(id: NodeId, a: Point, b: Point, style: Style) -> Node {
        Node::with_kind(id, NodeKind::Line { a, b, style })
    }

    pub fn rect(id: NodeId, rect: Rect, style: Style, corner: CornerStyle) -> Node {
        Node::with_kind(id, NodeKind::Rect { rect, style, corner })
    }

    /// Wraps `children` in a group. The children become group-local.
    pub fn group(id: NodeId, mut children: Vec<Node>) -> Node {
        for child in &mut children {
            child.set_group_local(true);
        }
        Node::with_kind(id, NodeKind::Group { children })
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Group { children } => children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.kind {
            NodeKind::Group { children } => Some(children),
            _ => None,
        }
    }

    pub fn style(&self) -> Option<&Style> {
        match &self.kind {
            NodeKind::Line { style, .. } | NodeKind::Rect { style, .. } => Some(style),
            NodeKind::Group { .. } => None,
        }
    }

    pub fn style_mut(&mut self) -> Option<&mut Style> {
        match &mut self.kind {
            NodeKind::Line { style, .. } | NodeKind::Rect { style, .. } => Some(style),
            NodeKind::Group { .. } => None,
        }
    }

    pub fn corner(&self) -> Option<CornerStyle> {
        match self.kind {
            NodeKind::Rect { corner, .. } => Some(corner),
            _ => None,
        }
    }

    pub fn set_group_local(&mut self, local: bool) {
        self.movable = !local;
        self.selectable = !local;
    }

    pub fn local_transform(&self) -> Affine {
        Affine::translate(self.position) * Affine::rotate(self.rotation.to_radians())
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.kind {
            NodeKind::Group { children } => children.iter_mut().find_map(|c| c.find_mut(id)),
            _ => None,
        }
    }

    pub fn subtree_ids(&self, out: &mut Vec<NodeId>) {
        out.push(self.id);
        for child in self.children() {
            child.subtree_ids(out);
        }
    }

    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(Node::subtree_len).sum::<usize>()
    }

    pub fn renumber(&mut self, next_id: &mut NodeId) {
        self.id = *next_id;
        *next_id += 1;
        if let Some(children) = self.children_mut() {
            for child in children {
                child.renumber(next_id);
            }
        }
    }

    /// Consumes a subtree and emits its leaves, independent again, with the
    /// offset of every dissolved group folded into their own position.
    pub fn flatten_leaves(mut self, offset: Vec2, out: &mut Vec<Node>) {
        if let NodeKind::Group { children } = &mut self.kind {
            let children = std::mem::take(children);
            let offset = offset + self.position;
            for child in children {
                child.flatten_leaves(offset, out);
            }
            return;
        }
        self.position += offset;
        self.set_group_local(false);
        out.push(self);
    }

    /// Whether every scene coordinate of the subtree stays finite once the
    /// enclosing `offset` and this node's position are applied.
    pub fn is_finite_at(&self, offset: Vec2) -> bool {
        let offset = offset + self.position;
        let finite = |p: Point| (p + offset).x.is_finite() && (p + offset).y.is_finite();
        match &self.kind {
            NodeKind::Line { a, b, .. } => finite(*a) && finite(*b),
            NodeKind::Rect { rect, .. } => finite(Point::new(rect.x0, rect.y0)) && finite(Point::new(rect.x1, rect.y1)),
            NodeKind::Group { children } => children.iter().all(|c| c.is_finite_at(offset)),
        }
    }

    /// Same tree shape, geometry, stroke color and corner style.
    pub fn structurally_eq(&self, other: &Node) -> bool {
        match (&self.kind, &other.kind) {
            (NodeKind::Line { a, b, style }, NodeKind::Line { a: a2, b: b2, style: s2 }) => {
                a == a2 && b == b2 && style.stroke_color == s2.stroke_color
            }
            (
                NodeKind::Rect { rect, style, corner },
                NodeKind::Rect { rect: r2, style: s2, corner: c2 },
            ) => rect == r2 && corner == c2 && style.stroke_color == s2.stroke_color,
            (NodeKind::Group { children }, NodeKind::Group { children: c2 }) => {
                children.len() == c2.len()
                    && children.iter().zip(c2).all(|(x, y)| x.structurally_eq(y))
            }
            _ => false,
        }
    }

    /// Axis-aligned bounds of the node under `parent`, or `None` for an empty group.
    pub fn world_bounds(&self, parent: Affine) -> Option<Rect> {
        let xf = parent * self.local_transform();
        match &self.kind {
            NodeKind::Line { a, b, .. } => Some(Rect::from_points(xf * *a, xf * *b)),
            NodeKind::Rect { rect, .. } => {
                let corners = [
                    Point::new(rect.x0, rect.y0),
                    Point::new(rect.x1, rect.y0),
                    Point::new(rect.x1, rect.y1),
                    Point::new(rect.x0, rect.y1),
                ];
                let first = xf * corners[0];
                Some(corners[1..].iter().fold(Rect::from_points(first, first), |acc, c| acc.union_pt(xf * *c)))
            }
            NodeKind::Group { children } => children
                .iter()
                .filter_map(|c| c.world_bounds(xf))
                .reduce(|acc, r| acc.union(r)),
        }
    }

    /// Whether the world-space point `p` hits the node, `parent` being the
    /// transform of the enclosing container.
    pub fn hit_test(&self, parent: Affine, p: Point, tolerance: f64, corner_radius: f64) -> bool {
        let xf = parent * self.local_transform();
        match &self.kind {
            NodeKind::Line { a, b, style } => {
                let local = xf.inverse() * p;
                segment_distance(local, *a, *b) <= tolerance + style.stroke_width / 2.0
            }
            NodeKind::Rect { rect, corner, .. } => {
                let local = xf.inverse() * p;
                let area = rect.inflate(tolerance, tolerance);
                match corner {
                    CornerStyle::Sharp => area.contains(local),
                    CornerStyle::Curved => RoundedRect::from_rect(area, corner_radius).contains(local),
                }
            }
            NodeKind::Group { children } => children
                .iter()
                .any(|c| c.hit_test(xf, p, tolerance, corner_radius)),
        }
    }
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}
