use crate::config::EditorConfig;
use crate::document::Document;
use crate::objects::{Node, NodeId, NodeKind};
use crate::types::{rect_from_corners, CornerStyle, Point, Style, Tool};

/// Turns a pointer drag into a committed shape.
#[derive(Clone, Debug)]
pub struct DrawSession {
    tool: Option<Tool>,
    anchor: Option<Point>,
    preview: Option<NodeKind>,
    shape_style: Style,
    preview_style: Style,
}

impl DrawSession {
    pub fn new(config: &EditorConfig) -> DrawSession {
        DrawSession {
            tool: None,
            anchor: None,
            preview: None,
            shape_style: config.shape_style(),
            preview_style: config.preview_style(),
        }
    }

    pub fn tool(&self) -> Option<Tool> {
        self.tool
    }

    /// Changes the active tool. Refused while a gesture is in progress.
    pub fn set_tool(&mut self, tool: Option<Tool>) -> bool {
        if self.is_dragging() {
            log::warn!("tool change to {:?} ignored during a drag", tool);
            return false;
        }
        self.tool = tool;
        true
    }

    pub fn is_active(&self) -> bool {
        self.tool.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    pub fn preview(&self) -> Option<&NodeKind> {
        self.preview.as_ref()
    }

    pub fn pointer_down(&mut self, pos: Point) -> bool {
        if !self.is_active() {
            return false;
        }
        if !self.is_dragging() {
            self.anchor = Some(pos);
            self.preview = None;
        }
        true
    }

    pub fn pointer_move(&mut self, pos: Point) -> bool {
        let (Some(tool), Some(anchor)) = (self.tool, self.anchor) else {
            return self.is_active();
        };
        self.preview = Some(shape_kind(tool, anchor, pos, self.preview_style));
        true
    }

    /// Ends the gesture: the shape from the anchor to `pos` is appended to the
    /// document and the preview is dropped.
    pub fn pointer_up(&mut self, pos: Point, doc: &mut Document) -> Option<NodeId> {
        let tool = self.tool?;
        let anchor = self.anchor.take()?;
        self.preview = None;

        let id = doc.alloc_id();
        let node = match shape_kind(tool, anchor, pos, self.shape_style) {
            NodeKind::Line { a, b, style } => Node::line(id, a, b, style),
            NodeKind::Rect { rect, style, corner } => Node::rect(id, rect, style, corner),
            NodeKind::Group { .. } => return None,
        };
        doc.add_root(node);
        log::debug!("committed {:?} {} from {:?} to {:?}", tool, id, anchor, pos);
        Some(id)
    }
}

fn shape_kind(tool: Tool, anchor: Point, current: Point, style: Style) -> NodeKind {
    match tool {
        Tool::Line => NodeKind::Line { a: anchor, b: current, style },
        Tool::Rectangle => NodeKind::Rect {
            rect: rect_from_corners(anchor, current),
            style,
            corner: CornerStyle::Sharp,
        },
    }
}
