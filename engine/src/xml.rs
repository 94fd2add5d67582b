use crate::error::{EngineError, Result};
use crate::io::{parse_color, parse_coord};
use crate::objects::{Node, NodeId, NodeKind};
use crate::types::{rect_from_corners, CornerStyle, Point, Style, Vec2};

/// Writes the save set as a `<drawing>` document. Coordinates are scene
/// coordinates, as in the text format.
pub fn write_xml(nodes: &[Node]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<drawing>\n");
    for node in nodes {
        write_node(node, Vec2::ZERO, 1, &mut out);
    }
    out.push_str("</drawing>\n");
    out
}

fn write_node(node: &Node, offset: Vec2, level: usize, out: &mut String) {
    let offset = offset + node.position;
    let pad = "  ".repeat(level);
    match &node.kind {
        NodeKind::Line { a, b, style } => {
            out.push_str(&format!(
                "{pad}<line>\n{pad}  {}\n{pad}  {}\n{pad}  <color>{}</color>\n{pad}</line>\n",
                point_element("begin", *a + offset),
                point_element("end", *b + offset),
                style.stroke_color,
                pad = pad
            ));
        }
        NodeKind::Rect { rect, style, corner } => {
            out.push_str(&format!(
                "{pad}<rectangle>\n{pad}  {}\n{pad}  {}\n{pad}  <color>{}</color>\n{pad}  <corner>{}</corner>\n{pad}</rectangle>\n",
                point_element("upper-left", Point::new(rect.x0, rect.y0) + offset),
                point_element("lower-right", Point::new(rect.x1, rect.y1) + offset),
                style.stroke_color,
                corner.xml_name(),
                pad = pad
            ));
        }
        NodeKind::Group { children } => {
            out.push_str(&format!("{}<group>\n", pad));
            for child in children {
                write_node(child, offset, level + 1, out);
            }
            out.push_str(&format!("{}</group>\n", pad));
        }
    }
}

fn point_element(tag: &str, p: Point) -> String {
    format!("<{tag}><x>{:?}</x><y>{:?}</y></{tag}>", p.x, p.y, tag = tag)
}

pub fn read_xml(input: &str, style: Style) -> Result<Vec<Node>> {
    let doc = roxmltree::Document::parse(input)?;
    let root = doc.root_element();
    if root.tag_name().name() != "drawing" {
        return Err(EngineError::malformed(
            line_of(&doc, root),
            format!("root element is <{}>, expected <drawing>", root.tag_name().name()),
        ));
    }

    let mut next_id: NodeId = 1;
    root.children()
        .filter(|n| n.is_element())
        .map(|n| parse_node(&doc, n, style, &mut next_id))
        .collect()
}

fn parse_node(doc: &roxmltree::Document, node: roxmltree::Node, style: Style, next_id: &mut NodeId) -> Result<Node> {
    let line = line_of(doc, node);
    match node.tag_name().name() {
        "line" => {
            let a = point(doc, node, "begin")?;
            let b = point(doc, node, "end")?;
            let style = Style { stroke_color: parse_color(line, text(doc, node, "color")?)?, ..style };
            Ok(Node::line(take_id(next_id), a, b, style))
        }
        "rectangle" => {
            let ul = point(doc, node, "upper-left")?;
            let lr = point(doc, node, "lower-right")?;
            let style = Style { stroke_color: parse_color(line, text(doc, node, "color")?)?, ..style };
            let corner_name = text(doc, node, "corner")?;
            let corner = CornerStyle::from_xml_name(corner_name)
                .ok_or_else(|| EngineError::malformed(line, format!("unknown corner `{}`", corner_name)))?;
            Ok(Node::rect(take_id(next_id), rect_from_corners(ul, lr), style, corner))
        }
        "group" => {
            let children = node
                .children()
                .filter(|n| n.is_element())
                .map(|n| parse_node(doc, n, style, next_id))
                .collect::<Result<Vec<_>>>()?;
            if children.is_empty() {
                return Err(EngineError::malformed(line, "group has no members"));
            }
            Ok(Node::group(take_id(next_id), children))
        }
        other => Err(EngineError::malformed(line, format!("unknown element <{}>", other))),
    }
}

fn take_id(next_id: &mut NodeId) -> NodeId {
    let id = *next_id;
    *next_id += 1;
    id
}

fn line_of(doc: &roxmltree::Document, node: roxmltree::Node) -> usize {
    doc.text_pos_at(node.range().start).row as usize
}

fn child<'a, 'input>(node: roxmltree::Node<'a, 'input>, name: &str) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|c| c.is_element() && c.tag_name().name() == name)
}

fn text<'a>(doc: &roxmltree::Document, node: roxmltree::Node<'a, '_>, name: &str) -> Result<&'a str> {
    child(node, name)
        .and_then(|c| c.text())
        .map(str::trim)
        .ok_or_else(|| EngineError::malformed(line_of(doc, node), format!("missing <{}>", name)))
}

fn point(doc: &roxmltree::Document, node: roxmltree::Node, name: &str) -> Result<Point> {
    let el = child(node, name)
        .ok_or_else(|| EngineError::malformed(line_of(doc, node), format!("missing <{}>", name)))?;
    let line = line_of(doc, el);
    Ok(Point::new(parse_coord(line, text(doc, el, "x")?)?, parse_coord(line, text(doc, el, "y")?)?))
}
