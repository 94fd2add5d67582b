use std::path::Path;

use wasm_bindgen::prelude::*;

use crate::config::EditorConfig;
use crate::engine::DiagramEngine;
use crate::error::{EngineError, Result};
use crate::objects::{Node, NodeId, NodeKind};
use crate::types::{rect_from_corners, Color, CornerStyle, Point, Rect, Style, Vec2};
use crate::xml;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FileFormat {
    Text,
    Xml,
}

impl FileFormat {
    pub fn from_path(path: impl AsRef<Path>) -> Option<FileFormat> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "txt" => Some(FileFormat::Text),
            "xml" => Some(FileFormat::Xml),
            _ => None,
        }
    }

    pub fn encode(self, nodes: &[Node], config: &EditorConfig) -> String {
        match self {
            FileFormat::Text => write_text(nodes, config.text_indent),
            FileFormat::Xml => xml::write_xml(nodes),
        }
    }

    pub fn decode(self, input: &str, config: &EditorConfig) -> Result<Vec<Node>> {
        match self {
            FileFormat::Text => read_text(input, config.shape_style()),
            FileFormat::Xml => xml::read_xml(input, config.shape_style()),
        }
    }
}

/// Writes the save set in document order, one record per line.
///
/// Coordinates are scene coordinates: every enclosing offset is folded in.
pub fn write_text(nodes: &[Node], indent: usize) -> String {
    let mut out = String::new();
    for node in nodes {
        write_text_node(node, Vec2::ZERO, 0, indent, &mut out);
    }
    out
}

fn write_text_node(node: &Node, offset: Vec2, level: usize, indent: usize, out: &mut String) {
    let offset = offset + node.position;
    let pad = " ".repeat(level * indent);
    match &node.kind {
        NodeKind::Line { a, b, style } => {
            let (a, b) = (*a + offset, *b + offset);
            out.push_str(&format!("{}line {:?} {:?} {:?} {:?} {}\n", pad, a.x, a.y, b.x, b.y, style.stroke_color));
        }
        NodeKind::Rect { rect, style, corner } => {
            out.push_str(&format!(
                "{}rect {:?} {:?} {:?} {:?} {} {}\n",
                pad,
                rect.x0 + offset.x,
                rect.y0 + offset.y,
                rect.x1 + offset.x,
                rect.y1 + offset.y,
                style.stroke_color,
                corner.tag()
            ));
        }
        NodeKind::Group { children } => {
            out.push_str(&format!("{}begin\n", pad));
            for child in children {
                write_text_node(child, offset, level + 1, indent, out);
            }
            out.push_str(&format!("{}end\n", pad));
        }
    }
}

/// Parses the text format into a fresh save set.
///
/// Rebuilds nesting from `begin`/`end`; any malformed record or unbalanced
/// delimiter fails the whole read. Shapes take `style` except for the stroke
/// color stored in the record.
pub fn read_text(input: &str, style: Style) -> Result<Vec<Node>> {
    let mut next_id: NodeId = 1;
    let mut stack: Vec<Vec<Node>> = vec![Vec::new()];
    let mut line_no = 0;

    for raw in input.lines() {
        line_no += 1;
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        let Some((&keyword, args)) = tokens.split_first() else { continue };

        let node = match keyword {
            "begin" => {
                expect_args(line_no, keyword, args, 0)?;
                stack.push(Vec::new());
                continue;
            }
            "end" => {
                expect_args(line_no, keyword, args, 0)?;
                if stack.len() == 1 {
                    return Err(EngineError::malformed(line_no, "`end` without a matching `begin`"));
                }
                let children = stack.pop().unwrap_or_default();
                if children.is_empty() {
                    return Err(EngineError::malformed(line_no, "group has no members"));
                }
                Node::group(take_id(&mut next_id), children)
            }
            "line" => {
                expect_args(line_no, keyword, args, 5)?;
                let (a, b) = parse_corners(line_no, &args[..4])?;
                let style = Style { stroke_color: parse_color(line_no, args[4])?, ..style };
                Node::line(take_id(&mut next_id), a, b, style)
            }
            "rect" if args.len() == 5 => {
                let rect = parse_origin_size(line_no, &args[..4])?;
                let style = Style { stroke_color: parse_color(line_no, args[4])?, ..style };
                Node::rect(take_id(&mut next_id), rect, style, CornerStyle::Sharp)
            }
            "rect" => {
                expect_args(line_no, keyword, args, 6)?;
                let (a, b) = parse_corners(line_no, &args[..4])?;
                let style = Style { stroke_color: parse_color(line_no, args[4])?, ..style };
                let corner = CornerStyle::from_tag(args[5]).ok_or_else(|| {
                    EngineError::malformed(line_no, format!("unknown corner tag `{}`", args[5]))
                })?;
                Node::rect(take_id(&mut next_id), rect_from_corners(a, b), style, corner)
            }
            "roundedrect" => {
                expect_args(line_no, keyword, args, 5)?;
                let rect = parse_origin_size(line_no, &args[..4])?;
                let style = Style { stroke_color: parse_color(line_no, args[4])?, ..style };
                Node::rect(take_id(&mut next_id), rect, style, CornerStyle::Curved)
            }
            other => {
                return Err(EngineError::malformed(line_no, format!("unknown record `{}`", other)));
            }
        };

        if let Some(top) = stack.last_mut() {
            top.push(node);
        }
    }

    if stack.len() > 1 {
        return Err(EngineError::malformed(line_no, "end of input inside an open group"));
    }
    Ok(stack.pop().unwrap_or_default())
}

fn take_id(next_id: &mut NodeId) -> NodeId {
    let id = *next_id;
    *next_id += 1;
    id
}

fn expect_args(line: usize, keyword: &str, args: &[&str], count: usize) -> Result<()> {
    if args.len() != count {
        return Err(EngineError::malformed(
            line,
            format!("`{}` takes {} fields, found {}", keyword, count, args.len()),
        ));
    }
    Ok(())
}

pub(crate) fn parse_coord(line: usize, token: &str) -> Result<f64> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(EngineError::malformed(line, format!("bad coordinate `{}`", token))),
    }
}

fn parse_corners(line: usize, tokens: &[&str]) -> Result<(Point, Point)> {
    let a = Point::new(parse_coord(line, tokens[0])?, parse_coord(line, tokens[1])?);
    let b = Point::new(parse_coord(line, tokens[2])?, parse_coord(line, tokens[3])?);
    Ok((a, b))
}

/// Older files store rectangles as `x y width height`.
fn parse_origin_size(line: usize, tokens: &[&str]) -> Result<Rect> {
    let (origin, size) = parse_corners(line, tokens)?;
    if size.x < 0.0 || size.y < 0.0 {
        return Err(EngineError::malformed(line, "negative rectangle size"));
    }
    Ok(Rect::new(origin.x, origin.y, origin.x + size.x, origin.y + size.y))
}

pub(crate) fn parse_color(line: usize, token: &str) -> Result<Color> {
    token.parse().map_err(|e: String| EngineError::malformed(line, e))
}

pub fn save_file(path: impl AsRef<Path>, nodes: &[Node], config: &EditorConfig) -> Result<()> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)
        .ok_or_else(|| EngineError::invalid(format!("unsupported file type: {}", path.display())))?;
    let data = format.encode(nodes, config);
    std::fs::write(path, data)?;
    log::info!("saved {} node(s) to {}", nodes.len(), path.display());
    Ok(())
}

pub fn load_file(path: impl AsRef<Path>, config: &EditorConfig) -> Result<Vec<Node>> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)
        .ok_or_else(|| EngineError::invalid(format!("unsupported file type: {}", path.display())))?;
    let input = std::fs::read_to_string(path)?;
    let nodes = format.decode(&input, config)?;
    log::info!("loaded {} node(s) from {}", nodes.len(), path.display());
    Ok(nodes)
}

impl DiagramEngine {
    /// Saves the save set to `path`, choosing the format by extension, and
    /// marks the document clean on success. A document that fails its
    /// invariant check is never written.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.document.check_invariants()?;
        save_file(path, self.document.roots(), &self.config)?;
        self.document.mark_clean();
        Ok(())
    }

    /// Replaces the document with the contents of `path`. On any failure the
    /// current document is left as it was.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let nodes = load_file(path, &self.config)?;
        self.load_save_set(nodes)
    }

    pub fn load_str(&mut self, format: FileFormat, input: &str) -> Result<()> {
        let nodes = format.decode(input, &self.config)?;
        self.load_save_set(nodes)
    }
}

#[wasm_bindgen]
impl DiagramEngine {
    pub fn export_text(&self) -> String {
        FileFormat::Text.encode(self.document.roots(), &self.config)
    }

    pub fn export_xml(&self) -> String {
        FileFormat::Xml.encode(self.document.roots(), &self.config)
    }

    /// Encodes the save set for a download named `filename`. Empty for unknown types.
    pub fn export_file(&self, filename: &str) -> Vec<u8> {
        match FileFormat::from_path(filename) {
            Some(format) => format.encode(self.document.roots(), &self.config).into_bytes(),
            None => {
                log::warn!("cannot export unsupported file type {}", filename);
                Vec::new()
            }
        }
    }

    pub fn import_file(&mut self, filename: &str, data: &[u8]) -> String {
        let Some(format) = FileFormat::from_path(filename) else {
            return "{\"error\": \"Unsupported file format\"}".to_string();
        };
        let input = String::from_utf8_lossy(data);
        match self.load_str(format, &input) {
            Ok(()) => serde_json::json!({ "success": true, "count": self.document.roots().len() }).to_string(),
            Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
        }
    }
}
