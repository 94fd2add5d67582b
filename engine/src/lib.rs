pub mod types;
pub mod config;
pub mod error;
pub mod objects;
pub mod document;
pub mod operations;
pub mod draw;
pub mod selection;
pub mod render;
pub mod io;
pub mod xml;
pub mod commands;
pub mod engine;

pub use config::EditorConfig;
pub use document::Document;
pub use draw::DrawSession;
pub use engine::DiagramEngine;
pub use error::{EngineError, InvariantViolation, Result};
pub use io::FileFormat;
pub use objects::{Node, NodeId, NodeKind};
pub use operations::EditRequest;
pub use render::{Primitive, RenderFrame, RenderItem};
pub use selection::DragMove;
pub use types::*;
