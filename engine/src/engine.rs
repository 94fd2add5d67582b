use wasm_bindgen::prelude::*;

use crate::config::EditorConfig;
use crate::document::Document;
use crate::draw::DrawSession;
use crate::error::Result;
use crate::objects::Node;
use crate::render::RenderFrame;
use crate::selection::DragMove;
use crate::types::{Point, Tool};

/// The editor core as seen by the GUI layer: pointer and tool events in,
/// render frames and file contents out.
#[wasm_bindgen]
pub struct DiagramEngine {
    pub(crate) document: Document,
    pub(crate) session: DrawSession,
    pub(crate) drag: DragMove,
    pub(crate) config: EditorConfig,
}

impl Default for DiagramEngine {
    fn default() -> Self {
        DiagramEngine::new()
    }
}

#[wasm_bindgen]
impl DiagramEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> DiagramEngine {
        DiagramEngine::with_config(EditorConfig::default())
    }

    /// Builds an engine from a JSON `EditorConfig`. Returns `None` when the
    /// configuration does not parse.
    pub fn from_config_json(json: &str) -> Option<DiagramEngine> {
        match EditorConfig::from_json(json) {
            Ok(config) => Some(DiagramEngine::with_config(config)),
            Err(e) => {
                log::warn!("rejecting editor config: {}", e);
                None
            }
        }
    }

    /// Selects the draw tool: `line`, `rectangle`, or anything else for plain
    /// selection. Returns false when a drag is in progress.
    pub fn on_tool_selected(&mut self, tool: &str) -> bool {
        self.set_tool(tool.parse::<Tool>().ok())
    }

    pub fn on_pointer_down(&mut self, x: f64, y: f64, shift: bool) -> bool {
        let p = Point::new(x, y);
        if self.session.is_active() {
            return self.session.pointer_down(p);
        }
        self.drag.pointer_down(&mut self.document, p, shift, &self.config).is_some()
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> bool {
        let p = Point::new(x, y);
        if self.session.is_active() {
            return self.session.pointer_move(p);
        }
        self.drag.pointer_move(&mut self.document, p)
    }

    pub fn on_pointer_up(&mut self, x: f64, y: f64) -> bool {
        let p = Point::new(x, y);
        if self.session.is_active() {
            return self.session.pointer_up(p, &mut self.document).is_some();
        }
        self.drag.pointer_up(&mut self.document, p)
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }

    pub fn mark_clean(&mut self) {
        self.document.mark_clean();
    }

    pub fn render_frame_json(&self) -> String {
        serde_json::to_string(&self.render_frame()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn get_save_set_json(&self) -> String {
        serde_json::to_string(self.document.roots()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn get_selected_ids(&self) -> String {
        serde_json::to_string(self.document.selected_ids()).unwrap_or_else(|_| "[]".to_string())
    }
}

impl DiagramEngine {
    pub fn with_config(config: EditorConfig) -> DiagramEngine {
        console_error_panic_hook::set_once();
        #[cfg(target_arch = "wasm32")]
        {
            let _ = console_log::init_with_level(log::Level::Debug);
        }

        DiagramEngine {
            document: Document::new(),
            session: DrawSession::new(&config),
            drag: DragMove::default(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn session(&self) -> &DrawSession {
        &self.session
    }

    /// Switches between drawing (`Some`) and selection (`None`). A pending
    /// selection drag is dropped, so the two modes never overlap.
    pub fn set_tool(&mut self, tool: Option<Tool>) -> bool {
        if !self.session.set_tool(tool) {
            return false;
        }
        if tool.is_some() {
            self.drag = DragMove::default();
        }
        true
    }

    pub fn save_set(&self) -> &[Node] {
        self.document.roots()
    }

    /// Installs `nodes` as a new, clean document. The current document stays in
    /// place if the candidate breaks a tree invariant.
    pub fn load_save_set(&mut self, nodes: Vec<Node>) -> Result<()> {
        let document = Document::from_save_set(nodes)?;
        log::info!("loaded document with {} top-level node(s)", document.roots().len());
        self.document = document;
        self.drag = DragMove::default();
        Ok(())
    }

    pub fn render_frame(&self) -> RenderFrame {
        RenderFrame::build(&self.document, &self.session, &self.config)
    }
}
