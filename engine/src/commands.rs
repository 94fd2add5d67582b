use serde::Deserialize;
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;

use crate::engine::DiagramEngine;
use crate::error::{EngineError, Result};
use crate::objects::NodeId;
use crate::operations::EditRequest;
use crate::types::{Color, CornerStyle, Vec2};

#[derive(Deserialize)]
struct Command {
    action: String,
    #[serde(default)]
    params: Value,
}

#[wasm_bindgen]
impl DiagramEngine {
    /// Runs one menu command encoded as `{"action": ..., "params": {...}}` and
    /// reports the outcome as JSON: `{"success": true, ...}` or `{"error": ...}`.
    pub fn execute_command(&mut self, cmd_json: &str) -> String {
        let cmd: Command = match serde_json::from_str(cmd_json) {
            Ok(c) => c,
            Err(e) => return json!({ "error": format!("Invalid JSON: {}", e) }).to_string(),
        };

        match self.dispatch(&cmd.action, &cmd.params) {
            Ok(mut reply) => {
                reply["success"] = json!(true);
                reply.to_string()
            }
            Err(e) => {
                log::warn!("{} failed: {}", cmd.action, e);
                json!({ "error": e.to_string() }).to_string()
            }
        }
    }
}

impl DiagramEngine {
    fn dispatch(&mut self, action: &str, params: &Value) -> Result<Value> {
        let doc = &mut self.document;
        let reply = match action {
            "select" => {
                let ids: Vec<NodeId> = params["ids"]
                    .as_array()
                    .map(|ids| ids.iter().filter_map(|v| v.as_u64()).filter_map(|v| NodeId::try_from(v).ok()).collect())
                    .unwrap_or_default();
                doc.select(&ids);
                json!({ "selected": doc.selected_ids() })
            }
            "clear_selection" => {
                doc.clear_selection();
                json!({})
            }
            "bring_to_front" => json!({ "changed": doc.bring_to_front() }),
            "send_to_back" => json!({ "changed": doc.send_to_back() }),
            "rotate" => {
                let angle = params["angle"]
                    .as_f64()
                    .ok_or_else(|| EngineError::invalid("rotate needs a numeric `angle`"))?;
                json!({ "changed": doc.rotate(angle) })
            }
            "translate" => {
                let dx = params["dx"].as_f64().unwrap_or(0.0);
                let dy = params["dy"].as_f64().unwrap_or(0.0);
                json!({ "changed": doc.translate_selected(Vec2::new(dx, dy))? })
            }
            "copy" => json!({ "ids": doc.copy_selected(self.config.copy_offset) }),
            "delete" => json!({ "removed": doc.delete_selected() }),
            "group" => json!({ "id": doc.group_selected()? }),
            "ungroup" => json!({ "ids": doc.ungroup_selected()? }),
            "ungroup_all" => json!({ "ids": doc.ungroup_all_selected()? }),
            "edit" => {
                doc.edit(edit_request(params)?)?;
                json!({})
            }
            "clear" => {
                doc.clear();
                json!({})
            }
            other => return Err(EngineError::invalid(format!("unknown action `{}`", other))),
        };
        Ok(reply)
    }
}

fn edit_request(params: &Value) -> Result<EditRequest> {
    let color = match params["color"].as_str() {
        Some(s) => Some(s.parse::<Color>().map_err(EngineError::InvalidOperation)?),
        None => None,
    };
    let corner = match params["corner"].as_str() {
        Some(s) => Some(
            CornerStyle::from_tag(s)
                .or_else(|| CornerStyle::from_xml_name(s))
                .ok_or_else(|| EngineError::invalid(format!("unknown corner style `{}`", s)))?,
        ),
        None => None,
    };
    Ok(EditRequest { color, corner })
}
