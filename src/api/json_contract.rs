use serde::{Deserialize, Serialize};

use crate::error::{GanttError, GanttResult};
use crate::render::Renderer;

use super::{GanttEngine, RenderModel};

pub const RENDER_MODEL_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderModelJsonContractV1 {
    pub schema_version: u32,
    pub model: RenderModel,
}

impl RenderModel {
    pub fn to_json_pretty(&self) -> GanttResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GanttError::Json(format!("failed to serialize render model json: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> GanttResult<String> {
        let payload = RenderModelJsonContractV1 {
            schema_version: RENDER_MODEL_JSON_SCHEMA_V1,
            model: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            GanttError::Json(format!("failed to serialize render model contract v1: {e}"))
        })
    }

    /// Accepts both a bare model and a versioned v1 payload.
    pub fn from_json_compat_str(input: &str) -> GanttResult<Self> {
        if let Ok(model) = serde_json::from_str::<RenderModel>(input) {
            return Ok(model);
        }
        let payload: RenderModelJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            GanttError::Json(format!("failed to parse render model json payload: {e}"))
        })?;
        if payload.schema_version != RENDER_MODEL_JSON_SCHEMA_V1 {
            return Err(GanttError::Json(format!(
                "unsupported render model schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.model)
    }
}

impl<R: Renderer> GanttEngine<R> {
    pub fn render_model_json_contract_v1_pretty(&mut self) -> GanttResult<String> {
        self.build_render_model()?.to_json_contract_v1_pretty()
    }
}
