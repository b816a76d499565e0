//! Browser-side asset source.
//!
//! The model itself is parsed and displayed by the host; the engine only
//! needs its bounding box, which the host's `modelLoader(url)` resolves to.

use glam::Vec3;
use js_sys::{Function, Promise};
use serde::Deserialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use pointscope_core::{AssetSource, LoadError, LoadedModel, AABB};

/// Bounding box as reported by the host, either corner or center form.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ModelBounds {
    MinMax { min: [f32; 3], max: [f32; 3] },
    CenterSize { center: [f32; 3], size: [f32; 3] },
}

impl ModelBounds {
    pub fn to_aabb(self) -> AABB {
        match self {
            ModelBounds::MinMax { min, max } => AABB::new(Vec3::from_array(min), Vec3::from_array(max)),
            ModelBounds::CenterSize { center, size } => {
                AABB::from_center_size(Vec3::from_array(center), Vec3::from_array(size))
            }
        }
    }
}

/// AssetSource backed by a JS model loader and `window.fetch`.
pub struct BrowserAssets {
    model_loader: Function,
}

impl BrowserAssets {
    pub fn new(model_loader: Function) -> Self {
        Self { model_loader }
    }
}

impl AssetSource for BrowserAssets {
    async fn load_model(&self, locator: &str) -> Result<LoadedModel, LoadError> {
        let model_error = |reason: String| LoadError::Model {
            locator: locator.to_string(),
            reason,
        };

        let pending = self
            .model_loader
            .call1(&JsValue::NULL, &JsValue::from_str(locator))
            .map_err(|e| model_error(describe(&e)))?;
        let value = JsFuture::from(Promise::resolve(&pending))
            .await
            .map_err(|e| model_error(describe(&e)))?;
        let bounds: ModelBounds =
            serde_wasm_bindgen::from_value(value).map_err(|e| model_error(e.to_string()))?;

        Ok(LoadedModel::new(locator, bounds.to_aabb()))
    }

    async fn fetch_points(&self, locator: &str) -> Result<String, LoadError> {
        let fetch_error = |reason: String| LoadError::Fetch {
            locator: locator.to_string(),
            reason,
        };

        let window = web_sys::window().ok_or_else(|| fetch_error("no window".to_string()))?;
        let response = JsFuture::from(window.fetch_with_str(locator))
            .await
            .map_err(|e| fetch_error(describe(&e)))?;
        let response: Response = response
            .dyn_into()
            .map_err(|e| fetch_error(describe(&e)))?;

        if !response.ok() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }

        let text = response.text().map_err(|e| fetch_error(describe(&e)))?;
        JsFuture::from(text)
            .await
            .map_err(|e| fetch_error(describe(&e)))?
            .as_string()
            .ok_or_else(|| fetch_error("response body is not text".to_string()))
    }
}

/// Best-effort message of a thrown JS value.
fn describe(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
