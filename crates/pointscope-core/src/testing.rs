//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::bounds::AABB;
use crate::error::LoadError;
use crate::handle::ProxyHandle;
use crate::point::PointRecord;
use crate::port::{AssetSource, LoadedModel, SceneRenderer};
use crate::proxy::VisualProxy;

pub fn record(id: &str, pos: [f32; 3]) -> PointRecord {
    PointRecord {
        id: id.to_string(),
        name: format!("Point {id}"),
        pos,
        radius: None,
        state: None,
    }
}

/// Renderer that remembers every call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub model: Option<LoadedModel>,
    pub attached: Vec<ProxyHandle>,
    pub detached: Vec<ProxyHandle>,
    pub rebuilds: Vec<(ProxyHandle, f32)>,
    pub live: HashMap<ProxyHandle, VisualProxy>,
    pub repaints: usize,
}

impl SceneRenderer for RecordingRenderer {
    fn set_model(&mut self, model: &LoadedModel) {
        self.model = Some(model.clone());
    }

    fn attach_proxy(&mut self, handle: ProxyHandle, proxy: &VisualProxy) {
        self.attached.push(handle);
        self.live.insert(handle, proxy.clone());
    }

    fn detach_proxy(&mut self, handle: ProxyHandle) {
        self.detached.push(handle);
        self.live.remove(&handle);
    }

    fn rebuild_geometry(&mut self, handle: ProxyHandle, radius: f32) {
        self.rebuilds.push((handle, radius));
    }

    fn restyle_proxy(&mut self, handle: ProxyHandle, proxy: &VisualProxy) {
        self.live.insert(handle, proxy.clone());
    }

    fn request_repaint(&mut self) {
        self.repaints += 1;
    }
}

/// In-memory asset source keyed by locator.
#[derive(Default)]
pub struct MemoryAssets {
    pub models: HashMap<String, AABB>,
    pub point_lists: HashMap<String, String>,
    pub requests: Mutex<Vec<String>>,
}

impl MemoryAssets {
    fn log_request(&self, locator: &str) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(locator.to_string());
        }
    }
}

impl AssetSource for MemoryAssets {
    async fn load_model(&self, locator: &str) -> Result<LoadedModel, LoadError> {
        self.log_request(locator);
        self.models
            .get(locator)
            .map(|bounds| LoadedModel::new(locator, *bounds))
            .ok_or_else(|| LoadError::Model {
                locator: locator.to_string(),
                reason: "not found".to_string(),
            })
    }

    async fn fetch_points(&self, locator: &str) -> Result<String, LoadError> {
        self.log_request(locator);
        self.point_lists
            .get(locator)
            .cloned()
            .ok_or_else(|| LoadError::Fetch {
                locator: locator.to_string(),
                reason: "HTTP 404".to_string(),
            })
    }
}
