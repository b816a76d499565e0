//! Seams to the outside world: the renderer and the asset source.

use crate::bounds::AABB;
use crate::error::LoadError;
use crate::handle::ProxyHandle;
use crate::proxy::VisualProxy;

/// A loaded model as far as the engine is concerned: where it came from and
/// how big it is.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub locator: String,
    pub bounds: AABB,
}

impl LoadedModel {
    pub fn new(locator: impl Into<String>, bounds: AABB) -> Self {
        Self {
            locator: locator.into(),
            bounds,
        }
    }
}

/// Rendering capability consumed by the engine.
///
/// Every proxy passed to `attach_proxy` stays attached until `detach_proxy`
/// is called with the same handle.
pub trait SceneRenderer {
    /// Replace the displayed model; any previous model resource is released.
    fn set_model(&mut self, model: &LoadedModel);

    fn attach_proxy(&mut self, handle: ProxyHandle, proxy: &VisualProxy);

    /// Detach the proxy and free its geometry.
    fn detach_proxy(&mut self, handle: ProxyHandle);

    /// Rebuild the proxy geometry at `radius`, releasing the old geometry.
    fn rebuild_geometry(&mut self, handle: ProxyHandle, radius: f32);

    /// Push position, color and emphasis changes.
    fn restyle_proxy(&mut self, handle: ProxyHandle, proxy: &VisualProxy);

    fn request_repaint(&mut self);
}

/// Source of scene assets. Both calls may suspend.
#[allow(async_fn_in_trait)]
pub trait AssetSource {
    async fn load_model(&self, locator: &str) -> Result<LoadedModel, LoadError>;

    /// Raw point-list text (JSON).
    async fn fetch_points(&self, locator: &str) -> Result<String, LoadError>;
}
