//! Retained proxy scene backing the renderer port.

use std::collections::BTreeMap;

use pointscope_core::{LoadedModel, ProxyHandle, SceneRenderer, VisualProxy};

use crate::instance::ProxyInstance;

/// 描画中のプロキシ
#[derive(Debug, Clone)]
struct ProxySlot {
    handle: ProxyHandle,
    proxy: VisualProxy,
    /// 現在のジオメトリ半径
    geometry_radius: f32,
}

/// Scene graph of attached proxies plus the current model.
///
/// Instances are kept in handle-index order so the instance buffer is
/// stable between frames.
#[derive(Debug, Default)]
pub struct ProxyScene {
    model: Option<LoadedModel>,
    slots: BTreeMap<u32, ProxySlot>,
    repaint: bool,
    /// インスタンスデータの再アップロードが必要
    dirty: bool,
    geometry_rebuilds: usize,
}

impl ProxyScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, handle: ProxyHandle) -> bool {
        self.slot(handle).is_some()
    }

    /// 描画中のプロキシを取得
    pub fn proxy(&self, handle: ProxyHandle) -> Option<&VisualProxy> {
        self.slot(handle).map(|slot| &slot.proxy)
    }

    /// 現在のジオメトリ半径
    pub fn geometry_radius(&self, handle: ProxyHandle) -> Option<f32> {
        self.slot(handle).map(|slot| slot.geometry_radius)
    }

    pub fn geometry_rebuilds(&self) -> usize {
        self.geometry_rebuilds
    }

    fn slot(&self, handle: ProxyHandle) -> Option<&ProxySlot> {
        self.slots
            .get(&handle.index())
            .filter(|slot| slot.handle == handle)
    }

    fn slot_mut(&mut self, handle: ProxyHandle) -> Option<&mut ProxySlot> {
        self.slots
            .get_mut(&handle.index())
            .filter(|slot| slot.handle == handle)
    }

    /// Instance data for every attached proxy.
    pub fn instances(&self) -> Vec<ProxyInstance> {
        self.slots
            .values()
            .map(|slot| {
                let mut proxy = slot.proxy.clone();
                proxy.radius = slot.geometry_radius;
                ProxyInstance::from_proxy(&proxy)
            })
            .collect()
    }

    /// Instances flattened to `f32`s, `ProxyInstance::FLOATS` per proxy.
    pub fn instance_floats(&self) -> Vec<f32> {
        bytemuck::cast_slice(&self.instances()).to_vec()
    }

    /// Repaint flag, cleared on read.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.repaint)
    }

    /// Instance-buffer dirty flag, cleared on read.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl SceneRenderer for ProxyScene {
    fn set_model(&mut self, model: &LoadedModel) {
        if let Some(previous) = self.model.replace(model.clone()) {
            log::debug!("Released model {}", previous.locator);
        }
        self.repaint = true;
    }

    fn attach_proxy(&mut self, handle: ProxyHandle, proxy: &VisualProxy) {
        let slot = ProxySlot {
            handle,
            proxy: proxy.clone(),
            geometry_radius: proxy.radius,
        };
        if let Some(stale) = self.slots.insert(handle.index(), slot) {
            log::warn!("Proxy slot {} was still attached; replaced", stale.handle.index());
        }
        self.dirty = true;
    }

    fn detach_proxy(&mut self, handle: ProxyHandle) {
        if self.slot(handle).is_some() {
            self.slots.remove(&handle.index());
            self.dirty = true;
        }
    }

    fn rebuild_geometry(&mut self, handle: ProxyHandle, radius: f32) {
        let Some(slot) = self.slot_mut(handle) else {
            log::warn!("Geometry rebuild for unknown proxy {:?}", handle);
            return;
        };
        slot.geometry_radius = radius;
        slot.proxy.radius = radius;
        self.geometry_rebuilds += 1;
        self.dirty = true;
    }

    fn restyle_proxy(&mut self, handle: ProxyHandle, proxy: &VisualProxy) {
        let Some(slot) = self.slot_mut(handle) else {
            log::warn!("Restyle for unknown proxy {:?}", handle);
            return;
        };
        slot.proxy = proxy.clone();
        self.dirty = true;
    }

    fn request_repaint(&mut self) {
        self.repaint = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use pointscope_core::{palette, AABB};

    fn handle(index: u32) -> ProxyHandle {
        ProxyHandle::new(index, 1)
    }

    fn proxy(x: f32) -> VisualProxy {
        VisualProxy::new(Vec3::new(x, 0.0, 0.0), 0.1, "pending")
    }

    #[test]
    fn test_attach_detach() {
        let mut scene = ProxyScene::new();
        scene.attach_proxy(handle(0), &proxy(0.0));
        scene.attach_proxy(handle(1), &proxy(1.0));
        assert_eq!(scene.len(), 2);
        assert!(scene.take_dirty());
        assert!(!scene.take_dirty());

        scene.detach_proxy(handle(0));
        assert_eq!(scene.len(), 1);
        assert!(!scene.contains(handle(0)));
        assert!(scene.take_dirty());
    }

    #[test]
    fn test_stale_handle_ignored() {
        let mut scene = ProxyScene::new();
        scene.attach_proxy(ProxyHandle::new(0, 2), &proxy(0.0));
        scene.take_dirty();

        // 旧世代のハンドルでは操作できない
        scene.detach_proxy(ProxyHandle::new(0, 1));
        scene.restyle_proxy(ProxyHandle::new(0, 1), &proxy(5.0));
        assert_eq!(scene.len(), 1);
        assert!(!scene.take_dirty());
    }

    #[test]
    fn test_rebuild_geometry() {
        let mut scene = ProxyScene::new();
        scene.attach_proxy(handle(3), &proxy(0.0));
        scene.rebuild_geometry(handle(3), 0.4);

        assert_eq!(scene.geometry_radius(handle(3)), Some(0.4));
        assert_eq!(scene.geometry_rebuilds(), 1);
        let instance = scene.instances()[0];
        assert_eq!(instance.model[0][0], 0.4);

        scene.rebuild_geometry(handle(9), 1.0);
        assert_eq!(scene.geometry_rebuilds(), 1);
    }

    #[test]
    fn test_restyle_updates_instances() {
        let mut scene = ProxyScene::new();
        scene.attach_proxy(handle(0), &proxy(0.0));
        let mut styled = proxy(2.0);
        styled.recolor("error");
        styled.emphasized = true;
        scene.restyle_proxy(handle(0), &styled);

        let instance = scene.instances()[0];
        assert_eq!(instance.color, palette::ERROR.to_rgba(1.0));
        assert_eq!(instance.model[3][0], 2.0);
        assert_eq!(scene.proxy(handle(0)), Some(&styled));
    }

    #[test]
    fn test_instance_floats_in_index_order() {
        let mut scene = ProxyScene::new();
        scene.attach_proxy(handle(5), &proxy(5.0));
        scene.attach_proxy(handle(2), &proxy(2.0));

        let floats = scene.instance_floats();
        assert_eq!(floats.len(), 2 * ProxyInstance::FLOATS);
        // translation x of the first instance (column 3, row 0)
        assert_eq!(floats[12], 2.0);
        assert_eq!(floats[ProxyInstance::FLOATS + 12], 5.0);
    }

    #[test]
    fn test_model_and_repaint() {
        let mut scene = ProxyScene::new();
        assert!(!scene.take_repaint());

        let bounds = AABB::new(Vec3::ZERO, Vec3::ONE);
        scene.set_model(&LoadedModel::new("a.glb", bounds));
        scene.set_model(&LoadedModel::new("b.glb", bounds));
        assert_eq!(scene.model().map(|m| m.locator.as_str()), Some("b.glb"));
        assert!(scene.take_repaint());
        assert!(!scene.take_repaint());

        scene.request_repaint();
        assert!(scene.take_repaint());
    }
}
