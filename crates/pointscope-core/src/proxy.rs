use glam::Vec3;

use crate::handle::ProxyHandle;
use crate::palette::{self, Rgb};

/// Pointに1対1で対応する描画用プロキシ
/// 位置はモデル中心化後の描画座標系
#[derive(Debug, Clone, PartialEq)]
pub struct VisualProxy {
    pub render_position: Vec3,
    pub radius: f32,
    pub color: Rgb,
    /// 選択ハイライト（stateとは独立）
    pub emphasized: bool,
}

impl VisualProxy {
    pub fn new(render_position: Vec3, radius: f32, state: &str) -> Self {
        Self {
            render_position,
            radius,
            color: palette::color_for_label(state),
            emphasized: false,
        }
    }

    /// state表から色を再設定
    pub fn recolor(&mut self, state: &str) {
        self.color = palette::color_for_label(state);
    }

    /// 表示スケール（ハイライト時は拡大）
    pub fn scale(&self) -> f32 {
        if self.emphasized {
            palette::EMPHASIS_SCALE
        } else {
            1.0
        }
    }

    /// ピッキング判定に使う半径
    pub fn pick_radius(&self) -> f32 {
        self.radius * self.scale()
    }

    /// 発光色と強度
    pub fn emissive(&self) -> (Rgb, f32) {
        if self.emphasized {
            (palette::EMPHASIS_EMISSIVE, palette::EMPHASIS_INTENSITY)
        } else {
            (Rgb(0x000000), 0.0)
        }
    }
}

/// SparseSetベースのプロキシストレージ
/// - dense: 実際のデータ配列
/// - sparse: ProxyHandle.index -> denseのインデックスへのマッピング
/// - handles: denseと対応するProxyHandleの配列（世代チェック用）
#[derive(Debug, Default)]
pub struct ProxyStore {
    dense: Vec<VisualProxy>,
    handles: Vec<ProxyHandle>,
    sparse: Vec<Option<usize>>,
}

impl ProxyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// プロキシを挿入（既存の場合は上書き）
    pub fn insert(&mut self, handle: ProxyHandle, proxy: VisualProxy) {
        let index = handle.index() as usize;

        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, None);
        }

        if let Some(dense_index) = self.sparse[index] {
            self.dense[dense_index] = proxy;
            self.handles[dense_index] = handle;
        } else {
            let dense_index = self.dense.len();
            self.dense.push(proxy);
            self.handles.push(handle);
            self.sparse[index] = Some(dense_index);
        }
    }

    fn dense_index(&self, handle: ProxyHandle) -> Option<usize> {
        let dense_index = self.sparse.get(handle.index() as usize).copied().flatten()?;
        // 古い世代のハンドルは無効
        (self.handles[dense_index] == handle).then_some(dense_index)
    }

    /// プロキシを取得（不変参照）
    pub fn get(&self, handle: ProxyHandle) -> Option<&VisualProxy> {
        self.dense_index(handle).map(|i| &self.dense[i])
    }

    /// プロキシを取得（可変参照）
    pub fn get_mut(&mut self, handle: ProxyHandle) -> Option<&mut VisualProxy> {
        self.dense_index(handle).map(|i| &mut self.dense[i])
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn clear(&mut self) {
        self.dense.clear();
        self.handles.clear();
        self.sparse.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{DONE, EMPHASIS_SCALE, PENDING};

    fn proxy(x: f32) -> VisualProxy {
        VisualProxy::new(Vec3::new(x, 0.0, 0.0), 0.1, "pending")
    }

    #[test]
    fn test_new_proxy_color() {
        assert_eq!(VisualProxy::new(Vec3::ZERO, 0.1, "done").color, DONE);
        assert_eq!(VisualProxy::new(Vec3::ZERO, 0.1, "bogus").color, PENDING);
    }

    #[test]
    fn test_emphasis_scale() {
        let mut p = proxy(0.0);
        assert_eq!(p.scale(), 1.0);
        assert_eq!(p.emissive().1, 0.0);
        p.emphasized = true;
        assert_eq!(p.scale(), EMPHASIS_SCALE);
        assert!((p.pick_radius() - 0.1 * EMPHASIS_SCALE).abs() < 1e-6);
        assert_eq!(p.emissive().1, 0.5);
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = ProxyStore::new();
        let h = ProxyHandle::new(0, 1);
        store.insert(h, proxy(1.0));
        assert_eq!(store.get(h), Some(&proxy(1.0)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_stale_generation_rejected() {
        let mut store = ProxyStore::new();
        store.insert(ProxyHandle::new(0, 2), proxy(1.0));
        assert_eq!(store.get(ProxyHandle::new(0, 1)), None);
    }

    #[test]
    fn test_get_mut() {
        let mut store = ProxyStore::new();
        let h = ProxyHandle::new(4, 1);
        store.insert(h, proxy(1.0));
        if let Some(p) = store.get_mut(h) {
            p.emphasized = true;
        }
        assert!(store.get(h).is_some_and(|p| p.emphasized));
    }
}
