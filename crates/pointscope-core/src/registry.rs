use std::collections::{HashMap, HashSet};

use crate::error::RegistryError;
use crate::frame::CoordinateFrame;
use crate::handle::{HandleAllocator, ProxyHandle};
use crate::point::{Point, PointRecord};
use crate::port::SceneRenderer;
use crate::proxy::{ProxyStore, VisualProxy};

/// レジストリの1エントリ
/// PointとそのVisualProxyのハンドル
#[derive(Debug, Clone, PartialEq)]
pub struct PointEntry {
    pub point: Point,
    pub proxy: ProxyHandle,
}

/// マーカーIDからPoint/VisualProxyへの権威あるマッピング
/// - entries: ID -> エントリ（O(1)検索）
/// - order: 読み込み時の挿入順（巡回順）
/// - proxies: ハンドル -> VisualProxy
pub struct PointRegistry {
    entries: HashMap<String, PointEntry>,
    order: Vec<String>,
    proxies: ProxyStore,
    handles: HandleAllocator,
}

impl PointRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            proxies: ProxyStore::new(),
            handles: HandleAllocator::new(),
        }
    }

    /// ポイントリストのID重複チェック
    pub fn validate(records: &[PointRecord]) -> Result<(), RegistryError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.id.as_str()) {
                return Err(RegistryError::DuplicateId {
                    id: record.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// ポイントリストを一括読み込み
    /// 検証に失敗した場合は何も変更しない
    pub fn load<R: SceneRenderer + ?Sized>(
        &mut self,
        records: &[PointRecord],
        frame: &CoordinateFrame,
        renderer: &mut R,
    ) -> Result<(), RegistryError> {
        Self::validate(records)?;
        self.clear(renderer);

        for record in records {
            let point = Point::from_record(record, frame.default_radius());
            let proxy = VisualProxy::new(frame.to_render(point.position), point.radius, &point.state);
            let handle = self.handles.spawn();

            renderer.attach_proxy(handle, &proxy);
            self.proxies.insert(handle, proxy);
            self.order.push(point.id.clone());
            self.entries.insert(
                point.id.clone(),
                PointEntry {
                    point,
                    proxy: handle,
                },
            );
        }

        renderer.request_repaint();
        log::info!("Loaded {} points ({} proxies)", self.entries.len(), self.proxies.len());
        Ok(())
    }

    /// 全エントリを削除し、プロキシを解放
    pub fn clear<R: SceneRenderer + ?Sized>(&mut self, renderer: &mut R) {
        for entry in self.entries.values() {
            renderer.detach_proxy(entry.proxy);
            self.handles.release(entry.proxy);
        }
        self.entries.clear();
        self.order.clear();
        self.proxies.clear();
    }

    /// エントリを取得
    pub fn get(&self, id: &str) -> Option<&PointEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Pointを取得（可変参照）
    pub fn point_mut(&mut self, id: &str) -> Option<&mut Point> {
        self.entries.get_mut(id).map(|entry| &mut entry.point)
    }

    /// ハンドルからプロキシを取得
    pub fn proxy(&self, handle: ProxyHandle) -> Option<&VisualProxy> {
        self.proxies.get(handle)
    }

    /// ハンドルからプロキシを取得（可変参照）
    pub fn proxy_mut(&mut self, handle: ProxyHandle) -> Option<&mut VisualProxy> {
        self.proxies.get_mut(handle)
    }

    /// IDからプロキシを取得
    pub fn proxy_of(&self, id: &str) -> Option<&VisualProxy> {
        self.get(id).and_then(|entry| self.proxies.get(entry.proxy))
    }

    /// IDを付け替え
    /// 同じハンドルを新しいキーで登録し、巡回順の位置は維持する
    pub fn rekey(&mut self, old_id: &str, new_id: &str) -> Result<(), RegistryError> {
        if !self.entries.contains_key(old_id) {
            return Err(RegistryError::NotFound {
                id: old_id.to_string(),
            });
        }
        if old_id == new_id {
            return Ok(());
        }
        if self.entries.contains_key(new_id) {
            return Err(RegistryError::IdConflict {
                id: new_id.to_string(),
            });
        }

        let Some(mut entry) = self.entries.remove(old_id) else {
            return Err(RegistryError::NotFound {
                id: old_id.to_string(),
            });
        };
        entry.point.id = new_id.to_string();
        self.entries.insert(new_id.to_string(), entry);

        if let Some(slot) = self.order.iter_mut().find(|id| id.as_str() == old_id) {
            *slot = new_id.to_string();
        }

        log::debug!("Rekeyed point {} -> {}", old_id, new_id);
        Ok(())
    }

    /// ハイライト状態を設定
    /// 見つからない場合false
    pub fn set_emphasis<R: SceneRenderer + ?Sized>(
        &mut self,
        id: &str,
        on: bool,
        renderer: &mut R,
    ) -> bool {
        let Some(handle) = self.entries.get(id).map(|entry| entry.proxy) else {
            return false;
        };
        let Some(proxy) = self.proxies.get_mut(handle) else {
            return false;
        };
        proxy.emphasized = on;
        renderer.restyle_proxy(handle, proxy);
        true
    }

    /// ハイライト中のプロキシ数
    #[cfg(test)]
    pub fn emphasized_count(&self) -> usize {
        self.iter_with_proxies().filter(|(_, proxy)| proxy.emphasized).count()
    }

    /// 巡回順のID一覧
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// 巡回順にエントリをイテレート
    pub fn iter(&self) -> impl Iterator<Item = &PointEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// 巡回順にエントリとプロキシをイテレート
    pub fn iter_with_proxies(&self) -> impl Iterator<Item = (&PointEntry, &VisualProxy)> {
        self.iter()
            .filter_map(|entry| self.proxies.get(entry.proxy).map(|proxy| (entry, proxy)))
    }

    /// 全Pointをレコード形式で取得（巡回順）
    pub fn records(&self) -> Vec<PointRecord> {
        self.iter().map(|entry| entry.point.to_record()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 使用中のプロキシハンドル数
    #[cfg(test)]
    pub fn live_proxies(&self) -> usize {
        self.handles.live_count()
    }
}

impl Default for PointRegistry {
    fn default() -> Self {
        Self::new()
    }
}
