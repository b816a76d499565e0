use crate::error::RegistryError;
use crate::point::Point;
use crate::port::SceneRenderer;
use crate::registry::PointRegistry;

/// 現在の選択（最大1つ）を保持し、ハイライトを管理する
#[derive(Debug, Default)]
pub struct SelectionController {
    selected: Option<String>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 選択中のID
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Pointを選択
    /// 直前の選択のハイライトを先に解除してから新しい選択をハイライトする
    /// 成功時はステータス文字列を返す
    pub fn select<R: SceneRenderer + ?Sized>(
        &mut self,
        id: &str,
        registry: &mut PointRegistry,
        renderer: &mut R,
    ) -> Result<String, RegistryError> {
        let Some(entry) = registry.get(id) else {
            return Err(RegistryError::NotFound { id: id.to_string() });
        };
        let status = selection_status(&entry.point);

        if let Some(previous) = self.selected.take() {
            if previous != id {
                registry.set_emphasis(&previous, false, renderer);
            }
        }
        registry.set_emphasis(id, true, renderer);
        self.selected = Some(id.to_string());

        log::debug!("Selected point {}", id);
        Ok(status)
    }

    /// 選択を解除
    pub fn clear<R: SceneRenderer + ?Sized>(&mut self, registry: &mut PointRegistry, renderer: &mut R) {
        if let Some(previous) = self.selected.take() {
            registry.set_emphasis(&previous, false, renderer);
        }
    }

    /// ID変更に追従
    pub fn follow_rekey(&mut self, old_id: &str, new_id: &str) {
        if self.selected.as_deref() == Some(old_id) {
            self.selected = Some(new_id.to_string());
        }
    }

    /// シーン差し替え時に状態のみ破棄（プロキシは既に解放済み）
    pub fn reset(&mut self) {
        self.selected = None;
    }
}

/// 選択時のステータス表示
pub fn selection_status(point: &Point) -> String {
    format!("Selected: {} ({}) — state: {}", point.name, point.id, point.state)
}
