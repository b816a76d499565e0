use std::num::NonZeroU32;

/// VisualProxy識別子（世代番号付き）
/// - index: プロキシスロットのインデックス
/// - generation: 再利用時の世代番号（破棄済みプロキシとの区別用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyHandle {
    index: u32,
    generation: NonZeroU32,
}

impl ProxyHandle {
    /// 新しいProxyHandleを作成
    /// generationの0は無効値として予約されているため1に丸める
    pub fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation: NonZeroU32::new(generation).unwrap_or(NonZeroU32::MIN),
        }
    }

    /// インデックスを取得
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// 世代番号を取得
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation.get()
    }
}

/// スロット情報
struct SlotMeta {
    /// 現在の世代番号
    generation: u32,
    /// 使用中フラグ
    live: bool,
}

/// ProxyHandleの割り当て器
/// シーン差し替えで解放されたスロットは世代を上げて再利用する
#[derive(Default)]
pub struct HandleAllocator {
    slots: Vec<SlotMeta>,
    free_list: Vec<u32>,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新規ハンドルを割り当て
    pub fn spawn(&mut self) -> ProxyHandle {
        if let Some(index) = self.free_list.pop() {
            // 再利用: 世代番号をインクリメント
            let meta = &mut self.slots[index as usize];
            meta.generation += 1;
            meta.live = true;
            ProxyHandle::new(index, meta.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(SlotMeta {
                generation: 1,
                live: true,
            });
            ProxyHandle::new(index, 1)
        }
    }

    /// ハンドルを解放
    /// 既に解放済みまたは無効なハンドルの場合false
    pub fn release(&mut self, handle: ProxyHandle) -> bool {
        if !self.is_live(handle) {
            return false;
        }

        self.slots[handle.index() as usize].live = false;
        self.free_list.push(handle.index());
        true
    }

    /// ハンドルが使用中か確認
    pub fn is_live(&self, handle: ProxyHandle) -> bool {
        self.slots
            .get(handle.index() as usize)
            .is_some_and(|meta| meta.live && meta.generation == handle.generation())
    }

    /// 使用中ハンドル数を取得
    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|meta| meta.live).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let handle = ProxyHandle::new(42, 1);
        assert_eq!(handle.index(), 42);
        assert_eq!(handle.generation(), 1);
    }

    #[test]
    fn test_generation_zero_is_clamped() {
        let handle = ProxyHandle::new(3, 0);
        assert_eq!(handle.generation(), 1);
    }

    #[test]
    fn test_distant_generations_stay_distinct() {
        // 4096世代離れても同一視しない
        let old = ProxyHandle::new(7, 1);
        let new = ProxyHandle::new(7, 1 + 4096);
        assert_ne!(old, new);
        assert_ne!(format!("{:?}", old), format!("{:?}", new));
    }

    #[test]
    fn test_spawn_sequential() {
        let mut handles = HandleAllocator::new();
        let a = handles.spawn();
        let b = handles.spawn();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(handles.live_count(), 2);
    }

    #[test]
    fn test_release_and_reuse() {
        let mut handles = HandleAllocator::new();
        let a = handles.spawn();
        assert!(handles.release(a));
        assert!(!handles.release(a));

        // 同じindexだが世代が異なる
        let b = handles.spawn();
        assert_eq!(b.index(), a.index());
        assert_eq!(b.generation(), 2);
        assert!(!handles.is_live(a));
        assert!(handles.is_live(b));
    }
}
