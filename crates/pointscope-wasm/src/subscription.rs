//! イベント購読管理モジュール
//!
//! セッションイベントをJSコールバックに配信する

use std::collections::BTreeMap;

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::JsValue;

use pointscope_core::SessionEvent;

/// 購読マネージャー
/// 登録順（ID順）に配信する
pub struct EventSubscribers {
    callbacks: BTreeMap<u32, Function>,
    next_id: u32,
}

impl EventSubscribers {
    pub fn new() -> Self {
        Self {
            callbacks: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn subscribe(&mut self, callback: Function) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.callbacks.insert(id, callback);
        id
    }

    pub fn unsubscribe(&mut self, id: u32) -> bool {
        self.callbacks.remove(&id).is_some()
    }

    /// 全購読者にイベントを配信
    /// コールバック内の例外はログに残して配信を続ける
    pub fn dispatch(&self, events: &[SessionEvent]) {
        if self.callbacks.is_empty() {
            return;
        }

        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        for event in events {
            let value = match event.serialize(&serializer) {
                Ok(value) => value,
                Err(err) => {
                    log::warn!("Failed to serialize event {:?}: {}", event, err);
                    continue;
                }
            };
            for (id, callback) in &self.callbacks {
                if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                    log::warn!("Event subscriber {} threw: {:?}", id, err);
                }
            }
        }
    }
}

impl Default for EventSubscribers {
    fn default() -> Self {
        Self::new()
    }
}
