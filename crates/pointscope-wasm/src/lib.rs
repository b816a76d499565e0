// crates/pointscope-wasm/src/lib.rs

mod assets;
mod renderer;
mod shaders;
mod subscription;
mod utils;

use js_sys::{Float32Array, Function};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use pointscope_core::glam::Vec3;
use pointscope_core::{
    load_scene, EditForm, InteractionMode, LoadedScene, PointerEvent, SceneConfig, SceneSession,
    SessionEvent,
};
use pointscope_renderer::ProxyScene;

use assets::BrowserAssets;
use renderer::OverlayRenderer;
use subscription::EventSubscribers;
use utils::{console_log, js_error};

// パニック時のスタックトレース表示
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// JSオプション（undefined/null はデフォルト設定）
fn parse_config(options: &JsValue) -> Result<SceneConfig, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(SceneConfig::default());
    }
    let config: SceneConfig = serde_wasm_bindgen::from_value(options.clone()).map_err(js_error)?;
    config.validate().map_err(js_error)?;
    Ok(config)
}

/// 読み込み済みのシーン資産（replaceScene に渡す）
#[wasm_bindgen]
pub struct SceneAssets {
    scene: LoadedScene,
}

#[wasm_bindgen]
impl SceneAssets {
    #[wasm_bindgen(getter, js_name = modelUrl)]
    pub fn model_url(&self) -> String {
        self.scene.model.locator.clone()
    }

    #[wasm_bindgen(getter, js_name = pointCount)]
    pub fn point_count(&self) -> usize {
        self.scene.records.len()
    }
}

/// モデルとポイントリストを読み込む（モデル→ポイントの順）
/// 失敗時は "Error: <message>" を投げる
#[wasm_bindgen(js_name = loadSceneAssets)]
pub async fn load_scene_assets(options: JsValue, model_loader: Function) -> Result<SceneAssets, JsValue> {
    let config = parse_config(&options)?;
    let assets = BrowserAssets::new(model_loader);
    match load_scene(&assets, &config.locators()).await {
        Ok(scene) => Ok(SceneAssets { scene }),
        Err(err) => {
            log::error!("Scene load failed: {}", err);
            Err(JsValue::from_str(&format!("Error: {err}")))
        }
    }
}

#[derive(Serialize)]
struct CameraPose {
    position: [f32; 3],
    target: [f32; 3],
}

/// Viewer構造体
/// SceneSessionとオーバーレイ描画を統合し、JSから操作可能なAPIを提供
#[wasm_bindgen]
pub struct Viewer {
    session: SceneSession<ProxyScene>,
    subscribers: EventSubscribers,
    overlay: Option<OverlayRenderer>,
}

#[wasm_bindgen]
impl Viewer {
    /// シーンを読み込んでViewerを作成（非同期）
    /// 読み込み失敗は onEvent に Error イベントとして通知した上で投げる
    pub async fn start(
        options: JsValue,
        model_loader: Function,
        on_event: Function,
        overlay: Option<HtmlCanvasElement>,
    ) -> Result<Viewer, JsValue> {
        let config = parse_config(&options)?;
        utils::init_logging(config.log_level_filter());
        console_log!("Starting viewer: {} / {}", config.model_url, config.points_url);

        let mut subscribers = EventSubscribers::new();
        subscribers.subscribe(on_event);

        let assets = BrowserAssets::new(model_loader);
        let session = match load_scene(&assets, &config.locators()).await {
            Ok(scene) => SceneSession::open(config, scene, ProxyScene::new()),
            Err(err) => Err(err.into()),
        };
        let session = match session {
            Ok(session) => session,
            Err(err) => {
                log::error!("Scene load failed: {}", err);
                subscribers.dispatch(&[SessionEvent::load_failed(&err)]);
                return Err(js_error(err));
            }
        };

        let overlay = match overlay {
            Some(canvas) => Some(OverlayRenderer::create(canvas).await?),
            None => None,
        };

        let mut viewer = Self {
            session,
            subscribers,
            overlay,
        };
        viewer.flush();
        Ok(viewer)
    }

    /// 溜まったイベントを購読者に配信
    fn flush(&mut self) {
        let events = self.session.take_events();
        self.subscribers.dispatch(&events);
    }

    /// シーンを差し替え（検証失敗時は現在のシーンを維持）
    #[wasm_bindgen(js_name = replaceScene)]
    pub fn replace_scene(&mut self, assets: SceneAssets) -> bool {
        let replaced = self.session.replace_scene(assets.scene).is_ok();
        self.flush();
        replaced
    }

    /// ポインタ移動（選択モード時のみホバー判定）
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Option<String> {
        let hit = self.session.handle_pointer(PointerEvent::moved(x, y));
        self.flush();
        hit.map(|hit| hit.id)
    }

    /// ポインタ押下（選択）
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<String> {
        let hit = self.session.handle_pointer(PointerEvent::down(x, y));
        self.flush();
        hit.map(|hit| hit.id)
    }

    /// "rotate" | "pan" | "select"
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, name: &str) -> Result<(), JsValue> {
        let mode: InteractionMode = name.parse().map_err(js_error)?;
        self.session.set_mode(mode);
        self.flush();
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.session.mode().as_str().to_string()
    }

    /// Canvasリサイズ
    pub fn resize(&mut self, width: u32, height: u32) {
        self.session.resize(width as f32, height as f32);
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.resize(width, height);
        }
    }

    /// オービット操作後のカメラ姿勢を反映
    #[wasm_bindgen(js_name = syncCamera)]
    pub fn sync_camera(&mut self, px: f32, py: f32, pz: f32, tx: f32, ty: f32, tz: f32) {
        self.session
            .sync_camera(Vec3::new(px, py, pz), Vec3::new(tx, ty, tz));
    }

    /// { position: [x,y,z], target: [x,y,z] }
    #[wasm_bindgen(js_name = cameraPose)]
    pub fn camera_pose(&self) -> Result<JsValue, JsValue> {
        let camera = self.session.camera();
        let pose = CameraPose {
            position: camera.position.to_array(),
            target: camera.target.to_array(),
        };
        serde_wasm_bindgen::to_value(&pose).map_err(js_error)
    }

    #[wasm_bindgen(js_name = nextPoint)]
    pub fn next_point(&mut self) -> Option<String> {
        let id = self.session.next_point();
        self.flush();
        id
    }

    #[wasm_bindgen(js_name = previousPoint)]
    pub fn previous_point(&mut self) -> Option<String> {
        let id = self.session.previous_point();
        self.flush();
        id
    }

    #[wasm_bindgen(js_name = selectPoint)]
    pub fn select_point(&mut self, id: &str) -> bool {
        let selected = self.session.select_point(id).is_ok();
        self.flush();
        selected
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
        self.flush();
    }

    #[wasm_bindgen(getter, js_name = selectedId)]
    pub fn selected_id(&self) -> Option<String> {
        self.session.selected().map(str::to_string)
    }

    /// フォーム内容を保存
    /// 検証エラーは Error イベントで通知し false を返す
    #[wasm_bindgen(js_name = saveEdit)]
    pub fn save_edit(&mut self, form: JsValue) -> Result<bool, JsValue> {
        let form: EditForm = serde_wasm_bindgen::from_value(form).map_err(js_error)?;
        let saved = self.session.commit_edit(&form).is_ok();
        self.flush();
        Ok(saved)
    }

    #[wasm_bindgen(js_name = cancelEdit)]
    pub fn cancel_edit(&mut self) {
        self.session.cancel_edit();
        self.flush();
    }

    /// 選択中ポイントのstateのみ変更
    #[wasm_bindgen(js_name = setState)]
    pub fn set_state(&mut self, state: &str) -> bool {
        let updated = matches!(self.session.set_selected_state(state), Ok(Some(_)));
        self.flush();
        updated
    }

    /// 外部保存用のポイントリスト
    #[wasm_bindgen(js_name = pointsJson)]
    pub fn points_json(&self) -> Result<String, JsValue> {
        self.session.points_json().map_err(js_error)
    }

    #[wasm_bindgen(getter, js_name = pointCount)]
    pub fn point_count(&self) -> usize {
        self.session.registry().len()
    }

    /// ホスト側で描画する場合のインスタンスデータ（24 floats / marker）
    #[wasm_bindgen(js_name = instanceData)]
    pub fn instance_data(&self) -> Float32Array {
        Float32Array::from(self.session.renderer().instance_floats().as_slice())
    }

    /// 再描画要求（読み取りでクリア）
    #[wasm_bindgen(js_name = takeRepaint)]
    pub fn take_repaint(&mut self) -> bool {
        self.session.renderer_mut().take_repaint()
    }

    /// オーバーレイキャンバスにマーカーを描画
    pub fn render(&mut self) -> Result<(), JsValue> {
        let Some(overlay) = self.overlay.as_mut() else {
            return Ok(());
        };
        let scene = self.session.renderer_mut();
        if scene.take_dirty() {
            overlay.upload_instances(&scene.instances());
        }
        overlay.render(self.session.camera())
    }

    /// イベント購読を追加
    pub fn subscribe(&mut self, callback: Function) -> u32 {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: u32) -> bool {
        self.subscribers.unsubscribe(id)
    }
}
