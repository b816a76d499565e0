//! The scene context: one owner for every piece of per-scene state.

use glam::Vec3;

use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::cycle::CycleNavigator;
use crate::edit::{CommitReport, EditForm, EditSession};
use crate::error::{RegistryError, SceneError};
use crate::event::SessionEvent;
use crate::frame::CoordinateFrame;
use crate::interaction::{self, CursorHint, InteractionMode, PointerEvent, PointerRoute};
use crate::loader::LoadedScene;
use crate::persistence::PersistenceBridge;
use crate::picking::{self, PickHit};
use crate::port::{LoadedModel, SceneRenderer};
use crate::registry::PointRegistry;
use crate::selection::SelectionController;

const SELECT_FIRST: &str = "Select a point first, then set its state.";

/// 1シーン分の状態をまとめて所有するコンテキスト
///
/// Every mutation goes through a `&mut self` call, and every user-visible
/// outcome is queued as a [`SessionEvent`] for the host to drain.
pub struct SceneSession<R: SceneRenderer> {
    config: SceneConfig,
    renderer: R,
    model: LoadedModel,
    frame: CoordinateFrame,
    registry: PointRegistry,
    selection: SelectionController,
    edit: EditSession,
    cycle: CycleNavigator,
    bridge: PersistenceBridge,
    camera: Camera,
    mode: InteractionMode,
    hover_cursor: CursorHint,
    events: Vec<SessionEvent>,
}

impl<R: SceneRenderer> SceneSession<R> {
    /// First scene load. Fails without side effects on the caller when the
    /// config or the point list is invalid.
    pub fn open(config: SceneConfig, scene: LoadedScene, mut renderer: R) -> Result<Self, SceneError> {
        config.validate()?;

        let LoadedScene { model, records } = scene;
        let frame = CoordinateFrame::from_bounds(&model.bounds, config.default_radius_fraction);

        let mut registry = PointRegistry::new();
        registry.load(&records, &frame, &mut renderer)?;
        renderer.set_model(&model);

        let mut bridge = PersistenceBridge::new();
        bridge.replace_all(records);

        let mut camera = Camera::new(config.viewport.size());
        camera.frame_model(&model.bounds);

        let mode = config.initial_mode;
        let mut session = Self {
            config,
            renderer,
            model,
            frame,
            registry,
            selection: SelectionController::new(),
            edit: EditSession::new(),
            cycle: CycleNavigator::new(),
            bridge,
            camera,
            mode,
            hover_cursor: mode.cursor(),
            events: Vec::new(),
        };

        session.events.push(SessionEvent::mode_changed(mode));
        session.announce_load();
        Ok(session)
    }

    /// Swap in a new model and point list as one unit.
    /// A point list that fails validation leaves the current scene untouched.
    pub fn replace_scene(&mut self, scene: LoadedScene) -> Result<(), SceneError> {
        if let Err(err) = PointRegistry::validate(&scene.records) {
            log::warn!("Scene replacement rejected: {}", err);
            self.events.push(SessionEvent::Error(err.to_string()));
            return Err(err.into());
        }

        let LoadedScene { model, records } = scene;

        self.selection.reset();
        self.edit.cancel();
        self.cycle.reset();
        self.hover_cursor = self.mode.cursor();

        self.frame = CoordinateFrame::from_bounds(&model.bounds, self.config.default_radius_fraction);
        self.renderer.set_model(&model);
        self.registry.load(&records, &self.frame, &mut self.renderer)?;
        self.bridge.replace_all(records);
        self.camera.frame_model(&model.bounds);
        self.model = model;

        self.events.push(SessionEvent::SelectionChanged(None));
        self.events.push(SessionEvent::FormCleared);
        self.announce_load();
        Ok(())
    }

    fn announce_load(&mut self) {
        log::info!(
            "Scene ready: {} ({} points)",
            self.model.locator,
            self.registry.len()
        );
        self.events.push(SessionEvent::Status(format!(
            "Loaded {} points",
            self.registry.len()
        )));
        self.renderer.request_repaint();
    }

    /// インタラクションモードを切り替え
    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        self.hover_cursor = mode.cursor();
        self.events.push(SessionEvent::mode_changed(mode));
        log::debug!("Interaction mode: {}", mode);
    }

    /// ビューポートサイズを更新
    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.set_viewport(width, height);
        self.renderer.request_repaint();
    }

    /// ホスト側のオービット操作で動いたカメラ姿勢を反映
    pub fn sync_camera(&mut self, position: Vec3, target: Vec3) {
        self.camera.set_position(position);
        self.camera.set_target(target);
    }

    /// Single entry point for pointer input.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<PickHit> {
        match interaction::route(event.kind, self.mode, self.config.selection_gating) {
            PointerRoute::Ignore => None,
            PointerRoute::Hover => {
                let hit = picking::pick_at(&self.camera, &self.registry, event.x, event.y);
                let cursor = if hit.is_some() {
                    CursorHint::Pointer
                } else {
                    CursorHint::Default
                };
                if cursor != self.hover_cursor {
                    self.hover_cursor = cursor;
                    self.events.push(SessionEvent::Cursor(cursor));
                }
                hit
            }
            PointerRoute::Select => {
                // A miss keeps the current selection
                let hit = picking::pick_at(&self.camera, &self.registry, event.x, event.y)?;
                if let Err(err) = self.select_point(&hit.id) {
                    log::warn!("Picked point could not be selected: {}", err);
                }
                Some(hit)
            }
        }
    }

    /// Pointを選択してフォームに反映
    pub fn select_point(&mut self, id: &str) -> Result<(), SceneError> {
        let status = self
            .selection
            .select(id, &mut self.registry, &mut self.renderer)?;
        let form = self.populate_form(id);

        self.events.push(SessionEvent::Status(status));
        self.events
            .push(SessionEvent::SelectionChanged(Some(id.to_string())));
        if let Some(form) = form {
            self.events.push(SessionEvent::FormPopulated(form));
        }
        self.renderer.request_repaint();
        Ok(())
    }

    /// 選択を解除
    pub fn clear_selection(&mut self) {
        self.selection.clear(&mut self.registry, &mut self.renderer);
        self.edit.cancel();
        self.events.push(SessionEvent::SelectionChanged(None));
        self.events.push(SessionEvent::FormCleared);
        self.renderer.request_repaint();
    }

    fn populate_form(&mut self, id: &str) -> Option<EditForm> {
        let entry = self.registry.get(id)?;
        let proxy = self.registry.proxy(entry.proxy)?;
        Some(self.edit.populate(entry, proxy, &self.frame).clone())
    }

    /// Select the next point in load order and orbit the camera onto it.
    pub fn next_point(&mut self) -> Option<String> {
        let id = self.cycle.next(self.registry.order())?;
        self.focus(&id);
        Some(id)
    }

    /// Same as [`Self::next_point`], walking backward.
    pub fn previous_point(&mut self) -> Option<String> {
        let id = self.cycle.previous(self.registry.order())?;
        self.focus(&id);
        Some(id)
    }

    fn focus(&mut self, id: &str) {
        if let Err(err) = self.select_point(id) {
            log::warn!("Cycle target could not be selected: {}", err);
            return;
        }
        if let Some(proxy) = self.registry.proxy_of(id) {
            self.camera.retarget(proxy.render_position);
        }
        log::debug!("Focused point {}", id);
    }

    /// Commit the form to the selected point.
    pub fn commit_edit(&mut self, form: &EditForm) -> Result<CommitReport, SceneError> {
        let report = self.apply_commit(form)?;
        self.events.push(SessionEvent::Status(format!(
            "Saved: {} ({})",
            report.record.name, report.record.id
        )));
        Ok(report)
    }

    /// State-only change of the selected point. `Ok(None)` when nothing is
    /// selected.
    pub fn set_selected_state(&mut self, state: &str) -> Result<Option<CommitReport>, SceneError> {
        let Some(id) = self.selection.selected().map(str::to_string) else {
            self.events.push(SessionEvent::Status(SELECT_FIRST.to_string()));
            return Ok(None);
        };
        let Some(entry) = self.registry.get(&id) else {
            return Err(RegistryError::NotFound { id }.into());
        };

        let point = &entry.point;
        let form = EditForm::new(&point.id, &point.name, point.position, point.radius, state);
        let report = self.apply_commit(&form)?;
        self.events.push(SessionEvent::Status(format!(
            "Updated {} → {}",
            report.record.name,
            report.record.state.as_deref().unwrap_or_default()
        )));
        Ok(Some(report))
    }

    fn apply_commit(&mut self, form: &EditForm) -> Result<CommitReport, SceneError> {
        let result = self.edit.commit(
            form,
            &mut self.registry,
            &self.frame,
            &mut self.bridge,
            &mut self.renderer,
        );
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                log::warn!("Edit rejected: {}", err);
                self.events.push(SessionEvent::Error(err.to_string()));
                return Err(err.into());
            }
        };

        if report.renamed() {
            self.selection
                .follow_rekey(&report.old_id, &report.record.id);
            self.events
                .push(SessionEvent::SelectionChanged(Some(report.record.id.clone())));
        }
        if let Err(err) = &report.mirror {
            log::warn!("Point list out of sync: {}", err);
            self.events.push(SessionEvent::Error(err.to_string()));
        }
        if let Some(form) = self.edit.form() {
            self.events.push(SessionEvent::FormPopulated(form.clone()));
        }
        Ok(report)
    }

    /// Drop the edit buffer. The form goes back to the selected point's
    /// stored values, or is cleared when nothing is selected.
    pub fn cancel_edit(&mut self) {
        self.edit.cancel();
        let form = self
            .selection
            .selected()
            .map(str::to_string)
            .and_then(|id| self.populate_form(&id));
        match form {
            Some(form) => self.events.push(SessionEvent::FormPopulated(form)),
            None => self.events.push(SessionEvent::FormCleared),
        }
    }

    /// Drain the outbox.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// External point list as pretty JSON.
    pub fn points_json(&self) -> Result<String, serde_json::Error> {
        self.bridge.to_json()
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn model(&self) -> &LoadedModel {
        &self.model
    }

    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    pub fn registry(&self) -> &PointRegistry {
        &self.registry
    }

    pub fn persistence(&self) -> &PersistenceBridge {
        &self.bridge
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.selected()
    }

    pub fn edit_form(&self) -> Option<&EditForm> {
        self.edit.form()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
