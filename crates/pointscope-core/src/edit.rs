//! Edit buffer for the selected marker and the atomic commit.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{EditError, PersistenceError, RegistryError};
use crate::frame::CoordinateFrame;
use crate::persistence::PersistenceBridge;
use crate::point::{normalize_radius, PointRecord, DEFAULT_STATE};
use crate::port::SceneRenderer;
use crate::proxy::VisualProxy;
use crate::registry::{PointEntry, PointRegistry};

/// Form fields as the operator sees them. Positions are in the world frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditForm {
    pub id: String,
    pub name: String,
    pub x: String,
    pub y: String,
    pub z: String,
    pub radius: String,
    pub state: String,
}

impl EditForm {
    pub fn new(id: &str, name: &str, world: Vec3, radius: f32, state: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            x: world.x.to_string(),
            y: world.y.to_string(),
            z: world.z.to_string(),
            radius: radius.to_string(),
            state: state.to_string(),
        }
    }

    /// Parse and validate. Bad coordinates reject the form; a bad radius
    /// falls back to `default_radius`.
    pub fn parse(&self, default_radius: f32) -> Result<ParsedEdit, EditError> {
        let position = Vec3::new(
            parse_coordinate('x', &self.x)?,
            parse_coordinate('y', &self.y)?,
            parse_coordinate('z', &self.z)?,
        );

        let id = self.id.trim();
        if id.is_empty() {
            return Err(EditError::EmptyId);
        }

        let radius = normalize_radius(self.radius.trim().parse().ok(), default_radius);
        let state = match self.state.trim() {
            "" => DEFAULT_STATE,
            state => state,
        };

        Ok(ParsedEdit {
            id: id.to_string(),
            name: self.name.clone(),
            position,
            radius,
            state: state.to_string(),
        })
    }
}

fn parse_coordinate(axis: char, raw: &str) -> Result<f32, EditError> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EditError::InvalidCoordinate {
            axis,
            value: raw.to_string(),
        })
}

/// Validated field values of a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEdit {
    pub id: String,
    pub name: String,
    pub position: Vec3,
    pub radius: f32,
    pub state: String,
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    /// Id before the commit
    pub old_id: String,
    /// Full record after the commit
    pub record: PointRecord,
    pub radius_changed: bool,
    pub state_changed: bool,
    /// Mirroring into the external point list
    pub mirror: Result<(), PersistenceError>,
}

impl CommitReport {
    pub fn renamed(&self) -> bool {
        self.old_id != self.record.id
    }
}

#[derive(Debug, Clone)]
struct EditBuffer {
    target_id: String,
    form: EditForm,
}

/// Staging area for edits of the selected marker.
#[derive(Debug, Default)]
pub struct EditSession {
    buffer: Option<EditBuffer>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the entry into the form, converting the proxy position back
    /// to the world frame.
    pub fn populate(
        &mut self,
        entry: &PointEntry,
        proxy: &VisualProxy,
        frame: &CoordinateFrame,
    ) -> &EditForm {
        let point = &entry.point;
        let world = frame.to_world(proxy.render_position);
        let form = EditForm::new(&point.id, &point.name, world, proxy.radius, &point.state);
        &self
            .buffer
            .insert(EditBuffer {
                target_id: point.id.clone(),
                form,
            })
            .form
    }

    pub fn form(&self) -> Option<&EditForm> {
        self.buffer.as_ref().map(|buffer| &buffer.form)
    }

    pub fn target_id(&self) -> Option<&str> {
        self.buffer.as_ref().map(|buffer| buffer.target_id.as_str())
    }

    /// Discard the buffer without touching anything else.
    pub fn cancel(&mut self) -> Option<EditForm> {
        self.buffer.take().map(|buffer| buffer.form)
    }

    /// Apply `form` to the buffered marker.
    ///
    /// Either every change lands (registry, proxy, renderer, external list)
    /// or none does. The only failure after mutation starts is a missing
    /// external record, which is reported in [`CommitReport::mirror`].
    pub fn commit<R: SceneRenderer + ?Sized>(
        &mut self,
        form: &EditForm,
        registry: &mut PointRegistry,
        frame: &CoordinateFrame,
        bridge: &mut PersistenceBridge,
        renderer: &mut R,
    ) -> Result<CommitReport, EditError> {
        let old_id = self.target_id().ok_or(EditError::NothingSelected)?.to_string();
        let edit = form.parse(frame.default_radius())?;

        let Some(entry) = registry.get(&old_id) else {
            return Err(RegistryError::NotFound { id: old_id }.into());
        };
        if edit.id != old_id && registry.contains(&edit.id) {
            return Err(RegistryError::IdConflict { id: edit.id }.into());
        }

        let handle = entry.proxy;
        let radius_changed = entry.point.radius != edit.radius;
        let state_changed = entry.point.state != edit.state;

        registry.rekey(&old_id, &edit.id)?;

        if let Some(proxy) = registry.proxy_mut(handle) {
            proxy.render_position = frame.to_render(edit.position);
            if radius_changed {
                proxy.radius = edit.radius;
                renderer.rebuild_geometry(handle, edit.radius);
            }
            if state_changed {
                proxy.recolor(&edit.state);
            }
            renderer.restyle_proxy(handle, proxy);
        }

        let Some(point) = registry.point_mut(&edit.id) else {
            return Err(RegistryError::NotFound { id: edit.id }.into());
        };
        point.name = edit.name;
        point.position = edit.position;
        point.radius = edit.radius;
        point.state = edit.state;

        let record = point.to_record();
        let refreshed = EditForm::new(&point.id, &point.name, point.position, point.radius, &point.state);
        let mirror = bridge.overwrite(&old_id, record.clone());

        self.buffer = Some(EditBuffer {
            target_id: record.id.clone(),
            form: refreshed,
        });
        renderer.request_repaint();

        log::debug!("Committed edit {} -> {}", old_id, record.id);
        Ok(CommitReport {
            old_id,
            record,
            radius_changed,
            state_changed,
            mirror,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::AABB;
    use crate::palette;
    use crate::testing::{record, RecordingRenderer};

    struct Fixture {
        registry: PointRegistry,
        frame: CoordinateFrame,
        bridge: PersistenceBridge,
        renderer: RecordingRenderer,
        edit: EditSession,
    }

    impl Fixture {
        fn new() -> Self {
            let records = vec![record("p1", [1.0, 2.0, 3.0]), record("p2", [4.0, 5.0, 6.0])];
            let frame = CoordinateFrame::from_bounds(
                &AABB::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, 8.0)),
                0.05,
            );
            let mut registry = PointRegistry::new();
            let mut renderer = RecordingRenderer::default();
            registry.load(&records, &frame, &mut renderer).unwrap();
            let mut bridge = PersistenceBridge::new();
            bridge.replace_all(records);
            Self {
                registry,
                frame,
                bridge,
                renderer,
                edit: EditSession::new(),
            }
        }

        fn populate(&mut self, id: &str) -> EditForm {
            let entry = self.registry.get(id).unwrap();
            let proxy = self.registry.proxy(entry.proxy).unwrap();
            self.edit.populate(entry, proxy, &self.frame).clone()
        }

        fn commit(&mut self, form: &EditForm) -> Result<CommitReport, EditError> {
            self.edit.commit(
                form,
                &mut self.registry,
                &self.frame,
                &mut self.bridge,
                &mut self.renderer,
            )
        }
    }

    #[test]
    fn test_populate_returns_world_position() {
        let mut fx = Fixture::new();
        let form = fx.populate("p2");
        let x: f32 = form.x.parse().unwrap();
        let y: f32 = form.y.parse().unwrap();
        let z: f32 = form.z.parse().unwrap();
        assert!(Vec3::new(x, y, z).abs_diff_eq(Vec3::new(4.0, 5.0, 6.0), 1e-5));
        assert_eq!(form.id, "p2");
        assert_eq!(form.state, "pending");
        assert_eq!(fx.edit.target_id(), Some("p2"));
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        let form = EditForm {
            x: "not a number".into(),
            ..EditForm::new("a", "A", Vec3::ZERO, 1.0, "done")
        };
        assert_eq!(
            form.parse(0.1),
            Err(EditError::InvalidCoordinate {
                axis: 'x',
                value: "not a number".into()
            })
        );

        let form = EditForm {
            z: "inf".into(),
            ..EditForm::new("a", "A", Vec3::ZERO, 1.0, "done")
        };
        assert!(matches!(form.parse(0.1), Err(EditError::InvalidCoordinate { axis: 'z', .. })));
    }

    #[test]
    fn test_parse_soft_defaults() {
        let form = EditForm {
            radius: "NaN".into(),
            state: "  ".into(),
            ..EditForm::new(" a ", "A", Vec3::ONE, 1.0, "done")
        };
        let parsed = form.parse(0.25).unwrap();
        assert_eq!(parsed.id, "a");
        assert_eq!(parsed.radius, 0.25);
        assert_eq!(parsed.state, DEFAULT_STATE);
        assert_eq!(parsed.position, Vec3::ONE);
    }

    #[test]
    fn test_parse_empty_id() {
        let form = EditForm::new("  ", "A", Vec3::ONE, 1.0, "done");
        assert_eq!(form.parse(0.1), Err(EditError::EmptyId));
    }

    #[test]
    fn test_commit_without_selection() {
        let mut fx = Fixture::new();
        let form = EditForm::new("p1", "A", Vec3::ZERO, 1.0, "done");
        assert_eq!(fx.commit(&form), Err(EditError::NothingSelected));
    }

    #[test]
    fn test_commit_updates_everything() {
        let mut fx = Fixture::new();
        let mut form = fx.populate("p1");
        form.name = "Renamed".into();
        form.x = "10".into();
        form.radius = "0.75".into();
        form.state = "done".into();

        let report = fx.commit(&form).unwrap();
        assert!(report.radius_changed);
        assert!(report.state_changed);
        assert_eq!(report.mirror, Ok(()));

        let entry = fx.registry.get("p1").unwrap();
        assert_eq!(entry.point.name, "Renamed");
        assert_eq!(entry.point.position.x, 10.0);
        assert_eq!(entry.point.radius, 0.75);
        assert_eq!(entry.point.state, "done");

        let proxy = fx.registry.proxy(entry.proxy).unwrap();
        assert_eq!(proxy.color, palette::DONE);
        assert_eq!(proxy.radius, 0.75);
        assert!(proxy.render_position.abs_diff_eq(fx.frame.to_render(entry.point.position), 1e-6));
        assert_eq!(fx.renderer.rebuilds, vec![(entry.proxy, 0.75)]);
        assert_eq!(fx.renderer.live.get(&entry.proxy), Some(proxy));

        let saved = &fx.bridge.records()[0];
        assert_eq!(saved.name, "Renamed");
        assert_eq!(saved.radius, Some(0.75));
        assert_eq!(saved.state.as_deref(), Some("done"));
    }

    #[test]
    fn test_commit_unchanged_radius_skips_rebuild() {
        let mut fx = Fixture::new();
        let form = fx.populate("p1");
        let report = fx.commit(&form).unwrap();
        assert!(!report.radius_changed);
        assert!(!report.state_changed);
        assert!(fx.renderer.rebuilds.is_empty());
    }

    #[test]
    fn test_commit_rekey() {
        let mut fx = Fixture::new();
        let handle = fx.registry.get("p1").unwrap().proxy;
        let mut form = fx.populate("p1");
        form.id = "p9".into();

        let report = fx.commit(&form).unwrap();
        assert!(report.renamed());
        assert!(fx.registry.get("p1").is_none());
        assert_eq!(fx.registry.get("p9").unwrap().proxy, handle);
        assert!(!fx.registry.order().contains(&"p1".to_string()));
        assert_eq!(fx.registry.order()[0], "p9");

        // 外部リストは旧IDで検索され、同じ位置で置換される
        assert_eq!(fx.bridge.records()[0].id, "p9");
        assert_eq!(fx.bridge.len(), 2);
        assert_eq!(fx.edit.target_id(), Some("p9"));
    }

    #[test]
    fn test_commit_id_conflict_changes_nothing() {
        let mut fx = Fixture::new();
        let before = fx.registry.get("p1").unwrap().clone();
        let mut form = fx.populate("p1");
        form.id = "p2".into();
        form.name = "Clobber".into();
        form.radius = "9".into();
        form.state = "error".into();

        let result = fx.commit(&form);
        assert_eq!(
            result,
            Err(EditError::Registry(RegistryError::IdConflict { id: "p2".into() }))
        );
        assert_eq!(fx.registry.get("p1"), Some(&before));
        assert_eq!(fx.registry.proxy(before.proxy).unwrap().color, palette::PENDING);
        assert!(fx.renderer.rebuilds.is_empty());
        assert_eq!(fx.bridge.records()[0].name, "Point p1");
    }

    #[test]
    fn test_commit_invalid_coordinate_changes_nothing() {
        let mut fx = Fixture::new();
        let before = fx.registry.get("p1").unwrap().clone();
        let proxy_before = fx.registry.proxy(before.proxy).unwrap().clone();
        let mut form = fx.populate("p1");
        form.x = "not a number".into();
        form.radius = "3".into();
        form.state = "done".into();

        assert!(matches!(fx.commit(&form), Err(EditError::InvalidCoordinate { .. })));
        assert_eq!(fx.registry.get("p1"), Some(&before));
        assert_eq!(fx.registry.proxy(before.proxy), Some(&proxy_before));
    }

    #[test]
    fn test_commit_reports_missing_external_record() {
        let mut fx = Fixture::new();
        fx.bridge.replace_all(vec![record("p2", [0.0; 3])]);
        let mut form = fx.populate("p1");
        form.name = "Still saved".into();

        let report = fx.commit(&form).unwrap();
        assert_eq!(
            report.mirror,
            Err(PersistenceError::MissingRecord { id: "p1".into() })
        );
        assert_eq!(fx.registry.get("p1").unwrap().point.name, "Still saved");
        assert_eq!(fx.bridge.len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut fx = Fixture::new();
        fx.populate("p1");
        assert!(fx.edit.cancel().is_some());
        assert!(fx.edit.form().is_none());
        assert!(fx.edit.cancel().is_none());
    }
}
