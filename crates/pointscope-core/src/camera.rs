use glam::{Mat4, Vec2, Vec3};

use crate::bounds::AABB;
use crate::picking::Ray;

/// 3Dカメラ
/// 位置、注視点、上方向ベクトルを持つ透視投影カメラ
/// 注視点はオービット操作の回転中心
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// ビューポートサイズ（ピクセル）
    pub viewport: Vec2,
}

impl Camera {
    /// デフォルト値で新しいカメラを作成
    pub fn new(viewport: Vec2) -> Self {
        Self {
            position: Vec3::new(2.4, 1.6, 2.4),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 55.0_f32.to_radians(),
            aspect: aspect_of(viewport),
            near: 0.1,
            far: 100.0,
            viewport,
        }
    }

    /// View-Projection行列を構築
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.target, self.view_up());
        let proj = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
        proj * view
    }

    /// 視線が上方向ベクトルとほぼ平行（真上/真下から見下ろす）なら別の軸を使う
    fn view_up(&self) -> Vec3 {
        let forward = (self.target - self.position).normalize_or_zero();
        if forward.cross(self.up).length_squared() > 1e-6 {
            self.up
        } else if forward.cross(Vec3::Z).length_squared() > 1e-6 {
            Vec3::Z
        } else {
            Vec3::X
        }
    }

    /// カメラ位置を設定
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// カメラの注視点を設定
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// ビューポートサイズを設定（アスペクト比も更新）
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        self.aspect = aspect_of(self.viewport);
    }

    /// 注視点までの距離
    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    /// スクリーン座標（左上原点のピクセル）からワールド空間のレイを生成
    pub fn screen_to_ray(&self, screen_x: f32, screen_y: f32) -> Ray {
        let width = self.viewport.x.max(1.0);
        let height = self.viewport.y.max(1.0);
        let ndc = Vec2::new(
            (screen_x / width) * 2.0 - 1.0,
            1.0 - (screen_y / height) * 2.0,
        );

        let inverse = self.build_view_projection_matrix().inverse();
        let far_point = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(self.position, far_point - self.position)
    }

    /// 注視点を移動し、距離と視線方向を維持してカメラ位置を再計算
    pub fn retarget(&mut self, target: Vec3) {
        let offset = self.position - self.target;
        let distance = offset.length();
        let direction = offset.normalize_or_zero();

        self.target = target;
        self.position = target + direction * distance;
    }

    /// 中心化済みモデル全体が収まるように配置
    pub fn frame_model(&mut self, bounds: &AABB) {
        let fit_distance = bounds.max_extent() * 1.5;
        self.target = Vec3::ZERO;
        if fit_distance.is_finite() && fit_distance > 0.0 {
            self.position = Vec3::new(fit_distance, fit_distance * 0.8, fit_distance);
            self.far = self.far.max(fit_distance * 10.0);
        }
    }
}

fn aspect_of(viewport: Vec2) -> f32 {
    if viewport.x > 0.0 && viewport.y > 0.0 {
        viewport.x / viewport.y
    } else {
        1.0
    }
}
