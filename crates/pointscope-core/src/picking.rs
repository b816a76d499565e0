//! Picking system for ray-sphere intersection
//!
//! Provides CPU-based marker picking using raycasting against the visual
//! proxies of a [`PointRegistry`].

use glam::Vec3;

use crate::camera::Camera;
use crate::handle::ProxyHandle;
use crate::registry::PointRegistry;

/// Ray for raycasting
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Check intersection with a sphere.
    /// Returns the distance to the first intersection in front of the origin;
    /// an origin inside the sphere hits at distance 0.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let c = oc.length_squared() - radius * radius;
        if c <= 0.0 {
            return Some(0.0);
        }

        let b = oc.dot(self.direction);
        if b > 0.0 {
            // Sphere is behind the origin
            return None;
        }

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        Some((-b - discriminant.sqrt()).max(0.0))
    }
}

/// Nearest proxy under a ray
#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub id: String,
    pub proxy: ProxyHandle,
    pub distance: f32,
}

/// Test the ray against every proxy and return the nearest hit.
/// Equal distances resolve to the point loaded first.
pub fn pick_nearest(ray: &Ray, registry: &PointRegistry) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;

    for (entry, proxy) in registry.iter_with_proxies() {
        let Some(distance) = ray.intersect_sphere(proxy.render_position, proxy.pick_radius()) else {
            continue;
        };
        if best.as_ref().is_none_or(|hit| distance < hit.distance) {
            best = Some(PickHit {
                id: entry.point.id.clone(),
                proxy: entry.proxy,
                distance,
            });
        }
    }

    best
}

/// Pick from viewport pixel coordinates.
pub fn pick_at(camera: &Camera, registry: &PointRegistry, screen_x: f32, screen_y: f32) -> Option<PickHit> {
    pick_nearest(&camera.screen_to_ray(screen_x, screen_y), registry)
}
