//! Per-proxy instance data for instanced marker drawing.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use pointscope_core::VisualProxy;
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// One marker instance: unit-sphere transform plus material.
///
/// `emissive.w` carries the emissive intensity.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ProxyInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub emissive: [f32; 4],
}

impl ProxyInstance {
    /// Floats per instance, for hosts reading the flat buffer.
    pub const FLOATS: usize = 24;

    pub fn from_proxy(proxy: &VisualProxy) -> Self {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(proxy.radius * proxy.scale()),
            glam::Quat::IDENTITY,
            proxy.render_position,
        );
        let (emissive, intensity) = proxy.emissive();

        Self {
            model: model.to_cols_array_2d(),
            color: proxy.color.to_rgba(1.0),
            emissive: emissive.to_rgba(intensity),
        }
    }

    /// インスタンスバッファレイアウトを取得
    /// location 2..=5: model, 6: color, 7: emissive
    pub fn desc() -> VertexBufferLayout<'static> {
        const VEC4: BufferAddress = std::mem::size_of::<[f32; 4]>() as BufferAddress;
        VertexBufferLayout {
            array_stride: std::mem::size_of::<ProxyInstance>() as BufferAddress,
            step_mode: VertexStepMode::Instance,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: VertexFormat::Float32x4,
                },
                VertexAttribute {
                    offset: VEC4,
                    shader_location: 3,
                    format: VertexFormat::Float32x4,
                },
                VertexAttribute {
                    offset: VEC4 * 2,
                    shader_location: 4,
                    format: VertexFormat::Float32x4,
                },
                VertexAttribute {
                    offset: VEC4 * 3,
                    shader_location: 5,
                    format: VertexFormat::Float32x4,
                },
                VertexAttribute {
                    offset: VEC4 * 4,
                    shader_location: 6,
                    format: VertexFormat::Float32x4,
                },
                VertexAttribute {
                    offset: VEC4 * 5,
                    shader_location: 7,
                    format: VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointscope_core::palette;

    #[test]
    fn test_instance_size() {
        assert_eq!(
            std::mem::size_of::<ProxyInstance>(),
            ProxyInstance::FLOATS * std::mem::size_of::<f32>()
        );
    }

    #[test]
    fn test_from_proxy() {
        let proxy = VisualProxy::new(Vec3::new(1.0, 2.0, 3.0), 0.5, "done");
        let instance = ProxyInstance::from_proxy(&proxy);

        let model = Mat4::from_cols_array_2d(&instance.model);
        assert_eq!(model.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(model.transform_vector3(Vec3::X), Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(instance.color, palette::DONE.to_rgba(1.0));
        assert_eq!(instance.emissive[3], 0.0);
    }

    #[test]
    fn test_emphasized_instance() {
        let mut proxy = VisualProxy::new(Vec3::ZERO, 1.0, "pending");
        proxy.emphasized = true;
        let instance = ProxyInstance::from_proxy(&proxy);

        assert_eq!(instance.model[0][0], palette::EMPHASIS_SCALE);
        assert_eq!(
            instance.emissive,
            palette::EMPHASIS_EMISSIVE.to_rgba(palette::EMPHASIS_INTENSITY)
        );
    }
}
