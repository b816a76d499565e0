use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use wgpu::{VertexBufferLayout, VertexAttribute, VertexFormat, VertexStepMode, BufferAddress};

/// 頂点構造体
/// 位置、法線を含む（色はインスタンス側）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    /// 新しい頂点を作成
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// 頂点バッファレイアウトを取得
    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &[
                // position
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                },
                // normal
                VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// メッシュ構造体
/// 頂点とインデックスを含む
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// マーカー球の分割数
    pub const SPHERE_SEGMENTS: u32 = 16;
    pub const SPHERE_RINGS: u32 = 16;

    /// 空のメッシュを作成
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// UV球メッシュを生成（原点中心）
    /// segments: 経度方向の分割数、rings: 緯度方向の分割数
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            for segment in 0..=segments {
                let theta = TAU * segment as f32 / segments as f32;
                let (sin_theta, cos_theta) = theta.sin_cos();
                let normal = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
                let position = normal.map(|n| n * radius);
                vertices.push(Vertex::new(position, normal));
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                // 極の縮退三角形は除外
                if ring != 0 {
                    indices.extend_from_slice(&[a, a + 1, b]);
                }
                if ring != rings - 1 {
                    indices.extend_from_slice(&[a + 1, b + 1, b]);
                }
            }
        }

        Self { vertices, indices }
    }

    /// インスタンス描画用の単位球
    pub fn unit_sphere() -> Self {
        Self::uv_sphere(1.0, Self::SPHERE_SEGMENTS, Self::SPHERE_RINGS)
    }

    /// 頂点数を取得
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// インデックス数を取得
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vertex_size() {
        // 3 floats * 2 attributes * 4 bytes = 24 bytes
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn test_sphere_counts() {
        let sphere = Mesh::uv_sphere(1.0, 8, 4);
        assert_eq!(sphere.vertex_count(), 9 * 5);
        // 極のリングは1三角形/セグメント、それ以外は2三角形
        assert_eq!(sphere.index_count(), (8 * 2 + 8 * 2 * 2) * 3);
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let sphere = Mesh::uv_sphere(0.25, 12, 6);
        for vertex in &sphere.vertices {
            let [x, y, z] = vertex.position;
            assert_relative_eq!((x * x + y * y + z * z).sqrt(), 0.25, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_sphere_indices_in_range() {
        let sphere = Mesh::unit_sphere();
        let count = sphere.vertex_count() as u32;
        assert!(sphere.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_sphere_minimum_subdivision() {
        let sphere = Mesh::uv_sphere(1.0, 0, 0);
        assert_eq!(sphere.vertex_count(), 4 * 3);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::new();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.index_count(), 0);
    }
}
