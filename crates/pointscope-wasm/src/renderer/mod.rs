//! Rendererモジュール
//!
//! マーカーを透過キャンバスに重ねて描画する（モデル本体はホスト側で描画）

mod depth;
mod gpu_context;
mod marker_pipeline;

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use pointscope_core::Camera;
use pointscope_renderer::{CameraUniform, ProxyInstance};

use crate::utils::js_error;
use gpu_context::GpuContext;
use marker_pipeline::MarkerPipeline;

/// オーバーレイRenderer
pub struct OverlayRenderer {
    ctx: GpuContext,
    markers: MarkerPipeline,
    instance_count: u32,

    // Depth buffer
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl OverlayRenderer {
    /// 新しいOverlayRendererを作成（非同期）
    pub async fn create(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = GpuContext::new(canvas).await?;

        let markers = MarkerPipeline::new(&ctx, bytemuck::bytes_of(&CameraUniform::default()));
        let (depth_texture, depth_view) = depth::create_texture(&ctx.device, ctx.width(), ctx.height());

        log::info!("Overlay renderer initialized");

        Ok(Self {
            ctx,
            markers,
            instance_count: 0,
            depth_texture,
            depth_view,
        })
    }

    /// インスタンスデータを更新
    pub fn upload_instances(&mut self, instances: &[ProxyInstance]) {
        self.markers.write_instances(&self.ctx, instances);
        self.instance_count = instances.len() as u32;
    }

    /// 1フレーム描画
    pub fn render(&self, camera: &Camera) -> Result<(), JsValue> {
        let output = self
            .ctx
            .surface
            .get_current_texture()
            .map_err(|e| js_error(format!("Failed to get surface texture: {:?}", e)))?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Camera uniform更新
        self.ctx.queue.write_buffer(
            &self.markers.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::from_camera(camera)),
        );

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Overlay Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // 透過クリア（下のモデル表示を残す）
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if self.instance_count > 0 {
                render_pass.set_pipeline(&self.markers.pipeline);
                render_pass.set_bind_group(0, &self.markers.camera_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.markers.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.markers.instance_buffer.slice(..));
                render_pass.set_index_buffer(self.markers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.markers.num_indices, 0, 0..self.instance_count);
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Canvas サイズ変更
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);

            // Depth Texture再作成
            let (depth_texture, depth_view) = depth::create_texture(&self.ctx.device, width, height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;

            log::debug!("Overlay resized to {}x{}", width, height);
        }
    }
}
