//! シェーダーモジュール
//!
//! WGSLシェーダーを外部ファイルから読み込む

/// マーカーシェーダー（インスタンス描画用）
pub const MARKER_SHADER: &str = include_str!("marker.wgsl");
