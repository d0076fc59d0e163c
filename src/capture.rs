//! 写真の取り込み
//!
//! 端末カメラの代わりに写真ファイルを読み込み、解析APIへ送れる形
//! （縮小したJPEG + Base64）に変換する。

use crate::error::{InspectAiError, Result};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// 解析APIへ送る撮影画像
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub base64: String,
    pub width: u32,
    pub height: u32,
    /// 取り込み日時（RFC3339）
    pub captured_at: String,
}

fn is_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn read_photo(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => InspectAiError::FileNotFound(path.display().to_string()),
        ErrorKind::PermissionDenied => InspectAiError::PermissionDenied(path.display().to_string()),
        _ => InspectAiError::Io(e),
    })
}

/// 写真ファイルを取り込む
///
/// 長辺が `max_size` を超える場合は縮小し、JPEG (`quality`) で再エンコードする。
pub fn capture_image(path: &Path, max_size: u32, quality: u8) -> Result<CapturedImage> {
    if !is_image_extension(path) {
        return Err(InspectAiError::ImageLoad(format!(
            "対応していない形式です: {} (jpg/jpeg/png)",
            path.display()
        )));
    }

    let bytes = read_photo(path)?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| InspectAiError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let img = if img.width().max(img.height()) > max_size {
        img.resize(max_size, max_size, FilterType::Triangle)
    } else {
        img
    };

    // JPEGはアルファを持てないのでRGBへ
    let rgb = img.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| InspectAiError::ImageLoad(format!("JPEGエンコード失敗: {}", e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    tracing::debug!(
        file = %file_name,
        width = rgb.width(),
        height = rgb.height(),
        bytes = buffer.len(),
        "photo captured"
    );

    Ok(CapturedImage {
        path: path.to_path_buf(),
        file_name,
        mime_type: "image/jpeg".to_string(),
        base64: base64::engine::general_purpose::STANDARD.encode(&buffer),
        width: rgb.width(),
        height: rgb.height(),
        captured_at: chrono::Local::now().to_rfc3339(),
    })
}
