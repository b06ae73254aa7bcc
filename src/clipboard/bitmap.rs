//! 像素数据辅助：格式识别与 RGBA 编码

use std::io::Cursor;

use image::ImageFormat;

use crate::error::AppError;

/// 根据文件头识别图片扩展名，无法识别时回退 `png`
pub fn sniff_extension(bytes: &[u8]) -> &'static str {
    match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => match kind.extension() {
            "tif" => "tiff",
            other => other,
        },
        _ => "png",
    }
}

/// 将 RGBA 像素编码为 PNG
///
/// 仅用于只提供解码后像素的平台剪贴板接口（Windows 位图）。
pub fn encode_rgba_png(width: usize, height: usize, rgba: Vec<u8>) -> Result<Vec<u8>, AppError> {
    let image = image::RgbaImage::from_raw(width as u32, height as u32, rgba)
        .ok_or_else(|| {
            AppError::Acquisition(format!("像素数据与尺寸 {}x{} 不匹配", width, height))
        })?;

    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| AppError::Acquisition(format!("编码 PNG 失败: {}", e)))?;
    Ok(cursor.into_inner())
}
