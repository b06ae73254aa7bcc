//! 剪贴板图片探测模块
//!
//! # 设计思路
//!
//! 剪贴板里的图片有两种形态：
//! - **文件引用**：用户在文件管理器里复制了一个图片文件，剪贴板里只有路径
//! - **像素数据**：截图等场景，剪贴板里是内存中的栅格图片
//!
//! 探测按“两阶段、先命中先返回”执行：
//! 1. 文件引用阶段：扩展名（忽略大小写）在白名单内则直接返回原文件路径，不复制
//! 2. 像素数据阶段：把字节原样写入私有临时目录，返回临时文件路径
//! 3. 都没有则返回 `NoImage`（纯文本是最常见情况，不是错误）
//!
//! # 实现思路
//!
//! - 平台差异全部收敛在 `ClipboardImageSource` 后面，本模块只做判定与落盘。
//! - 工具无法启动等异常返回 `AppError::Acquisition`，与 `NoImage` 区分，
//!   但调用方对两者都按“没拿到图片”处理。
//! - 临时文件的归属通过 `ImageOrigin` 显式标记，写入阶段据此决定是否删除源文件，
//!   用户自己的文件永远不会被删。

mod bitmap;
pub mod platform;
mod temp;

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::AppError;

pub use bitmap::{encode_rgba_png, sniff_extension};
pub use platform::SystemClipboard;
pub use temp::{TempArea, TEMP_FILE_MARKER};

/// 文件引用阶段接受的图片扩展名（小写）
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"];

/// 平台剪贴板能力接口
///
/// 每个目标系统一个实现；不支持的平台两个阶段都返回 `Ok(None)`。
pub trait ClipboardImageSource: Send + Sync {
    /// 剪贴板中的文件引用（只取第一个）
    fn file_reference(&self) -> impl Future<Output = Result<Option<PathBuf>, AppError>> + Send;

    /// 剪贴板中的原始图片字节
    fn image_bytes(&self) -> impl Future<Output = Result<Option<Vec<u8>>, AppError>> + Send;
}

/// 图片文件的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    /// 剪贴板引用的已有文件，归用户所有
    Referenced,
    /// 本程序写入私有临时目录的文件，保存成功后删除
    Extracted,
}

/// 探测到的剪贴板图片文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardImage {
    path: PathBuf,
    origin: ImageOrigin,
}

impl ClipboardImage {
    /// 用户已有文件
    pub fn referenced(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            origin: ImageOrigin::Referenced,
        }
    }

    pub(crate) fn extracted(path: PathBuf) -> Self {
        Self {
            path,
            origin: ImageOrigin::Extracted,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> ImageOrigin {
        self.origin
    }

    pub fn is_extracted(&self) -> bool {
        self.origin == ImageOrigin::Extracted
    }
}

/// 单次探测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardProbeResult {
    NoImage,
    ImagePath(ClipboardImage),
}

/// 扩展名是否在图片白名单内（忽略大小写）
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

async fn is_readable_file(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => tokio::fs::File::open(path).await.is_ok(),
        _ => false,
    }
}

async fn confirm_readable(image: ClipboardImage) -> ClipboardProbeResult {
    if is_readable_file(image.path()).await {
        ClipboardProbeResult::ImagePath(image)
    } else {
        log::warn!("⚠️ 剪贴板图片文件不可读，按无图片处理: {}", image.path().display());
        ClipboardProbeResult::NoImage
    }
}

/// 探测剪贴板中的图片
///
/// # 返回
/// - `Ok(ImagePath)`：已得到可读的图片文件
/// - `Ok(NoImage)`：剪贴板里没有图片
/// - `Err(AppError::Acquisition)`：平台工具调用失败
pub async fn probe_clipboard_image<S>(
    source: &S,
    temp_area: &TempArea,
) -> Result<ClipboardProbeResult, AppError>
where
    S: ClipboardImageSource,
{
    if let Some(path) = source.file_reference().await? {
        if has_image_extension(&path) {
            log::info!("📁 剪贴板包含图片文件引用: {}", path.display());
            return Ok(confirm_readable(ClipboardImage::referenced(path)).await);
        }
        log::debug!("剪贴板文件引用不是图片，继续检查像素数据: {}", path.display());
    }

    let bytes = match source.image_bytes().await? {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => {
            log::debug!("剪贴板中没有图片");
            return Ok(ClipboardProbeResult::NoImage);
        }
    };

    let extension = sniff_extension(&bytes);
    let image = temp_area.write(&bytes, extension).await?;
    log::info!(
        "🖼️ 已将剪贴板图片写入临时文件: {} ({} 字节)",
        image.path().display(),
        bytes.len()
    );

    Ok(confirm_readable(image).await)
}
