use std::path::PathBuf;

use crate::clipboard::{encode_rgba_png, ClipboardImageSource};
use crate::error::AppError;

/// Windows 剪贴板：`CF_HDROP` 文件列表 + 位图
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

/// 读取剪贴板中第一个文件（资源管理器复制文件时为 CF_HDROP）
fn read_first_dropped_file() -> Result<Option<PathBuf>, AppError> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use windows::Win32::System::DataExchange::{CloseClipboard, GetClipboardData, OpenClipboard};
    use windows::Win32::System::Ole::CF_HDROP;
    use windows::Win32::UI::Shell::{DragQueryFileW, HDROP};

    unsafe {
        OpenClipboard(None).map_err(|e| AppError::Acquisition(format!("打开剪贴板失败: {:?}", e)))?;

        let result = (|| -> Option<PathBuf> {
            let handle = GetClipboardData(CF_HDROP.0 as u32).ok()?;
            let hdrop = HDROP(handle.0);
            let count = DragQueryFileW(hdrop, 0xFFFFFFFF, None);
            if count == 0 {
                return None;
            }

            let len = DragQueryFileW(hdrop, 0, None);
            if len == 0 {
                return None;
            }
            let mut buf = vec![0u16; (len + 1) as usize];
            DragQueryFileW(hdrop, 0, Some(&mut buf));
            if let Some(pos) = buf.iter().position(|&c| c == 0) {
                buf.truncate(pos);
            }

            log::debug!("📁 剪贴板中有 {} 个文件，取第一个", count);
            Some(PathBuf::from(OsString::from_wide(&buf)))
        })();

        let _ = CloseClipboard();
        Ok(result)
    }
}

/// 读取浏览器/截图工具放入的 "PNG" 注册格式，字节原样返回
fn read_registered_png() -> Result<Option<Vec<u8>>, AppError> {
    use windows::Win32::Foundation::HGLOBAL;
    use windows::Win32::System::DataExchange::{
        CloseClipboard, GetClipboardData, OpenClipboard, RegisterClipboardFormatW,
    };
    use windows::Win32::System::Memory::{GlobalLock, GlobalSize, GlobalUnlock};

    let wide: Vec<u16> = "PNG".encode_utf16().chain(std::iter::once(0)).collect();

    unsafe {
        let format_id = RegisterClipboardFormatW(windows::core::PCWSTR(wide.as_ptr()));
        if format_id == 0 {
            return Ok(None);
        }

        OpenClipboard(None).map_err(|e| AppError::Acquisition(format!("打开剪贴板失败: {:?}", e)))?;

        let result = (|| -> Option<Vec<u8>> {
            let handle = GetClipboardData(format_id).ok()?;
            let hglobal = HGLOBAL(handle.0);
            let size = GlobalSize(hglobal);
            let ptr = GlobalLock(hglobal) as *const u8;
            if ptr.is_null() || size == 0 {
                return None;
            }
            let bytes = std::slice::from_raw_parts(ptr, size).to_vec();
            let _ = GlobalUnlock(hglobal);
            Some(bytes)
        })();

        let _ = CloseClipboard();
        Ok(result)
    }
}

/// 只有 CF_DIB 位图时，经 `arboard` 取得 RGBA 像素后编码为 PNG
fn read_bitmap_as_png() -> Result<Option<Vec<u8>>, AppError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| AppError::Acquisition(e.to_string()))?;

    match clipboard.get_image() {
        Ok(image) => {
            let (width, height) = (image.width, image.height);
            encode_rgba_png(width, height, image.bytes.into_owned()).map(Some)
        }
        Err(arboard::Error::ContentNotAvailable) => Ok(None),
        Err(e) => Err(AppError::Acquisition(e.to_string())),
    }
}

fn read_image_bytes() -> Result<Option<Vec<u8>>, AppError> {
    if let Some(bytes) = read_registered_png()? {
        return Ok(Some(bytes));
    }
    read_bitmap_as_png()
}

impl ClipboardImageSource for SystemClipboard {
    async fn file_reference(&self) -> Result<Option<PathBuf>, AppError> {
        tokio::task::spawn_blocking(read_first_dropped_file)
            .await
            .map_err(|e| AppError::Acquisition(format!("剪贴板读取任务失败: {}", e)))?
    }

    async fn image_bytes(&self) -> Result<Option<Vec<u8>>, AppError> {
        tokio::task::spawn_blocking(read_image_bytes)
            .await
            .map_err(|e| AppError::Acquisition(format!("剪贴板读取任务失败: {}", e)))?
    }
}
