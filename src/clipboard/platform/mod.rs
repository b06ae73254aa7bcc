//! 平台剪贴板实现（分层门面）
//!
//! - `macos`：`osascript` 读取 `«class furl»` / `«class PNGf»`
//! - `linux`：Wayland 下 `wl-paste`，X11 下 `xclip`
//! - `windows`：`CF_HDROP` 文件列表 + `arboard` 位图
//! - 其他平台：占位实现，始终没有图片
//!
//! 每个平台对外都叫 `SystemClipboard`，编排层无需条件编译。

mod parse;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
pub use linux::SystemClipboard;
#[cfg(target_os = "macos")]
pub use macos::SystemClipboard;
#[cfg(target_os = "windows")]
pub use windows::SystemClipboard;

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
mod unsupported {
    use std::path::PathBuf;

    use crate::clipboard::ClipboardImageSource;
    use crate::error::AppError;

    /// 不支持的平台：两个阶段都没有数据，探测结果恒为 `NoImage`
    #[derive(Debug, Default)]
    pub struct SystemClipboard;

    impl SystemClipboard {
        pub fn new() -> Self {
            Self
        }
    }

    impl ClipboardImageSource for SystemClipboard {
        async fn file_reference(&self) -> Result<Option<PathBuf>, AppError> {
            Ok(None)
        }

        async fn image_bytes(&self) -> Result<Option<Vec<u8>>, AppError> {
            Ok(None)
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub use unsupported::SystemClipboard;

/// 运行外部剪贴板工具并收集标准输出
///
/// - 无法启动（未安装、权限不足）→ `AppError::Acquisition`
/// - 非零退出 → `Ok(None)`，由调用方决定含义
#[cfg(any(target_os = "linux", target_os = "macos"))]
async fn run_tool(program: &str, args: &[&str]) -> Result<Option<Vec<u8>>, crate::error::AppError> {
    let output = tokio::process::Command::new(program)
        .args(args)
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .map_err(|e| crate::error::AppError::Acquisition(format!("无法启动 {}: {}", program, e)))?;

    if !output.status.success() {
        log::debug!(
            "{} {:?} 退出码 {:?}: {}",
            program,
            args,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Ok(None);
    }

    Ok(Some(output.stdout))
}
