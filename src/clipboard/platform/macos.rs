use std::path::PathBuf;

use super::parse::applescript_data_literal;
use super::run_tool;
use crate::clipboard::ClipboardImageSource;
use crate::error::AppError;

/// 读取文件引用（Finder 复制的文件），取不到时返回空字符串
const FILE_URL_SCRIPT: &str = r#"try
    return POSIX path of (the clipboard as «class furl»)
on error
    return ""
end try"#;

/// 读取 PNG 像素数据，osascript 会以 `«data PNGf…»` 十六进制字面量输出
const PNG_DATA_SCRIPT: &str = r#"try
    return the clipboard as «class PNGf»
on error
    return ""
end try"#;

/// macOS 剪贴板：通过 `osascript` 访问 NSPasteboard
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

/// 脚本自身吞掉了“类型不匹配”错误，非零退出说明 osascript 本身出了问题
async fn run_script(script: &str) -> Result<String, AppError> {
    let stdout = run_tool("osascript", &["-e", script])
        .await?
        .ok_or_else(|| AppError::Acquisition("osascript 执行失败".to_string()))?;
    Ok(String::from_utf8_lossy(&stdout).trim().to_string())
}

impl ClipboardImageSource for SystemClipboard {
    async fn file_reference(&self) -> Result<Option<PathBuf>, AppError> {
        let path = run_script(FILE_URL_SCRIPT).await?;
        if path.is_empty() {
            return Ok(None);
        }
        Ok(Some(PathBuf::from(path)))
    }

    async fn image_bytes(&self) -> Result<Option<Vec<u8>>, AppError> {
        let output = run_script(PNG_DATA_SCRIPT).await?;
        if output.is_empty() {
            return Ok(None);
        }
        match applescript_data_literal(&output) {
            Some(bytes) => Ok(Some(bytes)),
            None => Err(AppError::Acquisition("无法解析 osascript 输出的图片数据".to_string())),
        }
    }
}
