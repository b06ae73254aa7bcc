use std::path::PathBuf;

use super::parse::{first_file_uri, pick_image_target};
use super::run_tool;
use crate::clipboard::ClipboardImageSource;
use crate::error::AppError;

const URI_LIST_TARGET: &str = "text/uri-list";

/// 命令行剪贴板工具
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipboardTool {
    WlPaste,
    Xclip,
}

impl ClipboardTool {
    /// 按会话类型选择工具；没有图形会话（容器、SSH）时返回 `None`
    fn detect() -> Option<Self> {
        let has = |key: &str| std::env::var_os(key).is_some_and(|v| !v.is_empty());
        if has("WAYLAND_DISPLAY") {
            Some(Self::WlPaste)
        } else if has("DISPLAY") {
            Some(Self::Xclip)
        } else {
            None
        }
    }

    fn program(self) -> &'static str {
        match self {
            Self::WlPaste => "wl-paste",
            Self::Xclip => "xclip",
        }
    }

    fn read_args(self, target: &str) -> Vec<&str> {
        match self {
            Self::WlPaste => vec!["--no-newline", "--type", target],
            Self::Xclip => vec!["-selection", "clipboard", "-t", target, "-o"],
        }
    }

    async fn targets(self) -> Result<Vec<String>, AppError> {
        let args: &[&str] = match self {
            Self::WlPaste => &["--list-types"],
            Self::Xclip => &["-selection", "clipboard", "-t", "TARGETS", "-o"],
        };
        let Some(stdout) = run_tool(self.program(), args).await? else {
            return Ok(Vec::new());
        };
        Ok(String::from_utf8_lossy(&stdout)
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }

    async fn read(self, target: &str) -> Result<Option<Vec<u8>>, AppError> {
        run_tool(self.program(), &self.read_args(target)).await
    }
}

/// Linux 剪贴板：Wayland 用 `wl-paste`，X11 用 `xclip`
#[derive(Debug, Default)]
pub struct SystemClipboard {
    tool: Option<ClipboardTool>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let tool = ClipboardTool::detect();
        match tool {
            Some(tool) => log::debug!("使用剪贴板工具: {}", tool.program()),
            None => log::info!("未检测到图形会话，剪贴板图片不可用"),
        }
        Self { tool }
    }
}

impl ClipboardImageSource for SystemClipboard {
    async fn file_reference(&self) -> Result<Option<PathBuf>, AppError> {
        let Some(tool) = self.tool else {
            return Ok(None);
        };
        if !tool.targets().await?.iter().any(|t| t == URI_LIST_TARGET) {
            return Ok(None);
        }
        let Some(stdout) = tool.read(URI_LIST_TARGET).await? else {
            return Ok(None);
        };
        Ok(first_file_uri(&String::from_utf8_lossy(&stdout)))
    }

    async fn image_bytes(&self) -> Result<Option<Vec<u8>>, AppError> {
        let Some(tool) = self.tool else {
            return Ok(None);
        };
        let targets = tool.targets().await?;
        let Some(target) = pick_image_target(&targets) else {
            return Ok(None);
        };
        log::debug!("读取剪贴板图片类型: {}", target);
        tool.read(target).await
    }
}
