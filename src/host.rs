//! 宿主协作接口
//!
//! # 设计思路
//!
//! 粘贴流水线需要的外部能力（普通粘贴、向终端输入文本、提示用户、定位项目根目录）
//! 都抽象为小接口，由编排层通过 `PasteContext` 显式传入，不读取任何全局状态。
//! 单元测试用记录调用的假实现替换它们。
//!
//! # 实现思路
//!
//! - 桌面实现：`ConsoleNotifier` 输出到标准错误，`GitProjectRoots` 向上查找 `.git`。
//! - 终端输入与普通粘贴的键盘模拟在 `input` 模块（`EnigoTerminal`）。

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// 覆盖项目根目录查找的环境变量
pub const PROJECT_ROOT_ENV: &str = "TERMINAL_IMAGE_PASTE_ROOT";

/// 普通粘贴（把剪贴板文本粘贴到终端）
pub trait DefaultPaste: Send + Sync {
    fn paste(&self) -> Result<(), AppError>;
}

/// 终端文本输入
pub trait TerminalSink: Send + Sync {
    /// `execute = false` 时只输入不回车，用户可先检查再执行
    fn send_text(&self, text: &str, execute: bool) -> Result<(), AppError>;
}

/// 用户提示
pub trait Notifier: Send + Sync {
    fn show_info(&self, message: &str);
    fn show_error(&self, message: &str);
}

/// 项目根目录候选（使用第一个）
pub trait ProjectRoots: Send + Sync {
    fn roots(&self) -> Vec<PathBuf>;
}

/// 输出到标准错误的提示
///
/// 提示面向用户，不经过日志过滤；出错细节已由各阶段自行记录日志。
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

const ERROR_PREFIX: &str = "错误: ";

fn write_notice(out: &mut impl Write, prefix: &str, message: &str) {
    // stderr 关闭时无处可报，忽略
    let _ = writeln!(out, "{}{}", prefix, message);
}

impl Notifier for ConsoleNotifier {
    fn show_info(&self, message: &str) {
        write_notice(&mut std::io::stderr().lock(), "", message);
    }

    fn show_error(&self, message: &str) {
        write_notice(&mut std::io::stderr().lock(), ERROR_PREFIX, message);
    }
}

/// 按环境变量与 `.git` 目录定位项目根目录
#[derive(Debug, Clone)]
pub struct GitProjectRoots {
    configured: Option<PathBuf>,
    start: Option<PathBuf>,
}

impl GitProjectRoots {
    pub fn new(configured: Option<PathBuf>, start: Option<PathBuf>) -> Self {
        Self { configured, start }
    }

    /// 读取 `TERMINAL_IMAGE_PASTE_ROOT` 与当前工作目录
    pub fn from_env() -> Self {
        let configured = std::env::var_os(PROJECT_ROOT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let start = std::env::current_dir().ok();
        Self::new(configured, start)
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

impl ProjectRoots for GitProjectRoots {
    fn roots(&self) -> Vec<PathBuf> {
        let mut roots = Vec::new();
        if let Some(dir) = self.configured.as_ref().filter(|dir| dir.is_dir()) {
            roots.push(dir.clone());
        }
        if let Some(root) = self.start.as_deref().and_then(find_git_root) {
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }
}
