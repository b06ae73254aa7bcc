//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，粘贴流水线的每个阶段都返回
//! `Result<T, AppError>`，由编排层（`paste`）按分支决定是回退普通粘贴还是提示用户。
//!
//! - **读取阶段**：`Acquisition` —— 系统剪贴板工具无法调用或异常退出，
//!   控制流上等同于“没有图片”，但日志中可区分。
//! - **保存阶段**：`NoWorkspace` / `DirectoryCreate` / `Read` / `Write` ——
//!   已经检测到图片却无法落盘，必须让用户看到。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 保存阶段的错误携带出错路径与底层 `io::Error`，提示信息可直接展示给用户。

use std::path::PathBuf;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 剪贴板探测工具无法调用或异常退出
    #[error("剪贴板读取失败: {0}")]
    Acquisition(String),

    /// 没有可用的项目根目录
    #[error("没有打开的项目目录")]
    NoWorkspace,

    /// 创建保存目录失败
    #[error("创建目录 '{}' 失败: {source}", .path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 读取剪贴板图片文件失败
    #[error("读取图片 '{}' 失败: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 写入目标文件失败
    #[error("写入图片 '{}' 失败: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 输入模拟失败
    #[error("输入模拟失败: {0}")]
    Input(String),

    /// 设置文件不可用
    #[error("读取设置失败: {0}")]
    Settings(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn directory_error_message_names_path_and_cause() {
        let err = AppError::DirectoryCreate {
            path: PathBuf::from("/work/images"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/work/images"));
        assert!(msg.contains("permission denied"));
    }
}
