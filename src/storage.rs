//! 项目内图片保存模块
//!
//! # 设计思路
//!
//! 把探测到的剪贴板图片复制进当前项目的保存目录（默认 `images/`），
//! 文件名由用户模板生成，扩展名跟随源文件。
//! 保存成功后，若源文件是探测阶段写出的临时文件则删除，用户自己的文件保持不动。
//!
//! # 实现思路
//!
//! - 没有项目根目录直接返回 `AppError::NoWorkspace`。
//! - `saveDir` 只保留普通路径片段，绝对路径与 `..` 不会让文件写到项目之外。
//! - 目录不存在时 `create_dir_all`，已存在不算错误。
//! - 先用 `create_new` 占住目标文件名，已被占用时追加 `-1`、`-2`……，从不覆盖已有文件。
//! - 数据写入同目录的隐藏 `.part` 文件再重命名到占位文件上；失败时连同占位文件一起删除，
//!   不会留下截断的目标文件。
//! - 临时文件删除失败只记录日志，不影响保存结果。

mod naming;

use std::path::{Component, Path, PathBuf};

use chrono::Utc;

use crate::clipboard::ClipboardImage;
use crate::error::AppError;
use crate::settings::NamingConfig;

pub use naming::{format_timestamp, FileNamePattern};

/// 同名文件的最大避让次数
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// 已保存到项目中的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    path: PathBuf,
    relative: String,
}

impl SavedImage {
    /// 绝对路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 相对项目根目录的路径，分隔符统一为 `/`
    pub fn relative(&self) -> &str {
        &self.relative
    }
}

/// 计算保存目录：`项目根目录 / saveDir`
///
/// 仅保留普通路径片段，`saveDir` 为空时直接使用项目根目录。
pub fn resolve_save_dir(project_root: &Path, save_dir: &str) -> PathBuf {
    let mut dir = project_root.to_path_buf();
    for component in Path::new(save_dir.trim()).components() {
        match component {
            Component::Normal(part) => dir.push(part),
            other => log::debug!("忽略保存目录中的路径片段: {:?}", other),
        }
    }
    dir
}

/// 源文件扩展名（小写），没有扩展名时为 `png`
pub fn source_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "png".to_string())
}

fn relative_display(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// 以 `create_new` 占住一个尚未被使用的文件名
///
/// 占位文件为空，随后由 `.part` 文件重命名覆盖；并发写入同名时只有一方能占到。
async fn reserve_name(
    dir: &Path,
    pattern: &FileNamePattern,
    extension: &str,
) -> Result<(PathBuf, String), AppError> {
    let now = Utc::now();

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let file_name = pattern.file_name(now, extension, attempt);
        let destination = dir.join(&file_name);
        let reserved = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&destination)
            .await;

        match reserved {
            Ok(_) => return Ok((destination, file_name)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(source) => {
                return Err(AppError::Write {
                    path: destination,
                    source,
                });
            }
        }
    }

    Err(AppError::Write {
        path: dir.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "没有可用的文件名"),
    })
}

/// 写入一个尚未被占用的文件名，返回最终路径
async fn write_unique(
    dir: &Path,
    pattern: &FileNamePattern,
    extension: &str,
    bytes: &[u8],
) -> Result<PathBuf, AppError> {
    let (destination, file_name) = reserve_name(dir, pattern, extension).await?;

    let partial = dir.join(format!(".{}.part", file_name));
    let written = async {
        tokio::fs::write(&partial, bytes).await?;
        tokio::fs::rename(&partial, &destination).await
    }
    .await;

    match written {
        Ok(()) => Ok(destination),
        Err(source) => {
            let _ = tokio::fs::remove_file(&partial).await;
            let _ = tokio::fs::remove_file(&destination).await;
            Err(AppError::Write {
                path: destination,
                source,
            })
        }
    }
}

/// 将剪贴板图片保存到项目中
///
/// # 参数
/// * `source` - 探测阶段得到的图片文件
/// * `project_root` - 当前项目根目录，`None` 表示没有打开项目
/// * `config` - 保存目录与文件名模板
///
/// # 返回
/// - `Ok(SavedImage)` — 保存后的绝对路径与相对路径
/// - `Err(NoWorkspace | DirectoryCreate | Read | Write)`
pub async fn save_to_workspace(
    source: &ClipboardImage,
    project_root: Option<&Path>,
    config: &NamingConfig,
) -> Result<SavedImage, AppError> {
    let root = project_root.ok_or(AppError::NoWorkspace)?;
    let root = std::path::absolute(root)?;

    let dir = resolve_save_dir(&root, &config.save_dir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| AppError::DirectoryCreate {
            path: dir.clone(),
            source,
        })?;

    let bytes = tokio::fs::read(source.path()).await.map_err(|e| AppError::Read {
        path: source.path().to_path_buf(),
        source: e,
    })?;

    let pattern = FileNamePattern::parse(&config.file_name_pattern);
    let extension = source_extension(source.path());
    let destination = write_unique(&dir, &pattern, &extension, &bytes).await?;
    log::info!("💾 图片已保存: {} ({} 字节)", destination.display(), bytes.len());

    if source.is_extracted() {
        match tokio::fs::remove_file(source.path()).await {
            Ok(()) => log::debug!("已清理临时文件: {}", source.path().display()),
            Err(e) => log::warn!("⚠️ 清理临时文件 {} 失败: {}", source.path().display(), e),
        }
    }

    let relative = relative_display(&destination, &root);
    Ok(SavedImage {
        path: destination,
        relative,
    })
}
