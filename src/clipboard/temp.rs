//! 私有临时目录
//!
//! 像素数据阶段写出的文件全部放在按用户区分的专用子目录中，
//! 文件名带有固定标记、进程号、时间与进程内序号，同一秒内多次粘贴也不会冲突。
//! 这里写出的文件一律标记为 `ImageOrigin::Extracted`，保存后由写入阶段删除。

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::ClipboardImage;
use crate::error::AppError;

/// 临时文件名标记
pub const TEMP_FILE_MARKER: &str = "clip_paste_";

/// 系统临时目录下的专用子目录名
const TEMP_DIR_NAME: &str = "terminal-image-paste";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct TempArea {
    dir: PathBuf,
}

impl TempArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 当前用户的临时目录
    ///
    /// 优先 `$XDG_RUNTIME_DIR/terminal-image-paste`（仅本用户可写），
    /// 否则为 `<系统临时目录>/terminal-image-paste-<用户名>`，
    /// 避免共享的 `/tmp` 下被其他用户抢先创建同名目录。
    pub fn system() -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .ok();
        Self::new(system_dir(
            std::env::var_os("XDG_RUNTIME_DIR"),
            &std::env::temp_dir(),
            user.as_deref(),
        ))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 分配一个新的临时文件路径（不创建文件）
    pub fn allocate(&self, extension: &str) -> PathBuf {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let file_name = format!(
            "{}{}_{:09}_{}_{}.{}",
            TEMP_FILE_MARKER,
            now.as_secs(),
            now.subsec_nanos(),
            std::process::id(),
            seq,
            extension
        );
        self.dir.join(file_name)
    }

    /// 把字节原样写入新分配的临时文件
    pub(crate) async fn write(
        &self,
        bytes: &[u8],
        extension: &str,
    ) -> Result<ClipboardImage, AppError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Acquisition(format!("创建临时目录 '{}' 失败: {}", self.dir.display(), e))
        })?;

        let path = self.allocate(extension);
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            AppError::Acquisition(format!("写入临时文件 '{}' 失败: {}", path.display(), e))
        })?;

        Ok(ClipboardImage::extracted(path))
    }
}

fn system_dir(runtime_dir: Option<OsString>, temp_dir: &Path, user: Option<&str>) -> PathBuf {
    if let Some(runtime) = runtime_dir.filter(|dir| !dir.is_empty()) {
        return PathBuf::from(runtime).join(TEMP_DIR_NAME);
    }

    let user: String = user
        .unwrap_or_default()
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if user.is_empty() {
        temp_dir.join(TEMP_DIR_NAME)
    } else {
        temp_dir.join(format!("{}-{}", TEMP_DIR_NAME, user))
    }
}
