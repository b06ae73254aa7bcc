//! # 终端图片粘贴 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │        宿主（终端快捷键 / 编辑器命令 / 本仓库命令行）      │
//! │                                                          │
//! │  ConfigReader ── ProjectRoots ── TerminalSink ── Notifier │
//! │                       DefaultPaste                       │
//! └───────────────────────────┬──────────────────────────────┘
//!                             ↕ PasteContext（显式传入）
//! ┌───────────────────────────┼──────────────────────────────┐
//! │                           ↕                              │
//! │  ┌─ paste ─────────── 编排：启用检查 → 探测 → 保存 → 输入  │
//! │  │                                                       │
//! │  ├─ clipboard ─────── 两阶段探测（文件引用 / 像素数据）    │
//! │  │   └─ platform      osascript · wl-paste/xclip · Win32  │
//! │  │                                                       │
//! │  ├─ storage ───────── 复制进项目 + 文件名模板 + 临时清理   │
//! │  ├─ settings ──────── enabled / saveDir / fileNamePattern │
//! │  ├─ host / input ──── 宿主接口与桌面实现（enigo）          │
//! │  └─ error ─────────── AppError (统一错误类型)             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，区分探测失败与保存失败 |
//! | [`clipboard`] | 剪贴板图片探测、私有临时目录、平台实现 |
//! | [`storage`] | 保存到项目目录、文件名模板、临时文件清理 |
//! | [`settings`] | 配置读取接口与 JSON 设置文件 |
//! | [`host`] | 宿主协作接口、项目根目录定位、控制台提示 |
//! | [`input`] | 键盘模拟：终端文本输入与普通粘贴 |
//! | [`paste`] | 粘贴命令编排与回退策略 |

pub mod clipboard;
pub mod error;
pub mod host;
pub mod input;
pub mod paste;
pub mod settings;
pub mod storage;
