//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides utilities for file system operations,
//! such as resetting artifact directories, listing result files and
//! replacing files atomically.
//!
//! 此模块提供文件系统操作的实用功能，
//! 如重置产物目录、列出结果文件和原子替换文件。

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};

/// Suffix of per-test result files / 单个测试结果文件的后缀
pub const RESULT_FILE_SUFFIX: &str = "-result.json";

/// Erases `path` if it exists and recreates it empty, parents included.
///
/// # Arguments
/// * `path` - Directory to reset
pub fn reset_dir(path: &Path) -> Result<()> {
    fs_extra::dir::create_all(path, true)
        .with_context(|| format!("Failed to reset directory: {}", path.display()))
}

/// Removes a directory tree. A missing directory is not an error.
pub fn remove_dir(path: &Path) -> Result<()> {
    fs_extra::dir::remove(path)
        .with_context(|| format!("Failed to remove directory: {}", path.display()))
}

/// Lists `*-result.json` files in `dir`, sorted by path.
///
/// # Returns
/// An empty list if the directory does not exist.
pub fn result_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    list_files(dir, |name| name.ends_with(RESULT_FILE_SUFFIX))
}

/// Counts every `*.json` file directly inside `dir`.
pub fn count_json_files(dir: &Path) -> usize {
    list_files(dir, |name| name.ends_with(".json"))
        .map(|files| files.len())
        .unwrap_or(0)
}

fn list_files(dir: &Path, keep: impl Fn(&str) -> bool) -> io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(&keep)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Writes `contents` to `path` by persisting a temporary file next to it,
/// so readers never observe a half-written file.
///
/// 通过在同目录下持久化临时文件来写入 `path`，读者不会看到写了一半的文件。
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let mut file = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    file.write_all(contents)?;
    file.persist(path)
        .with_context(|| format!("Failed to replace file: {}", path.display()))?;
    Ok(())
}

/// Finds the first localhost port in `[start, start + 100)` that can be bound.
/// Falls back to `start` when none is free.
///
/// 在 `[start, start + 100)` 范围内查找第一个可绑定的本地端口；都不可用时回退到 `start`。
pub fn find_available_port(start: u16) -> u16 {
    (start..start.saturating_add(100))
        .find(|port| TcpListener::bind(("127.0.0.1", *port)).is_ok())
        .unwrap_or(start)
}
