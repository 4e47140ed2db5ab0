use crate::config::RenderSettings;
use crate::error::{RenderError, RenderResult};
use crate::tools::{ImageManifest, remove_file_if_exists};
use log::{debug, info};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// 遞迴掃描圖片資料夾
///
/// 同一層依檔名排序，確保相同資料夾每次得到相同順序。
pub fn scan_images(directory: &Path, settings: &RenderSettings) -> RenderResult<ImageManifest> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(directory).to_path_buf();
            RenderError::traversal(path, e)
        })?;

        if entry.file_type().is_dir() || !settings.is_image_file(entry.path()) {
            continue;
        }

        let absolute =
            std::path::absolute(entry.path()).map_err(|e| RenderError::traversal(entry.path(), e))?;
        if absolute.to_str().is_none() {
            return Err(RenderError::traversal(
                absolute,
                io::Error::new(io::ErrorKind::InvalidData, "路徑不是有效的 UTF-8"),
            ));
        }

        debug!("找到圖片: {}", absolute.display());
        entries.push(absolute);
    }

    Ok(ImageManifest::new(entries))
}

/// 先刪除舊的清單檔，再以同一次掃描的結果寫出新清單
pub fn enumerate_images(
    images_dir: &Path,
    manifest_path: &Path,
    settings: &RenderSettings,
) -> RenderResult<ImageManifest> {
    if remove_file_if_exists(manifest_path).map_err(|e| RenderError::traversal(manifest_path, e))? {
        debug!("已刪除舊的圖片清單: {}", manifest_path.display());
    }

    let manifest = scan_images(images_dir, settings)?;
    manifest
        .write_to(manifest_path)
        .map_err(|e| RenderError::traversal(manifest_path, e))?;

    info!(
        "已寫入 {} 筆圖片路徑到 {}",
        manifest.len(),
        manifest_path.display()
    );
    Ok(manifest)
}
