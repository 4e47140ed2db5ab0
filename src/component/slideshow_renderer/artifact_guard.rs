use crate::tools::remove_file_if_exists;
use log::{error, info};
use std::path::{Path, PathBuf};

/// 追蹤本次執行產生的影片檔，流程失敗時於 drop 刪除
pub struct ArtifactGuard {
    tracked: Vec<PathBuf>,
    keep_on_failure: bool,
}

impl ArtifactGuard {
    #[must_use]
    pub const fn new(keep_on_failure: bool) -> Self {
        Self {
            tracked: Vec::new(),
            keep_on_failure,
        }
    }

    pub fn track(&mut self, path: &Path) {
        if !self.tracked.iter().any(|p| p == path) {
            self.tracked.push(path.to_path_buf());
        }
    }

    /// 檔案已完成，不再由 guard 處理
    pub fn release(&mut self, path: &Path) {
        self.tracked.retain(|p| p != path);
    }

    #[must_use]
    pub fn tracked(&self) -> &[PathBuf] {
        &self.tracked
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if self.keep_on_failure {
            return;
        }

        for path in self.tracked.drain(..) {
            match remove_file_if_exists(&path) {
                Ok(true) => info!("已刪除未完成的檔案: {}", path.display()),
                Ok(false) => {}
                Err(e) => error!("無法刪除未完成的檔案 {}: {e}", path.display()),
            }
        }
    }
}
