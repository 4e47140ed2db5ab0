use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 交給 ffmpeg concat demuxer 的圖片清單
///
/// 每一筆都是絕對路徑，順序與走訪順序相同。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageManifest {
    entries: Vec<PathBuf>,
}

impl ImageManifest {
    #[must_use]
    pub const fn new(entries: Vec<PathBuf>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// 轉成 concat 清單格式，每行 `file '<路徑>'`
    #[must_use]
    pub fn to_concat_list(&self) -> String {
        self.entries
            .iter()
            .map(|path| format!("file '{}'\n", escape_concat_path(&path.to_string_lossy())))
            .collect()
    }

    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_concat_list())
    }
}

/// concat 清單中單引號要寫成 `'\''`
fn escape_concat_path(raw: &str) -> String {
    raw.replace('\'', r"'\''")
}
