use crate::tools::ProcessError;
use std::fmt;
use std::io;
use std::path::PathBuf;

pub type RenderResult<T> = Result<T, RenderError>;

/// 兩次編碼中的哪一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodePass {
    ImageSequence,
    AudioMerge,
}

impl fmt::Display for EncodePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageSequence => write!(f, "圖片序列轉影片"),
            Self::AudioMerge => write!(f, "合併音訊"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("無法走訪圖片資料夾 {}: {source}", .path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("無法取得音訊長度 {}: {reason}", .path.display())]
    Probe { path: PathBuf, reason: String },

    #[error("輸入不足以計算每張圖片的時長: {0}")]
    DegenerateInput(String),

    #[error("{pass}失敗: {source}")]
    Encode {
        pass: EncodePass,
        #[source]
        source: ProcessError,
    },

    #[error("無法刪除暫存影片 {}: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("設定錯誤: {0}")]
    Configuration(String),

    #[error("收到中斷信號，流程已停止")]
    Cancelled,
}

impl RenderError {
    pub fn traversal(path: impl Into<PathBuf>, source: impl Into<io::Error>) -> Self {
        Self::Traversal {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn probe(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateInput(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_error_names_pass() {
        let err = RenderError::Encode {
            pass: EncodePass::AudioMerge,
            source: ProcessError::Cancelled {
                program: "ffmpeg".to_string(),
            },
        };
        assert!(err.to_string().starts_with("合併音訊失敗"));
    }

    #[test]
    fn test_traversal_accepts_walkdir_style_io_error() {
        let err = RenderError::traversal(
            "/missing",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, RenderError::Traversal { .. }));
        assert!(err.to_string().contains("/missing"));
    }
}
