use crate::error::{RenderError, RenderResult};
use crate::tools::ProcessRunner;
use log::{debug, info};
use std::path::Path;
use std::process::Command;

/// 使用 ffprobe 取得音訊長度（秒，無條件捨去）
pub fn get_audio_duration(
    runner: &ProcessRunner,
    ffprobe_path: &str,
    audio_path: &Path,
) -> RenderResult<u64> {
    if !audio_path.is_file() {
        return Err(RenderError::probe(audio_path, "音訊檔案不存在"));
    }

    let mut command = Command::new(ffprobe_path);
    command
        .arg("-i")
        .arg(audio_path)
        .args(["-show_entries", "format=duration", "-v", "quiet", "-of", "csv=p=0"]);

    let output = runner
        .run(command)
        .map_err(|e| RenderError::probe(audio_path, e.to_string()))?;

    let raw = output.stdout.trim();
    let seconds = parse_duration_seconds(raw).ok_or_else(|| {
        RenderError::probe(audio_path, format!("無法解析 ffprobe 輸出: {raw:?}"))
    })?;

    debug!("ffprobe 原始長度: {raw}");
    info!("音訊長度: {seconds} 秒 ({})", audio_path.display());
    Ok(seconds)
}

fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.trunc() as u64)
}
