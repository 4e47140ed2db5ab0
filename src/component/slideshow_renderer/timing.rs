use crate::error::{RenderError, RenderResult};

/// 每張圖片的顯示時長（整數秒）
///
/// 整數除法會捨去餘數，總顯示時間永遠不超過音訊長度，
/// 差距最多 `image_count - 1` 秒。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingPlan {
    pub audio_seconds: u64,
    pub image_count: usize,
    pub per_image_seconds: u64,
}

impl TimingPlan {
    pub fn compute(audio_seconds: u64, image_count: usize) -> RenderResult<Self> {
        if image_count == 0 {
            return Err(RenderError::degenerate("找不到任何圖片"));
        }
        if audio_seconds == 0 {
            return Err(RenderError::degenerate("音訊長度為 0 秒"));
        }

        Ok(Self {
            audio_seconds,
            image_count,
            per_image_seconds: audio_seconds / image_count as u64,
        })
    }

    #[must_use]
    pub const fn displayed_seconds(&self) -> u64 {
        self.per_image_seconds * self.image_count as u64
    }

    /// 總顯示時間減去音訊長度，恆為 0 或負數
    #[must_use]
    pub fn drift_seconds(&self) -> i64 {
        let shortfall = self.audio_seconds - self.displayed_seconds();
        -i64::try_from(shortfall).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncating_division() {
        let plan = TimingPlan::compute(100, 7).unwrap();
        assert_eq!(plan.per_image_seconds, 14);
        assert_eq!(plan.displayed_seconds(), 98);
        assert_eq!(plan.drift_seconds(), -2);
    }

    #[test]
    fn test_exact_division() {
        let plan = TimingPlan::compute(9, 3).unwrap();
        assert_eq!(plan.per_image_seconds, 3);
        assert_eq!(plan.drift_seconds(), 0);
    }

    #[test]
    fn test_zero_images_is_degenerate() {
        assert!(matches!(
            TimingPlan::compute(60, 0),
            Err(RenderError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_zero_audio_is_degenerate() {
        assert!(matches!(
            TimingPlan::compute(0, 5),
            Err(RenderError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_short_audio_yields_zero_per_image() {
        let plan = TimingPlan::compute(3, 10).unwrap();
        assert_eq!(plan.per_image_seconds, 0);
        assert_eq!(plan.drift_seconds(), -3);
    }

    #[test]
    fn test_huge_audio_duration_does_not_overflow() {
        let plan = TimingPlan::compute(u64::MAX, 1).unwrap();
        assert_eq!(plan.per_image_seconds, u64::MAX);
        assert_eq!(plan.displayed_seconds(), u64::MAX);
        assert_eq!(plan.drift_seconds(), 0);

        let plan = TimingPlan::compute(u64::MAX, 2).unwrap();
        assert_eq!(plan.drift_seconds(), -1);
    }

    #[test]
    fn test_drift_is_bounded() {
        for audio in 1..=120_u64 {
            for count in 1..=25_usize {
                let plan = TimingPlan::compute(audio, count).unwrap();
                let drift = plan.drift_seconds();
                assert!(drift <= 0, "audio={audio} count={count}");
                assert!(-drift <= count as i64 - 1, "audio={audio} count={count}");
            }
        }
    }
}
