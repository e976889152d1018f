use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 未设置满分时的默认满分
pub const DEFAULT_MAX_SCORE: f64 = 100.0;

/// 有效满分：缺失、非正数或非有限值时回退到默认满分
pub fn effective_max_score(max_score: Option<f64>) -> f64 {
    match max_score {
        Some(max) if max.is_finite() && max > 0.0 => max,
        _ => DEFAULT_MAX_SCORE,
    }
}

/// 得分百分比，四舍五入到整数
pub fn percentage(score: f64, max_score: Option<f64>) -> i64 {
    let max = effective_max_score(max_score);
    let score = if score.is_finite() { score.max(0.0) } else { 0.0 };
    (score / max * 100.0).round() as i64
}

/// 保留两位小数
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// 迟交扣分
///
/// `penalty_percent` 会被限制在 `[0, 100]`。调用方必须始终传入原始得分，
/// 重复评分时不会叠加扣分。
pub fn apply_late_penalty(raw_score: f64, penalty_percent: f64, is_late: bool) -> f64 {
    if !is_late || !penalty_percent.is_finite() {
        return round_score(raw_score);
    }
    let penalty = penalty_percent.clamp(0.0, 100.0);
    round_score(raw_score * (1.0 - penalty / 100.0))
}

/// 字母等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D-")]
    DMinus,
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    /// 由（已取整的）百分比换算等级
    pub fn from_percentage(percentage: i64) -> Self {
        match percentage {
            p if p >= 97 => LetterGrade::APlus,
            p if p >= 93 => LetterGrade::A,
            p if p >= 90 => LetterGrade::AMinus,
            p if p >= 87 => LetterGrade::BPlus,
            p if p >= 83 => LetterGrade::B,
            p if p >= 80 => LetterGrade::BMinus,
            p if p >= 77 => LetterGrade::CPlus,
            p if p >= 73 => LetterGrade::C,
            p if p >= 70 => LetterGrade::CMinus,
            p if p >= 67 => LetterGrade::DPlus,
            p if p >= 63 => LetterGrade::D,
            p if p >= 60 => LetterGrade::DMinus,
            _ => LetterGrade::F,
        }
    }

    /// 由得分与满分换算等级
    pub fn from_score(score: f64, max_score: Option<f64>) -> Self {
        Self::from_percentage(percentage(score, max_score))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::DMinus => "D-",
            LetterGrade::F => "F",
        }
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(45.0, Some(50.0)), 90);
        assert_eq!(percentage(2.0, Some(3.0)), 67);
        assert_eq!(percentage(1.0, Some(8.0)), 13); // 12.5 向上取整
        assert_eq!(percentage(0.0, Some(10.0)), 0);
    }

    #[test]
    fn test_percentage_default_max() {
        assert_eq!(percentage(85.0, None), 85);
        assert_eq!(percentage(85.0, Some(0.0)), 85);
        assert_eq!(percentage(85.0, Some(-20.0)), 85);
        assert_eq!(percentage(85.0, Some(f64::NAN)), 85);
    }

    #[test]
    fn test_percentage_negative_score() {
        assert_eq!(percentage(-5.0, Some(10.0)), 0);
        assert_eq!(percentage(f64::INFINITY, Some(10.0)), 0);
    }

    #[test]
    fn test_letter_grade_boundaries() {
        let cases = [
            (100, LetterGrade::APlus),
            (97, LetterGrade::APlus),
            (96, LetterGrade::A),
            (93, LetterGrade::A),
            (92, LetterGrade::AMinus),
            (90, LetterGrade::AMinus),
            (89, LetterGrade::BPlus),
            (87, LetterGrade::BPlus),
            (86, LetterGrade::B),
            (83, LetterGrade::B),
            (82, LetterGrade::BMinus),
            (80, LetterGrade::BMinus),
            (79, LetterGrade::CPlus),
            (77, LetterGrade::CPlus),
            (76, LetterGrade::C),
            (73, LetterGrade::C),
            (72, LetterGrade::CMinus),
            (70, LetterGrade::CMinus),
            (69, LetterGrade::DPlus),
            (67, LetterGrade::DPlus),
            (66, LetterGrade::D),
            (63, LetterGrade::D),
            (62, LetterGrade::DMinus),
            (60, LetterGrade::DMinus),
            (59, LetterGrade::F),
            (0, LetterGrade::F),
        ];
        for (p, expected) in cases {
            assert_eq!(LetterGrade::from_percentage(p), expected, "percentage {p}");
        }
    }

    #[test]
    fn test_letter_uses_rounded_percentage() {
        // 89.5% 取整为 90，应为 A- 而不是 B+
        assert_eq!(LetterGrade::from_score(89.5, Some(100.0)), LetterGrade::AMinus);
        assert_eq!(LetterGrade::from_score(179.0, Some(200.0)), LetterGrade::AMinus);
    }

    #[test]
    fn test_letter_serialization() {
        assert_eq!(serde_json::to_string(&LetterGrade::APlus).unwrap(), "\"A+\"");
        assert_eq!(serde_json::to_string(&LetterGrade::DMinus).unwrap(), "\"D-\"");
        assert_eq!(LetterGrade::BMinus.to_string(), "B-");
    }

    #[test]
    fn test_late_penalty() {
        assert_eq!(apply_late_penalty(80.0, 10.0, true), 72.0);
        assert_eq!(apply_late_penalty(80.0, 10.0, false), 80.0);
        assert_eq!(apply_late_penalty(80.0, 150.0, true), 0.0);
        assert_eq!(apply_late_penalty(80.0, -5.0, true), 80.0);
        assert_eq!(apply_late_penalty(33.333, 0.0, true), 33.33);
    }

    #[test]
    fn test_late_penalty_not_compounded() {
        // 重复评分时始终以原始分为输入
        let raw = 90.0;
        let first = apply_late_penalty(raw, 20.0, true);
        let regraded = apply_late_penalty(raw, 20.0, true);
        assert_eq!(first, 72.0);
        assert_eq!(first, regraded);
    }
}
