use serde::Deserialize;
use ts_rs::TS;

// 评分请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct GradeSubmissionRequest {
    /// 原始得分（扣分前）。测评提交缺省时沿用自动判分结果
    pub score: Option<f64>,
    pub feedback: Option<String>,
    /// 由外部自动评分器给出的分数（仅作业）
    #[serde(default)]
    pub auto_graded: bool,
}
