use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 提交状态：draft → submitted → graded → returned
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Graded,
    Returned,
}

impl SubmissionStatus {
    pub const DRAFT: &'static str = "draft";
    pub const SUBMITTED: &'static str = "submitted";
    pub const GRADED: &'static str = "graded";
    pub const RETURNED: &'static str = "returned";

    /// 计入排行榜与平均分的状态
    pub fn scored_statuses() -> &'static [SubmissionStatus] {
        &[SubmissionStatus::Graded, SubmissionStatus::Returned]
    }

    /// 成绩列表默认展示的状态
    pub fn visible_statuses() -> &'static [SubmissionStatus] {
        &[
            SubmissionStatus::Submitted,
            SubmissionStatus::Graded,
            SubmissionStatus::Returned,
        ]
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, SubmissionStatus::Graded | SubmissionStatus::Returned)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Draft => Self::DRAFT,
            SubmissionStatus::Submitted => Self::SUBMITTED,
            SubmissionStatus::Graded => Self::GRADED,
            SubmissionStatus::Returned => Self::RETURNED,
        }
    }
}

impl<'de> Deserialize<'de> for SubmissionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<SubmissionStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的提交状态: '{s}'. 支持的状态: draft, submitted, graded, returned"
            ))
        })
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::DRAFT => Ok(SubmissionStatus::Draft),
            Self::SUBMITTED => Ok(SubmissionStatus::Submitted),
            Self::GRADED => Ok(SubmissionStatus::Graded),
            Self::RETURNED => Ok(SubmissionStatus::Returned),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

// 答案值：单值或多选
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(untagged)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub enum AnswerValue {
    Single(String),
    Multiple(Vec<String>),
}

impl AnswerValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            AnswerValue::Single(v) => vec![v.as_str()],
            AnswerValue::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

// 学生提交的单题答案
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub answer: AnswerValue,
    #[serde(default)]
    pub time_spent: Option<i64>,
}

// 判分后的单题答案
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct GradedAnswer {
    pub question_id: String,
    pub answer: AnswerValue,
    /// 主观题在人工评分前为 None
    pub is_correct: Option<bool>,
    pub points_earned: Option<f64>,
    pub feedback: Option<String>,
}
