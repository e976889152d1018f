use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::submissions::entities::{AnswerValue, GradedAnswer, SubmissionStatus};

// 测评类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub enum AssessmentType {
    Quiz,
    Exam,
    Assignment,
    Project,
    Homework,
    Final, // 期末，每门课程最多一个未归档
}

impl AssessmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Quiz => "quiz",
            AssessmentType::Exam => "exam",
            AssessmentType::Assignment => "assignment",
            AssessmentType::Project => "project",
            AssessmentType::Homework => "homework",
            AssessmentType::Final => "final",
        }
    }
}

impl<'de> Deserialize<'de> for AssessmentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<AssessmentType>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的测评类型: '{s}'. 支持的类型: quiz, exam, assignment, project, homework, final"
            ))
        })
    }
}

impl std::fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssessmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiz" => Ok(AssessmentType::Quiz),
            "exam" => Ok(AssessmentType::Exam),
            "assignment" => Ok(AssessmentType::Assignment),
            "project" => Ok(AssessmentType::Project),
            "homework" => Ok(AssessmentType::Homework),
            "final" => Ok(AssessmentType::Final),
            _ => Err(format!("Invalid assessment type: {s}")),
        }
    }
}

// 题型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub enum QuestionType {
    MultipleChoice,
    MultipleChoiceMultiple,
    TrueFalse,
    ShortAnswer,
    FillInBlank,
    Numerical,
    Calculation,
    Mathematical,
    Essay,
    Code,
}

impl QuestionType {
    /// 是否可自动判分
    pub fn is_objective(&self) -> bool {
        matches!(
            self,
            QuestionType::MultipleChoice
                | QuestionType::MultipleChoiceMultiple
                | QuestionType::TrueFalse
                | QuestionType::ShortAnswer
                | QuestionType::FillInBlank
                | QuestionType::Numerical
        )
    }
}

// 题目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct Question {
    pub id: String,
    pub question_type: QuestionType,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// 学生视图中隐藏
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<AnswerValue>,
    pub points: f64,
    /// 数值题允许误差
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

// 测评实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct Assessment {
    pub id: i64,
    pub course_id: i64,
    pub created_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub assessment_type: AssessmentType,
    pub questions: Vec<Question>,
    pub total_points: f64,
    /// 及格百分比
    pub passing_score: f64,
    pub attempts: i32,
    /// 迟交扣分百分比
    pub late_penalty: f64,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub is_archived: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    /// 去掉答案与解析后的学生视图
    pub fn for_student(mut self) -> Self {
        for q in &mut self.questions {
            q.correct_answer = None;
            q.explanation = None;
        }
        self
    }
}

// 测评提交
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assessment.ts")]
pub struct AssessmentSubmission {
    pub id: i64,
    pub assessment_id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub attempt_number: i32,
    pub answers: Vec<GradedAnswer>,
    /// 扣分前得分
    pub raw_score: Option<f64>,
    /// 最终得分
    pub score: Option<f64>,
    pub status: SubmissionStatus,
    pub is_late: bool,
    pub feedback: Option<String>,
    pub time_spent: i64,
    pub graded_by: Option<i64>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_student_hides_answers() {
        let now = chrono::Utc::now();
        let assessment = Assessment {
            id: 1,
            course_id: 1,
            created_by: 1,
            title: "Quiz 1".into(),
            description: None,
            assessment_type: AssessmentType::Quiz,
            questions: vec![Question {
                id: "q1".into(),
                question_type: QuestionType::MultipleChoice,
                question: "2 + 2 = ?".into(),
                options: vec!["3".into(), "4".into()],
                correct_answer: Some(AnswerValue::Single("4".into())),
                points: 5.0,
                tolerance: None,
                explanation: Some("basic arithmetic".into()),
            }],
            total_points: 5.0,
            passing_score: 60.0,
            attempts: 1,
            late_penalty: 0.0,
            available_from: None,
            due_date: None,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };

        let view = assessment.for_student();
        assert!(view.questions[0].correct_answer.is_none());
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("correct_answer"));
        assert!(!json.contains("basic arithmetic"));
    }

    #[test]
    fn test_objective_question_types() {
        assert!(QuestionType::Numerical.is_objective());
        assert!(QuestionType::TrueFalse.is_objective());
        assert!(!QuestionType::Essay.is_objective());
        assert!(!QuestionType::Code.is_objective());
    }
}
