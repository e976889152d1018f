//! 客观题自动判分
//!
//! 选择、判断、简答、填空按去空白、忽略大小写比较；数值题按误差比较。
//! 论述与编程等主观题留给人工评分。

use std::collections::{BTreeSet, HashMap};

use super::calculator::round_score;
use crate::models::assessments::entities::{Question, QuestionType};
use crate::models::submissions::entities::{AnswerValue, GradedAnswer, SubmittedAnswer};

/// 自动判分结果
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveScore {
    /// 自动判分得分
    pub earned: f64,
    /// 全部题目分值之和
    pub possible: f64,
    pub answers: Vec<GradedAnswer>,
    /// 存在已作答的主观题
    pub needs_manual_grading: bool,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn matches_text(expected: &AnswerValue, given: &AnswerValue) -> bool {
    let given = given.values();
    // 单值题只看第一个作答
    let Some(given) = given.first().map(|g| normalize(g)) else {
        return false;
    };
    expected.values().iter().any(|e| normalize(e) == given)
}

fn matches_set(expected: &AnswerValue, given: &AnswerValue) -> bool {
    let expected: BTreeSet<String> = expected.values().iter().map(|v| normalize(v)).collect();
    let given: BTreeSet<String> = given
        .values()
        .iter()
        .map(|v| normalize(v))
        .filter(|v| !v.is_empty())
        .collect();
    !expected.is_empty() && expected == given
}

fn matches_number(expected: &AnswerValue, given: &AnswerValue, tolerance: Option<f64>) -> bool {
    let Some(given) = given
        .values()
        .first()
        .and_then(|g| g.trim().parse::<f64>().ok())
    else {
        return false;
    };
    let tolerance = tolerance.filter(|t| t.is_finite()).unwrap_or(0.0).abs();
    expected
        .values()
        .iter()
        .filter_map(|e| e.trim().parse::<f64>().ok())
        .any(|e| (e - given).abs() <= tolerance + f64::EPSILON)
}

fn is_correct(question: &Question, expected: &AnswerValue, given: &AnswerValue) -> bool {
    match question.question_type {
        QuestionType::MultipleChoiceMultiple => matches_set(expected, given),
        QuestionType::Numerical => matches_number(expected, given, question.tolerance),
        _ => matches_text(expected, given),
    }
}

/// 对一次作答自动判分
///
/// 未作答的题目得 0 分且不出现在结果中；没有参考答案的客观题按主观题处理。
pub fn score_objective_answers(
    questions: &[Question],
    answers: &[SubmittedAnswer],
) -> ObjectiveScore {
    let by_question: HashMap<&str, &SubmittedAnswer> = answers
        .iter()
        .map(|a| (a.question_id.as_str(), a))
        .collect();

    let mut earned = 0.0;
    let mut possible = 0.0;
    let mut graded = Vec::with_capacity(answers.len());
    let mut needs_manual_grading = false;

    for question in questions {
        let points = question.points.max(0.0);
        possible += points;

        let Some(answer) = by_question.get(question.id.as_str()) else {
            continue;
        };

        match (&question.correct_answer, question.question_type.is_objective()) {
            (Some(expected), true) => {
                let correct = is_correct(question, expected, &answer.answer);
                let points_earned = if correct { points } else { 0.0 };
                earned += points_earned;
                graded.push(GradedAnswer {
                    question_id: question.id.clone(),
                    answer: answer.answer.clone(),
                    is_correct: Some(correct),
                    points_earned: Some(points_earned),
                    feedback: None,
                });
            }
            _ => {
                needs_manual_grading = true;
                graded.push(GradedAnswer {
                    question_id: question.id.clone(),
                    answer: answer.answer.clone(),
                    is_correct: None,
                    points_earned: None,
                    feedback: None,
                });
            }
        }
    }

    ObjectiveScore {
        earned: round_score(earned),
        possible: round_score(possible),
        answers: graded,
        needs_manual_grading,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, question_type: QuestionType, answer: Option<AnswerValue>) -> Question {
        Question {
            id: id.into(),
            question_type,
            question: format!("question {id}"),
            options: vec![],
            correct_answer: answer,
            points: 10.0,
            tolerance: None,
            explanation: None,
        }
    }

    fn single(v: &str) -> AnswerValue {
        AnswerValue::Single(v.into())
    }

    fn answer(id: &str, value: AnswerValue) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: id.into(),
            answer: value,
            time_spent: None,
        }
    }

    #[test]
    fn test_text_answers_case_insensitive() {
        let questions = vec![
            question("q1", QuestionType::MultipleChoice, Some(single("Paris"))),
            question("q2", QuestionType::TrueFalse, Some(single("true"))),
            question("q3", QuestionType::ShortAnswer, Some(single("photosynthesis"))),
        ];
        let answers = vec![
            answer("q1", single("  paris ")),
            answer("q2", single("False")),
            answer("q3", single("Photosynthesis")),
        ];

        let result = score_objective_answers(&questions, &answers);
        assert_eq!(result.earned, 20.0);
        assert_eq!(result.possible, 30.0);
        assert!(!result.needs_manual_grading);
        assert_eq!(result.answers[1].is_correct, Some(false));
        assert_eq!(result.answers[1].points_earned, Some(0.0));
    }

    #[test]
    fn test_fill_in_blank_accepts_alternatives() {
        let questions = vec![question(
            "q1",
            QuestionType::FillInBlank,
            Some(AnswerValue::Multiple(vec!["colour".into(), "color".into()])),
        )];
        let result = score_objective_answers(&questions, &[answer("q1", single("Color"))]);
        assert_eq!(result.earned, 10.0);
    }

    #[test]
    fn test_multiple_select_requires_exact_set() {
        let questions = vec![question(
            "q1",
            QuestionType::MultipleChoiceMultiple,
            Some(AnswerValue::Multiple(vec!["A".into(), "C".into()])),
        )];

        let exact = score_objective_answers(
            &questions,
            &[answer("q1", AnswerValue::Multiple(vec!["c".into(), "a".into()]))],
        );
        assert_eq!(exact.earned, 10.0);

        let partial = score_objective_answers(
            &questions,
            &[answer("q1", AnswerValue::Multiple(vec!["A".into()]))],
        );
        assert_eq!(partial.earned, 0.0);
    }

    #[test]
    fn test_numerical_tolerance() {
        let mut q = question("q1", QuestionType::Numerical, Some(single("3.14")));
        q.tolerance = Some(0.01);
        let questions = vec![q];

        assert_eq!(
            score_objective_answers(&questions, &[answer("q1", single("3.141"))]).earned,
            10.0
        );
        assert_eq!(
            score_objective_answers(&questions, &[answer("q1", single("3.2"))]).earned,
            0.0
        );
        assert_eq!(
            score_objective_answers(&questions, &[answer("q1", single("pi"))]).earned,
            0.0
        );
    }

    #[test]
    fn test_essay_needs_manual_grading() {
        let questions = vec![
            question("q1", QuestionType::MultipleChoice, Some(single("B"))),
            question("q2", QuestionType::Essay, None),
        ];
        let answers = vec![
            answer("q1", single("B")),
            answer("q2", single("A long answer")),
        ];

        let result = score_objective_answers(&questions, &answers);
        assert!(result.needs_manual_grading);
        assert_eq!(result.earned, 10.0);
        assert_eq!(result.answers[1].is_correct, None);
        assert_eq!(result.answers[1].points_earned, None);
    }

    #[test]
    fn test_unanswered_questions() {
        let questions = vec![
            question("q1", QuestionType::MultipleChoice, Some(single("B"))),
            question("q2", QuestionType::Essay, None),
        ];
        let result = score_objective_answers(&questions, &[]);
        assert_eq!(result.earned, 0.0);
        assert_eq!(result.possible, 20.0);
        assert!(result.answers.is_empty());
        assert!(!result.needs_manual_grading);
    }

    #[test]
    fn test_answers_to_unknown_questions_ignored() {
        let questions = vec![question("q1", QuestionType::TrueFalse, Some(single("true")))];
        let result = score_objective_answers(&questions, &[answer("zz", single("true"))]);
        assert_eq!(result.earned, 0.0);
        assert!(result.answers.is_empty());
    }
}
