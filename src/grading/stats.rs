use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::calculator::effective_max_score;
use super::leaderboard::ScoredItem;
use crate::models::grades::responses::CourseStats;

/// 强项课程的平均分下限
const STRONG_SUBJECT_THRESHOLD: i64 = 80;
/// 待提升课程的平均分上限（不含）
const IMPROVEMENT_AREA_THRESHOLD: i64 = 65;

/// 成绩趋势
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum ImprovementTrend {
    Up,
    Down,
    Stable,
}

impl ImprovementTrend {
    pub fn from_average(average: i64) -> Self {
        if average > 75 {
            ImprovementTrend::Up
        } else if average < 65 {
            ImprovementTrend::Down
        } else {
            ImprovementTrend::Stable
        }
    }
}

pub struct StatsInput<'a> {
    pub total_assessments: i64,
    pub completed_assessments: i64,
    pub total_assignments: i64,
    pub completed_assignments: i64,
    /// 该学生已评分的条目
    pub graded_items: &'a [ScoredItem],
    pub course_titles: &'a HashMap<i64, String>,
    /// 来自排行榜，未上榜为 0
    pub current_rank: usize,
    pub total_students: usize,
}

fn ratio_percentage(total_score: f64, total_max: f64) -> i64 {
    if total_max > 0.0 {
        (total_score / total_max * 100.0).round() as i64
    } else {
        0
    }
}

/// 学生统计
pub fn course_stats(input: StatsInput<'_>) -> CourseStats {
    let mut total_score = 0.0;
    let mut total_max = 0.0;
    // BTreeMap 保证课程顺序稳定
    let mut per_course: BTreeMap<i64, (f64, f64)> = BTreeMap::new();

    for item in input.graded_items {
        let score = item.score.max(0.0);
        let max = effective_max_score(item.max_score);
        total_score += score;
        total_max += max;
        let course = per_course.entry(item.course_id).or_insert((0.0, 0.0));
        course.0 += score;
        course.1 += max;
    }

    let average_grade = ratio_percentage(total_score, total_max);

    let mut strong_subjects = Vec::new();
    let mut improvement_areas = Vec::new();
    for (course_id, (score, max)) in per_course {
        let average = ratio_percentage(score, max);
        let title = input
            .course_titles
            .get(&course_id)
            .cloned()
            .unwrap_or_else(|| format!("Course {course_id}"));
        if average >= STRONG_SUBJECT_THRESHOLD {
            strong_subjects.push(title);
        } else if average < IMPROVEMENT_AREA_THRESHOLD {
            improvement_areas.push(title);
        }
    }

    CourseStats {
        total_assessments: input.total_assessments,
        completed_assessments: input.completed_assessments,
        total_assignments: input.total_assignments,
        completed_assignments: input.completed_assignments,
        average_grade,
        current_rank: input.current_rank,
        total_students: input.total_students,
        improvement_trend: ImprovementTrend::from_average(average_grade),
        strong_subjects,
        improvement_areas,
    }
}
