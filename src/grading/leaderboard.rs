//! 排行榜聚合
//!
//! 输入为已按状态过滤的计分条目（测评与作业混合），按学生分组汇总、
//! 计算连续达标与进步幅度、授予徽章、排序并截断。

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::calculator::{LetterGrade, effective_max_score, percentage, round_score};
use super::window::TimeWindow;
use crate::models::grades::responses::{LeaderboardEntry, LeaderboardItemDetail};
use crate::models::users::entities::UserSummary;

/// 条目来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum ItemKind {
    Assessment,
    Assignment,
}

/// 徽章
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum Badge {
    #[serde(rename = "Top Performer")]
    TopPerformer,
    #[serde(rename = "Excellent Student")]
    ExcellentStudent,
    #[serde(rename = "Consistent Performer")]
    ConsistentPerformer,
    #[serde(rename = "Most Improved")]
    MostImproved,
    #[serde(rename = "Assessment Master")]
    AssessmentMaster,
    #[serde(rename = "Assignment Expert")]
    AssignmentExpert,
}

impl Badge {
    /// 按平均分、连续达标、进步幅度与完成数量授予徽章
    pub fn award(
        average_score: i64,
        streak: usize,
        improvement: i64,
        completed_assessments: usize,
        completed_assignments: usize,
    ) -> Vec<Badge> {
        let mut badges = Vec::new();
        if average_score >= 95 {
            badges.push(Badge::TopPerformer);
        }
        if average_score >= 90 {
            badges.push(Badge::ExcellentStudent);
        }
        if streak >= 5 {
            badges.push(Badge::ConsistentPerformer);
        }
        if improvement > 10 {
            badges.push(Badge::MostImproved);
        }
        if completed_assessments >= 10 {
            badges.push(Badge::AssessmentMaster);
        }
        if completed_assignments >= 10 {
            badges.push(Badge::AssignmentExpert);
        }
        badges
    }
}

/// 一条计分记录
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem {
    pub student_id: i64,
    pub kind: ItemKind,
    pub item_id: i64,
    pub title: String,
    pub course_id: i64,
    /// 最终得分（已扣分）
    pub score: f64,
    pub max_score: Option<f64>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ScoredItem {
    pub fn percentage(&self) -> i64 {
        percentage(self.score, self.max_score)
    }

    fn detail(&self) -> LeaderboardItemDetail {
        let pct = self.percentage();
        LeaderboardItemDetail {
            item_type: self.kind,
            item_id: self.item_id,
            title: self.title.clone(),
            course_id: self.course_id,
            score: round_score(self.score),
            max_score: effective_max_score(self.max_score),
            percentage: pct,
            letter_grade: LetterGrade::from_percentage(pct),
            submitted_at: self.submitted_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeaderboardOptions {
    pub limit: usize,
    /// 连续达标的及格线
    pub passing_percentage: i64,
    pub include_details: bool,
    pub window: TimeWindow,
}

impl Default for LeaderboardOptions {
    fn default() -> Self {
        Self {
            limit: 50,
            passing_percentage: 60,
            include_details: false,
            window: TimeWindow::All,
        }
    }
}

/// 排序中间结果
struct Ranked {
    entry: LeaderboardEntry,
    total_score: f64,
}

/// 平均分降序，其后总分降序、姓名升序、学生 ID 升序
fn compare_ranked(a: &Ranked, b: &Ranked) -> Ordering {
    b.entry
        .average_score
        .cmp(&a.entry.average_score)
        .then_with(|| b.total_score.total_cmp(&a.total_score))
        .then_with(|| a.entry.student.name.cmp(&b.entry.student.name))
        .then_with(|| a.entry.student.id.cmp(&b.entry.student.id))
}

/// 单项榜以原始得分为主序，其后姓名升序、学生 ID 升序
fn compare_item_ranked(a: &Ranked, b: &Ranked) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| a.entry.student.name.cmp(&b.entry.student.name))
        .then_with(|| a.entry.student.id.cmp(&b.entry.student.id))
}

/// 排序、编排名次（截断前）并截断
fn finish(
    mut ranked: Vec<Ranked>,
    limit: usize,
    compare: fn(&Ranked, &Ranked) -> Ordering,
) -> (Vec<LeaderboardEntry>, usize) {
    ranked.sort_by(compare);
    let total = ranked.len();
    let entries = ranked
        .into_iter()
        .enumerate()
        .take(limit)
        .map(|(idx, mut r)| {
            r.entry.rank = idx + 1;
            r.entry
        })
        .collect();
    (entries, total)
}

/// 按提交时间升序排列，缺失提交时间的条目排在最前
fn chronological(items: &mut [&ScoredItem]) {
    items.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
}

/// 从最近一次开始连续达标的条目数
fn streak(items: &[&ScoredItem], passing_percentage: i64) -> usize {
    items
        .iter()
        .rev()
        .take_while(|item| item.percentage() >= passing_percentage)
        .count()
}

/// 最近一次与最早一次的百分比之差，不足两条时为 0
fn improvement(items: &[&ScoredItem]) -> i64 {
    match (items.first(), items.last()) {
        (Some(first), Some(last)) if items.len() >= 2 => last.percentage() - first.percentage(),
        _ => 0,
    }
}

/// 综合排行榜
///
/// 只有 `students` 中的学生可以上榜；窗口外或不属于这些学生的条目被忽略，
/// 没有任何条目的学生不上榜。返回截断后的条目与截断前的上榜人数。
pub fn build_leaderboard(
    students: &[UserSummary],
    items: &[ScoredItem],
    options: &LeaderboardOptions,
    now: DateTime<Utc>,
) -> (Vec<LeaderboardEntry>, usize) {
    let mut by_student: HashMap<i64, Vec<&ScoredItem>> = HashMap::new();
    for item in items {
        if options.window.contains(now, item.submitted_at) {
            by_student.entry(item.student_id).or_default().push(item);
        }
    }

    let mut ranked = Vec::with_capacity(by_student.len());
    for student in students {
        let Some(student_items) = by_student.get_mut(&student.id) else {
            continue;
        };
        if student_items.is_empty() {
            continue;
        }
        chronological(student_items);

        let total_score: f64 = student_items.iter().map(|i| i.score.max(0.0)).sum();
        let total_max: f64 = student_items
            .iter()
            .map(|i| effective_max_score(i.max_score))
            .sum();
        let average_score = if total_max > 0.0 {
            (total_score / total_max * 100.0).round() as i64
        } else {
            0
        };
        let completed_assessments = student_items
            .iter()
            .filter(|i| i.kind == ItemKind::Assessment)
            .count();
        let completed_assignments = student_items.len() - completed_assessments;
        let streak = streak(student_items, options.passing_percentage);
        let improvement = improvement(student_items);
        let badges = Badge::award(
            average_score,
            streak,
            improvement,
            completed_assessments,
            completed_assignments,
        );
        let details = options
            .include_details
            .then(|| student_items.iter().map(|i| i.detail()).collect());

        ranked.push(Ranked {
            entry: LeaderboardEntry {
                rank: 0,
                student: student.clone(),
                total_points: round_score(total_score),
                average_score,
                completed_assessments,
                completed_assignments,
                streak,
                improvement,
                badges,
                details,
            },
            total_score,
        });
    }

    finish(ranked, options.limit, compare_ranked)
}

/// 单个测评或作业的排行榜
///
/// 每个学生取最高得分的一次；按得分降序，其后姓名升序、学生 ID 升序。
pub fn build_item_leaderboard(
    students: &[UserSummary],
    items: &[ScoredItem],
    options: &LeaderboardOptions,
    now: DateTime<Utc>,
) -> (Vec<LeaderboardEntry>, usize) {
    let mut best: HashMap<i64, &ScoredItem> = HashMap::new();
    for item in items {
        if !options.window.contains(now, item.submitted_at) {
            continue;
        }
        best.entry(item.student_id)
            .and_modify(|current| {
                if item.score > current.score {
                    *current = item;
                }
            })
            .or_insert(item);
    }

    let mut ranked = Vec::with_capacity(best.len());
    for student in students {
        let Some(item) = best.get(&student.id) else {
            continue;
        };
        let pct = item.percentage();
        let (completed_assessments, completed_assignments) = match item.kind {
            ItemKind::Assessment => (1, 0),
            ItemKind::Assignment => (0, 1),
        };
        ranked.push(Ranked {
            entry: LeaderboardEntry {
                rank: 0,
                student: student.clone(),
                total_points: round_score(item.score.max(0.0)),
                average_score: pct,
                completed_assessments,
                completed_assignments,
                streak: 0,
                improvement: 0,
                badges: Badge::award(pct, 0, 0, completed_assessments, completed_assignments),
                details: options.include_details.then(|| vec![item.detail()]),
            },
            total_score: item.score.max(0.0),
        });
    }

    finish(ranked, options.limit, compare_item_ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn student(id: i64, name: &str) -> UserSummary {
        UserSummary {
            id,
            username: name.to_lowercase(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            avatar_url: None,
        }
    }

    fn item(
        student_id: i64,
        kind: ItemKind,
        item_id: i64,
        score: f64,
        max: f64,
        days_ago: i64,
    ) -> ScoredItem {
        ScoredItem {
            student_id,
            kind,
            item_id,
            title: format!("item {item_id}"),
            course_id: 1,
            score,
            max_score: Some(max),
            submitted_at: Some(Utc::now() - Duration::days(days_ago)),
        }
    }

    #[test]
    fn test_average_and_ranking() {
        let students = vec![student(1, "Alice"), student(2, "Bob"), student(3, "Carol")];
        let items = vec![
            item(1, ItemKind::Assessment, 10, 45.0, 50.0, 5),
            item(1, ItemKind::Assignment, 20, 80.0, 100.0, 4),
            item(2, ItemKind::Assessment, 10, 50.0, 50.0, 5),
            item(2, ItemKind::Assignment, 20, 95.0, 100.0, 3),
        ];

        let (entries, total) =
            build_leaderboard(&students, &items, &LeaderboardOptions::default(), Utc::now());
        assert_eq!(total, 2);
        assert_eq!(entries.len(), 2);

        // Bob: 145/150 = 97，Alice: 125/150 = 83
        assert_eq!(entries[0].student.id, 2);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].average_score, 97);
        assert_eq!(entries[0].total_points, 145.0);
        assert_eq!(entries[1].student.id, 1);
        assert_eq!(entries[1].rank, 2);
        assert_eq!(entries[1].average_score, 83);
        assert_eq!(entries[1].completed_assessments, 1);
        assert_eq!(entries[1].completed_assignments, 1);
        // Carol 没有条目，不上榜
        assert!(entries.iter().all(|e| e.student.id != 3));
    }

    #[test]
    fn test_ties_break_by_total_then_name() {
        let students = vec![student(1, "Zed"), student(2, "Amy"), student(3, "Bea")];
        let items = vec![
            // 平均分都是 80，Zed 总分更高
            item(1, ItemKind::Assessment, 10, 160.0, 200.0, 1),
            item(2, ItemKind::Assessment, 10, 80.0, 100.0, 1),
            item(3, ItemKind::Assessment, 10, 80.0, 100.0, 1),
        ];

        let (entries, _) =
            build_leaderboard(&students, &items, &LeaderboardOptions::default(), Utc::now());
        let order: Vec<i64> = entries.iter().map(|e| e.student.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(
            entries.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_limit_applied_after_ranking() {
        let students: Vec<_> = (1..=5).map(|i| student(i, &format!("S{i}"))).collect();
        let items: Vec<_> = (1..=5)
            .map(|i| item(i, ItemKind::Assignment, 1, (i * 10) as f64, 100.0, 1))
            .collect();
        let options = LeaderboardOptions {
            limit: 2,
            ..Default::default()
        };

        let (entries, total) = build_leaderboard(&students, &items, &options, Utc::now());
        assert_eq!(total, 5);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].student.id, 5);
        assert_eq!(entries[1].student.id, 4);
        assert_eq!(entries[1].rank, 2);
    }

    #[test]
    fn test_missing_max_score_defaults_to_100() {
        let students = vec![student(1, "Alice")];
        let mut it = item(1, ItemKind::Assignment, 1, 70.0, 100.0, 1);
        it.max_score = None;
        let (entries, _) =
            build_leaderboard(&students, &[it], &LeaderboardOptions::default(), Utc::now());
        assert_eq!(entries[0].average_score, 70);
    }

    #[test]
    fn test_time_window_filters_items() {
        let students = vec![student(1, "Alice"), student(2, "Bob")];
        let items = vec![
            item(1, ItemKind::Assessment, 1, 90.0, 100.0, 2),
            item(1, ItemKind::Assessment, 2, 10.0, 100.0, 20),
            item(2, ItemKind::Assessment, 1, 100.0, 100.0, 40),
        ];
        let options = LeaderboardOptions {
            window: TimeWindow::Week,
            ..Default::default()
        };

        let (entries, total) = build_leaderboard(&students, &items, &options, Utc::now());
        assert_eq!(total, 1);
        assert_eq!(entries[0].student.id, 1);
        assert_eq!(entries[0].average_score, 90);
        assert_eq!(entries[0].completed_assessments, 1);
    }

    #[test]
    fn test_streak_and_improvement() {
        let students = vec![student(1, "Alice")];
        // 时间顺序：40, 55, 70, 80, 90, 95, 100
        let items: Vec<_> = [40.0, 55.0, 70.0, 80.0, 90.0, 95.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, score)| item(1, ItemKind::Assessment, i as i64, *score, 100.0, 10 - i as i64))
            .collect();

        let (entries, _) =
            build_leaderboard(&students, &items, &LeaderboardOptions::default(), Utc::now());
        let entry = &entries[0];
        assert_eq!(entry.streak, 5);
        assert_eq!(entry.improvement, 60);
        assert!(entry.badges.contains(&Badge::ConsistentPerformer));
        assert!(entry.badges.contains(&Badge::MostImproved));
        assert!(!entry.badges.contains(&Badge::ExcellentStudent));
    }

    #[test]
    fn test_streak_broken_by_recent_failure() {
        let students = vec![student(1, "Alice")];
        let items = vec![
            item(1, ItemKind::Assessment, 1, 90.0, 100.0, 3),
            item(1, ItemKind::Assessment, 2, 90.0, 100.0, 2),
            item(1, ItemKind::Assessment, 3, 50.0, 100.0, 1),
        ];
        let (entries, _) =
            build_leaderboard(&students, &items, &LeaderboardOptions::default(), Utc::now());
        assert_eq!(entries[0].streak, 0);
        assert_eq!(entries[0].improvement, -40);
    }

    #[test]
    fn test_single_item_has_no_improvement() {
        let students = vec![student(1, "Alice")];
        let items = vec![item(1, ItemKind::Assessment, 1, 100.0, 100.0, 1)];
        let (entries, _) =
            build_leaderboard(&students, &items, &LeaderboardOptions::default(), Utc::now());
        assert_eq!(entries[0].improvement, 0);
        assert_eq!(entries[0].streak, 1);
        assert_eq!(
            entries[0].badges,
            vec![Badge::TopPerformer, Badge::ExcellentStudent]
        );
    }

    #[test]
    fn test_badges() {
        assert_eq!(
            Badge::award(96, 5, 11, 10, 10),
            vec![
                Badge::TopPerformer,
                Badge::ExcellentStudent,
                Badge::ConsistentPerformer,
                Badge::MostImproved,
                Badge::AssessmentMaster,
                Badge::AssignmentExpert,
            ]
        );
        assert_eq!(Badge::award(92, 4, 10, 9, 9), vec![Badge::ExcellentStudent]);
        assert!(Badge::award(89, 0, 0, 0, 0).is_empty());
        assert_eq!(
            serde_json::to_string(&Badge::TopPerformer).unwrap(),
            "\"Top Performer\""
        );
    }

    #[test]
    fn test_details() {
        let students = vec![student(1, "Alice")];
        let items = vec![item(1, ItemKind::Assignment, 7, 18.0, 20.0, 1)];
        let options = LeaderboardOptions {
            include_details: true,
            ..Default::default()
        };
        let (entries, _) = build_leaderboard(&students, &items, &options, Utc::now());
        let details = entries[0].details.as_ref().unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].item_id, 7);
        assert_eq!(details[0].percentage, 90);
        assert_eq!(details[0].letter_grade, LetterGrade::AMinus);

        let (entries, _) =
            build_leaderboard(&students, &items, &LeaderboardOptions::default(), Utc::now());
        assert!(entries[0].details.is_none());
    }

    #[test]
    fn test_unknown_students_ignored() {
        let students = vec![student(1, "Alice")];
        let items = vec![
            item(1, ItemKind::Assessment, 1, 60.0, 100.0, 1),
            item(99, ItemKind::Assessment, 1, 100.0, 100.0, 1),
        ];
        let (entries, total) =
            build_leaderboard(&students, &items, &LeaderboardOptions::default(), Utc::now());
        assert_eq!(total, 1);
        assert_eq!(entries[0].student.id, 1);
    }

    #[test]
    fn test_item_leaderboard_ranks_by_score() {
        let students = vec![student(1, "Alice"), student(2, "Bob"), student(3, "Carol")];
        let items = vec![
            item(1, ItemKind::Assessment, 5, 30.0, 50.0, 2),
            // Alice 第二次尝试得分更高
            item(1, ItemKind::Assessment, 5, 42.0, 50.0, 1),
            item(2, ItemKind::Assessment, 5, 45.0, 50.0, 1),
            item(3, ItemKind::Assessment, 5, 42.0, 50.0, 1),
        ];

        let (entries, total) =
            build_item_leaderboard(&students, &items, &LeaderboardOptions::default(), Utc::now());
        assert_eq!(total, 3);
        let order: Vec<i64> = entries.iter().map(|e| e.student.id).collect();
        assert_eq!(order, vec![2, 1, 3]);
        assert_eq!(entries[0].average_score, 90);
        assert_eq!(entries[0].total_points, 45.0);
        assert_eq!(entries[1].total_points, 42.0);
        assert_eq!(entries[1].streak, 0);
        assert_eq!(entries[1].improvement, 0);
        assert_eq!(entries[1].completed_assessments, 1);
    }

    #[test]
    fn test_item_leaderboard_truncates_after_ranking() {
        let students = vec![student(1, "Alice"), student(2, "Bob"), student(3, "Carol")];
        let items = vec![
            item(1, ItemKind::Assignment, 8, 70.0, 100.0, 1),
            item(2, ItemKind::Assignment, 8, 90.0, 100.0, 1),
            item(3, ItemKind::Assignment, 8, 80.0, 100.0, 1),
        ];
        let options = LeaderboardOptions {
            limit: 2,
            ..Default::default()
        };

        let (entries, total) = build_item_leaderboard(&students, &items, &options, Utc::now());
        assert_eq!(total, 3);
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].student.id, entries[0].rank), (2, 1));
        assert_eq!((entries[1].student.id, entries[1].rank), (3, 2));
        assert_eq!(entries[0].completed_assignments, 1);
    }

    #[test]
    fn test_empty_input() {
        let (entries, total) = build_leaderboard(
            &[student(1, "Alice")],
            &[],
            &LeaderboardOptions::default(),
            Utc::now(),
        );
        assert!(entries.is_empty());
        assert_eq!(total, 0);
    }
}
