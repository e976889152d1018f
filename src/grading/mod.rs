//! 评分核心
//!
//! 无 I/O 的纯函数：百分比与等级换算、迟交扣分、客观题自动判分、
//! 时间窗口过滤、排行榜聚合以及学生统计。服务层负责取数，这里只做计算。

pub mod calculator;
pub mod leaderboard;
pub mod objective;
pub mod stats;
pub mod window;

pub use calculator::{
    DEFAULT_MAX_SCORE, LetterGrade, apply_late_penalty, effective_max_score, percentage,
    round_score,
};
pub use leaderboard::{
    Badge, ItemKind, LeaderboardOptions, ScoredItem, build_item_leaderboard, build_leaderboard,
};
pub use objective::{ObjectiveScore, score_objective_answers};
pub use stats::{ImprovementTrend, StatsInput, course_stats};
pub use window::TimeWindow;
