use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 时间窗口，按提交时间过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub enum TimeWindow {
    Week,
    Month,
    Semester,
    #[default]
    All,
}

impl TimeWindow {
    /// 宽松解析：无法识别的值（包括缺失）视为 `All`
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("week") => TimeWindow::Week,
            Some("month") => TimeWindow::Month,
            Some("semester") => TimeWindow::Semester,
            _ => TimeWindow::All,
        }
    }

    pub fn days(&self) -> Option<i64> {
        match self {
            TimeWindow::Week => Some(7),
            TimeWindow::Month => Some(30),
            TimeWindow::Semester => Some(120),
            TimeWindow::All => None,
        }
    }

    /// 窗口下界，`All` 没有下界
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|days| now - Duration::days(days))
    }

    /// 提交时间是否落在窗口内；有下界时缺失提交时间的条目被排除
    pub fn contains(&self, now: DateTime<Utc>, submitted_at: Option<DateTime<Utc>>) -> bool {
        match (self.cutoff(now), submitted_at) {
            (None, _) => true,
            (Some(cutoff), Some(at)) => at >= cutoff,
            (Some(_), None) => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Semester => "semester",
            TimeWindow::All => "all",
        }
    }
}

impl<'de> Deserialize<'de> for TimeWindow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(TimeWindow::parse_lenient(s.as_deref()))
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient() {
        assert_eq!(TimeWindow::parse_lenient(Some("week")), TimeWindow::Week);
        assert_eq!(TimeWindow::parse_lenient(Some("Month")), TimeWindow::Month);
        assert_eq!(TimeWindow::parse_lenient(Some("semester")), TimeWindow::Semester);
        assert_eq!(TimeWindow::parse_lenient(Some("all")), TimeWindow::All);
        assert_eq!(TimeWindow::parse_lenient(Some("year")), TimeWindow::All);
        assert_eq!(TimeWindow::parse_lenient(Some("")), TimeWindow::All);
        assert_eq!(TimeWindow::parse_lenient(None), TimeWindow::All);
    }

    #[test]
    fn test_cutoff() {
        let now = Utc::now();
        assert_eq!(TimeWindow::Week.cutoff(now), Some(now - Duration::days(7)));
        assert_eq!(TimeWindow::Month.cutoff(now), Some(now - Duration::days(30)));
        assert_eq!(
            TimeWindow::Semester.cutoff(now),
            Some(now - Duration::days(120))
        );
        assert_eq!(TimeWindow::All.cutoff(now), None);
    }

    #[test]
    fn test_contains() {
        let now = Utc::now();
        let recent = Some(now - Duration::days(3));
        let old = Some(now - Duration::days(10));

        assert!(TimeWindow::Week.contains(now, recent));
        assert!(!TimeWindow::Week.contains(now, old));
        assert!(TimeWindow::Month.contains(now, old));
        assert!(!TimeWindow::Week.contains(now, None));
        assert!(TimeWindow::All.contains(now, None));
        // 恰好在下界上的条目保留
        assert!(TimeWindow::Week.contains(now, Some(now - Duration::days(7))));
    }

    #[test]
    fn test_deserialize() {
        #[derive(Deserialize)]
        struct Query {
            #[serde(default)]
            time_filter: TimeWindow,
        }

        let q: Query = serde_json::from_str(r#"{"time_filter":"week"}"#).unwrap();
        assert_eq!(q.time_filter, TimeWindow::Week);
        let q: Query = serde_json::from_str(r#"{"time_filter":"decade"}"#).unwrap();
        assert_eq!(q.time_filter, TimeWindow::All);
        let q: Query = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(q.time_filter, TimeWindow::All);
    }
}
