use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    // 用户名长度：3 <= x <= 32
    if username.len() < 3 || username.len() > 32 {
        return Err("Username length must be between 3 and 32 characters");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, dots, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码至少 8 位，且同时包含字母和数字
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err("Password must contain both letters and digits");
    }
    Ok(())
}

/// 标题非空且不超过 200 字符
pub fn validate_title(title: &str) -> Result<(), &'static str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Title must not be empty");
    }
    if trimmed.chars().count() > 200 {
        return Err("Title must be at most 200 characters");
    }
    Ok(())
}

/// 百分比类字段（及格线、迟交扣分）必须在 0-100 之间
pub fn validate_percent(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(format!("{field} must be between 0 and 100"));
    }
    Ok(())
}

/// 评分不能为负，也不能超过满分
pub fn validate_score(score: f64, max_score: f64) -> Result<(), String> {
    if !score.is_finite() || score < 0.0 {
        return Err("Score must be a non-negative number".to_string());
    }
    if max_score > 0.0 && score > max_score {
        return Err(format!("Score {score} exceeds the maximum of {max_score}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("j.doe-01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("bad name").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("teacher@school.edu").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("grades2024").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("lettersonly").is_err());
        assert!(validate_password("1234567890").is_err());
    }

    #[test]
    fn test_title_rules() {
        assert!(validate_title("Midterm").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_percent_rules() {
        assert!(validate_percent("late_penalty", 0.0).is_ok());
        assert!(validate_percent("late_penalty", 100.0).is_ok());
        assert!(validate_percent("late_penalty", 120.0).is_err());
        assert!(validate_percent("passing_score", f64::NAN).is_err());
    }

    #[test]
    fn test_score_rules() {
        assert!(validate_score(45.5, 50.0).is_ok());
        assert!(validate_score(-1.0, 50.0).is_err());
        assert!(validate_score(51.0, 50.0).is_err());
    }
}
