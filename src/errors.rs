//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_ehub_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum EHubError {
            $($variant(String),)*
        }

        impl EHubError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(EHubError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(EHubError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(EHubError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl EHubError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        EHubError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_ehub_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Validation("E006", "Validation Error"),
    NotFound("E007", "Resource Not Found"),
    Serialization("E008", "Serialization Error"),
    DateParse("E009", "Date Parse Error"),
    Authentication("E010", "Authentication Error"),
    Authorization("E011", "Authorization Error"),
    Conflict("E012", "Conflict Error"),
    InvalidState("E013", "Invalid State Error"),
    Io("E014", "IO Error"),
}

impl EHubError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for EHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for EHubError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for EHubError {
    fn from(err: sea_orm::DbErr) -> Self {
        EHubError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for EHubError {
    fn from(err: std::io::Error) -> Self {
        EHubError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EHubError {
    fn from(err: serde_json::Error) -> Self {
        EHubError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for EHubError {
    fn from(err: chrono::ParseError) -> Self {
        EHubError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(EHubError::cache_connection("test").code(), "E001");
        assert_eq!(EHubError::database_config("test").code(), "E003");
        assert_eq!(EHubError::validation("test").code(), "E006");
        assert_eq!(EHubError::conflict("test").code(), "E012");
        assert_eq!(EHubError::invalid_state("test").code(), "E013");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            EHubError::not_found("test").error_type(),
            "Resource Not Found"
        );
        assert_eq!(EHubError::conflict("test").error_type(), "Conflict Error");
    }

    #[test]
    fn test_error_message() {
        let err = EHubError::conflict("已达到最大尝试次数");
        assert_eq!(err.message(), "已达到最大尝试次数");
    }

    #[test]
    fn test_format_simple() {
        let err = EHubError::validation("Invalid score");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Invalid score"));
    }

    #[test]
    fn test_from_serde_error() {
        let err: EHubError = serde_json::from_str::<i64>("oops").unwrap_err().into();
        assert_eq!(err.code(), "E008");
    }
}
