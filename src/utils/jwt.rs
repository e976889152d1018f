use crate::config::AppConfig;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // 用户 ID
    pub role: String, // 用户角色
    pub exp: usize,   // 过期时间戳
    pub iat: usize,   // 签发时间戳
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

pub struct JwtUtils;

impl JwtUtils {
    /// Access Token 有效期（秒）
    pub fn access_token_ttl() -> i64 {
        AppConfig::get().jwt.access_token_expiry * 60
    }

    // 生成 Access Token
    pub fn generate_access_token(
        user_id: i64,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::encode_with_secret(
            user_id,
            role,
            chrono::Duration::minutes(config.jwt.access_token_expiry),
            &config.jwt.secret,
        )
    }

    // 验证 Access Token
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::decode_with_secret(token, &AppConfig::get().jwt.secret)
    }

    fn encode_with_secret(
        user_id: i64,
        role: &str,
        expiry: chrono::Duration,
        secret: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: (now + expiry).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
    }

    fn decode_with_secret(
        token: &str,
        secret: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .map(|token_data| token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let token =
            JwtUtils::encode_with_secret(42, "teacher", chrono::Duration::minutes(5), "secret")
                .unwrap();
        let claims = JwtUtils::decode_with_secret(&token, "secret").unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.role, "teacher");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token =
            JwtUtils::encode_with_secret(1, "student", chrono::Duration::minutes(5), "secret")
                .unwrap();
        assert!(JwtUtils::decode_with_secret(&token, "other").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token =
            JwtUtils::encode_with_secret(1, "student", chrono::Duration::hours(-2), "secret")
                .unwrap();
        assert!(JwtUtils::decode_with_secret(&token, "secret").is_err());
    }
}
