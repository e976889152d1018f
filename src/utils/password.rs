use crate::config::AppConfig;
use crate::errors::{EHubError, Result};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

/// 按配置的 Argon2id 参数哈希密码
pub fn hash_password(password: &str) -> Result<String> {
    let config = &AppConfig::get().argon2;
    let params = Params::new(config.memory_cost, config.time_cost, config.parallelism, None)
        .map_err(|e| EHubError::validation(format!("Argon2 参数错误: {e}")))?;

    hash_with(&Argon2::new(Algorithm::Argon2id, Version::V0x13, params), password)
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| EHubError::validation(format!("密码哈希失败: {e}")))?;
    Ok(hash.to_string())
}

/// 验证密码，参数从哈希串中读取
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_with(&Argon2::default(), "grades2024").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("grades2024", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-hash"));
    }
}
