use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{requests::LoginRequest, responses::LoginResponse},
    users::entities::UserStatus,
};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;

use super::AuthService;
use crate::services::internal_error;

fn auth_failed() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::AuthFailed,
        "Username or password is incorrect",
    ))
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // 1. 根据用户名或邮箱获取用户信息
    let user = match storage
        .get_user_by_username_or_email(login_request.username.trim())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(auth_failed()),
        Err(e) => return Ok(internal_error("Login failed", e)),
    };

    // 2. 验证密码
    if !verify_password(&login_request.password, &user.password_hash) {
        info!("Login rejected for {}: wrong password", user.username);
        return Ok(auth_failed());
    }

    if user.status != UserStatus::Active {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            format!("User account is {}", user.status),
        )));
    }

    // 3. 更新最后登录时间
    if let Err(e) = storage.update_last_login(user.id).await {
        error!("Failed to update last login for {}: {}", user.id, e);
    }

    // 4. 生成令牌
    match JwtUtils::generate_access_token(user.id, &user.role.to_string()) {
        Ok(access_token) => {
            info!("User {} logged in successfully", user.username);
            let response = LoginResponse {
                access_token,
                expires_in: JwtUtils::access_token_ttl(),
                user,
                created_at: chrono::Utc::now(),
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Login successful")))
        }
        Err(e) => {
            error!("Failed to generate JWT token: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            )
        }
    }
}
