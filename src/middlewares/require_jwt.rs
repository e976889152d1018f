/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <token>`，通过后把当前用户放入请求扩展，
 * 处理程序用 `RequireJWT::extract_user_claims` 等方法读取。
 *
 * ```rust,ignore
 * web::scope("/api/v1/grades")
 *     .wrap(RequireJWT)
 *     .route("/student", web::get().to(student_grades))
 * ```
 *
 * 用户信息按 token 缓存（`user:{token}`），缓存时间不超过 token 剩余有效期。
 */

use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::users::entities::{User, UserRole, UserStatus};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

fn cache_key(token: &str) -> String {
    format!("user:{token}")
}

// 提取并验证 access token，返回当前用户
async fn authenticate(req: &ServiceRequest) -> Result<User, String> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid JWT token".to_string()
    })?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());

    if let Some(ref cache) = cache
        && let Some(user) = cache.get_json::<User>(&cache_key(token)).await
    {
        return Ok(user);
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage is not registered in app data");
            "Authentication backend unavailable".to_string()
        })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| "Invalid user ID in JWT".to_string())?;

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            error!("Failed to load user {} for JWT: {}", user_id, e);
            "Failed to retrieve user".to_string()
        })?
        .ok_or_else(|| "User not found".to_string())?;

    if user.status != UserStatus::Active {
        return Err("User is not active".to_string());
    }

    if let Some(cache) = cache {
        let remaining = (claims.exp as i64 - chrono::Utc::now().timestamp()).max(1) as u64;
        let ttl = AppConfig::get().cache.default_ttl.min(remaining);
        cache.insert_json(cache_key(token), &user, ttl).await;
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 预检请求直接放行
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match authenticate(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 当前用户（需在 RequireJWT 之后调用）
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    pub fn extract_user_role(req: &actix_web::HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test as actix_test};

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let app = actix_test::init_service(
            App::new().service(
                web::scope("/protected")
                    .wrap(RequireJWT)
                    .route("", web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/protected").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::Unauthorized as i32);
    }

    #[actix_web::test]
    async fn test_options_passes_without_token() {
        let app = actix_test::init_service(
            App::new().service(
                web::scope("/protected")
                    .wrap(RequireJWT)
                    .route("", web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        let req = actix_test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/protected")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
