/*!
 * 基于角色的访问控制中间件
 *
 * 必须放在 RequireJWT 之内使用：
 *
 * ```rust,ignore
 * web::scope("/api/v1/users")
 *     .wrap(RequireJWT)
 *     .service(
 *         web::scope("")
 *             .wrap(RequireRole::new_any(UserRole::admin_roles()))
 *             .route("", web::get().to(list_users)),
 *     )
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{
    ErrorCode,
    users::entities::{User, UserRole},
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    allowed_roles: Vec<UserRole>,
}

impl RequireRole {
    /// 只允许单一角色
    pub fn new(role: &UserRole) -> Self {
        Self {
            allowed_roles: vec![*role],
        }
    }

    /// 允许任一角色
    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            allowed_roles: roles.iter().map(|r| **r).collect(),
        }
    }

    fn allows(allowed: &[UserRole], role: UserRole) -> bool {
        allowed.contains(&role)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            allowed_roles: Rc::new(self.allowed_roles.clone()),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    allowed_roles: Rc<Vec<UserRole>>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let allowed_roles = self.allowed_roles.clone();

        Box::pin(async move {
            let current = req
                .extensions()
                .get::<User>()
                .map(|user| (user.id, user.role));

            match current {
                Some((_, role)) if RequireRole::allows(&allowed_roles, role) => {
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Some((user_id, role)) => {
                    info!(
                        "Access denied for user {} (role: {}). Allowed roles: {:?}",
                        user_id, role, allowed_roles
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::Forbidden,
                            "Access denied.",
                        )
                        .map_into_right_body(),
                    ))
                }
                None => {
                    info!("Role check without authenticated user on {}", req.path());
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserStatus;
    use actix_web::{App, HttpResponse, test as actix_test, web};

    fn user_with_role(role: UserRole) -> User {
        let now = chrono::Utc::now();
        User {
            id: 7,
            username: "someone".into(),
            email: "someone@example.com".into(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            first_name: String::new(),
            last_name: String::new(),
            avatar_url: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn status_for(role: Option<UserRole>) -> StatusCode {
        let app = actix_test::init_service(
            App::new().service(
                web::scope("/teach")
                    .wrap(RequireRole::new_any(UserRole::teacher_roles()))
                    .wrap_fn(move |req, srv| {
                        if let Some(role) = role {
                            req.extensions_mut().insert(user_with_role(role));
                        }
                        srv.call(req)
                    })
                    .route("", web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/teach").to_request();
        actix_test::call_service(&app, req).await.status()
    }

    #[actix_web::test]
    async fn test_role_gate() {
        assert_eq!(status_for(Some(UserRole::Teacher)).await, StatusCode::OK);
        assert_eq!(status_for(Some(UserRole::Admin)).await, StatusCode::OK);
        assert_eq!(
            status_for(Some(UserRole::Student)).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_for(None).await, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_allows() {
        assert!(RequireRole::allows(&[UserRole::Admin], UserRole::Admin));
        assert!(!RequireRole::allows(&[UserRole::Admin], UserRole::Teacher));
    }
}
