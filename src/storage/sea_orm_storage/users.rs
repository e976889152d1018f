use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{EHubError, Result};
use crate::models::{
    PaginationInfo,
    users::{
        entities::{User, UserRole, UserStatus},
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            avatar_url: Set(req.avatar_url),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("创建用户失败: {e}")))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 批量获取用户
    pub async fn get_users_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = Users::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("批量查询用户失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Users::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Username.contains(&escaped))
                    .add(Column::Email.contains(&escaped))
                    .add(Column::FirstName.contains(&escaped))
                    .add(Column::LastName.contains(&escaped)),
            );
        }

        // 角色筛选
        if let Some(ref role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        // 状态筛选
        if let Some(ref status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| EHubError::database_operation(format!("查询用户总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EHubError::database_operation(format!("查询用户页数失败: {e}")))?;

        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 列出全部活跃学生
    pub async fn list_students_impl(&self) -> Result<Vec<User>> {
        let users = Users::find()
            .filter(Column::Role.eq(UserRole::STUDENT))
            .filter(Column::Status.eq(UserStatus::Active.to_string()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询学生列表失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 用户总数
    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("统计用户数量失败: {e}")))
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_user, memory_storage};
    use super::*;

    #[tokio::test]
    async fn test_create_and_lookup_user() {
        let storage = memory_storage().await;
        let user = create_user(&storage, "alice", UserRole::Student).await;

        let by_name = storage
            .get_user_by_username_or_email_impl("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, user.id);

        let by_email = storage
            .get_user_by_username_or_email_impl("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.status, UserStatus::Active);

        assert!(storage.get_user_by_id_impl(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_students_only_returns_students() {
        let storage = memory_storage().await;
        create_user(&storage, "teacher", UserRole::Teacher).await;
        let s1 = create_user(&storage, "s1", UserRole::Student).await;
        let s2 = create_user(&storage, "s2", UserRole::Student).await;

        let students = storage.list_students_impl().await.unwrap();
        let ids: Vec<i64> = students.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![s1.id, s2.id]);
        assert_eq!(storage.count_users_impl().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_list_users_with_search_and_role() {
        let storage = memory_storage().await;
        create_user(&storage, "math_teacher", UserRole::Teacher).await;
        create_user(&storage, "bob", UserRole::Student).await;

        let result = storage
            .list_users_with_pagination_impl(UserListQuery {
                search: Some("math".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.items[0].username, "math_teacher");

        let result = storage
            .list_users_with_pagination_impl(UserListQuery {
                role: Some(UserRole::Student),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].username, "bob");
    }

    #[tokio::test]
    async fn test_update_last_login() {
        let storage = memory_storage().await;
        let user = create_user(&storage, "carol", UserRole::Student).await;
        assert!(user.last_login.is_none());

        assert!(storage.update_last_login_impl(user.id).await.unwrap());
        let user = storage.get_user_by_id_impl(user.id).await.unwrap().unwrap();
        assert!(user.last_login.is_some());
    }
}
