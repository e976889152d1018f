//! 课程与选课存储操作

use super::SeaOrmStorage;
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::enrollments::{
    ActiveModel as EnrollmentActiveModel, Column as EnrollmentColumn, Entity as Enrollments,
};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{EHubError, Result};
use crate::models::{
    PaginationInfo,
    courses::{
        entities::{Course, Enrollment},
        requests::{CourseListQuery, CreateCourseRequest},
        responses::CourseListResponse,
    },
    users::entities::{User, UserRole},
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(
        &self,
        instructor_id: i64,
        req: CreateCourseRequest,
    ) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            instructor_id: Set(instructor_id),
            title: Set(req.title),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, course_id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 分页列出课程
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Courses::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Title.contains(&escaped))
                    .add(Column::Description.contains(&escaped)),
            );
        }

        if let Some(instructor_id) = query.instructor_id {
            select = select.filter(Column::InstructorId.eq(instructor_id));
        }

        // 学生只看到已选课程
        if let Some(student_id) = query.student_id {
            select = select
                .join(
                    JoinType::InnerJoin,
                    crate::entity::courses::Relation::Enrollments.def(),
                )
                .filter(EnrollmentColumn::StudentId.eq(student_id));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| EHubError::database_operation(format!("查询课程总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EHubError::database_operation(format!("查询课程页数失败: {e}")))?;

        let courses = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(CourseListResponse {
            items: courses.into_iter().map(|m| m.into_course()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 教师授课的课程 ID
    pub async fn list_course_ids_by_instructor_impl(&self, instructor_id: i64) -> Result<Vec<i64>> {
        Courses::find()
            .filter(Column::InstructorId.eq(instructor_id))
            .select_only()
            .column(Column::Id)
            .order_by_asc(Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询授课课程失败: {e}")))
    }

    /// 学生选修的课程 ID
    pub async fn list_course_ids_by_student_impl(&self, student_id: i64) -> Result<Vec<i64>> {
        Enrollments::find()
            .filter(EnrollmentColumn::StudentId.eq(student_id))
            .select_only()
            .column(EnrollmentColumn::CourseId)
            .order_by_asc(EnrollmentColumn::CourseId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询选修课程失败: {e}")))
    }

    /// 批量获取课程
    pub async fn get_courses_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let courses = Courses::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("批量查询课程失败: {e}")))?;

        Ok(courses.into_iter().map(|m| m.into_course()).collect())
    }

    /// 选课，已选时返回 None
    pub async fn enroll_student_impl(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Option<Enrollment>> {
        if self.is_enrolled_impl(course_id, student_id).await? {
            return Ok(None);
        }

        let model = EnrollmentActiveModel {
            course_id: Set(course_id),
            student_id: Set(student_id),
            enrolled_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("选课失败: {e}")))?;

        Ok(Some(result.into_enrollment()))
    }

    /// 是否已选课
    pub async fn is_enrolled_impl(&self, course_id: i64, student_id: i64) -> Result<bool> {
        let count = Enrollments::find()
            .filter(
                Condition::all()
                    .add(EnrollmentColumn::CourseId.eq(course_id))
                    .add(EnrollmentColumn::StudentId.eq(student_id)),
            )
            .count(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(count > 0)
    }

    /// 课程的选课学生
    pub async fn list_course_students_impl(&self, course_id: i64) -> Result<Vec<User>> {
        let users = Users::find()
            .join(
                JoinType::InnerJoin,
                crate::entity::users::Relation::Enrollments.def(),
            )
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(UserColumn::Role.eq(UserRole::STUDENT))
            .order_by_asc(UserColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| EHubError::database_operation(format!("查询课程学生失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{create_user, memory_storage};
    use super::*;

    fn course_request(title: &str) -> CreateCourseRequest {
        CreateCourseRequest {
            title: title.to_string(),
            description: Some("intro".to_string()),
            instructor_id: None,
        }
    }

    #[tokio::test]
    async fn test_enroll_is_idempotent() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t1", UserRole::Teacher).await;
        let student = create_user(&storage, "s1", UserRole::Student).await;
        let course = storage
            .create_course_impl(teacher.id, course_request("Algebra"))
            .await
            .unwrap();

        let first = storage
            .enroll_student_impl(course.id, student.id)
            .await
            .unwrap();
        assert!(first.is_some());
        let second = storage
            .enroll_student_impl(course.id, student.id)
            .await
            .unwrap();
        assert!(second.is_none());

        assert!(storage.is_enrolled_impl(course.id, student.id).await.unwrap());
        let students = storage.list_course_students_impl(course.id).await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, student.id);
    }

    #[tokio::test]
    async fn test_course_ids_by_role() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t1", UserRole::Teacher).await;
        let other = create_user(&storage, "t2", UserRole::Teacher).await;
        let student = create_user(&storage, "s1", UserRole::Student).await;

        let c1 = storage
            .create_course_impl(teacher.id, course_request("Algebra"))
            .await
            .unwrap();
        let c2 = storage
            .create_course_impl(other.id, course_request("Physics"))
            .await
            .unwrap();
        storage.enroll_student_impl(c2.id, student.id).await.unwrap();

        assert_eq!(
            storage
                .list_course_ids_by_instructor_impl(teacher.id)
                .await
                .unwrap(),
            vec![c1.id]
        );
        assert_eq!(
            storage
                .list_course_ids_by_student_impl(student.id)
                .await
                .unwrap(),
            vec![c2.id]
        );

        let listed = storage
            .list_courses_with_pagination_impl(CourseListQuery {
                student_id: Some(student.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listed.pagination.total, 1);
        assert_eq!(listed.items[0].title, "Physics");

        let searched = storage
            .list_courses_with_pagination_impl(CourseListQuery {
                search: Some("alg".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.items.len(), 1);
        assert_eq!(searched.items[0].id, c1.id);
    }
}
