pub mod access;
pub mod create;
pub mod enroll;
pub mod get;
pub mod list;
pub mod students;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::courses::requests::{
    CourseListParams, CreateCourseRequest, EnrollStudentsRequest,
};
use crate::storage::Storage;

pub use access::{
    CourseAccess, course_for_manage, course_for_view, narrow_course_ids, visible_course_ids,
};

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 创建课程
    pub async fn create_course(
        &self,
        course_data: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, course_data, request).await
    }

    // 课程列表
    pub async fn list_courses(
        &self,
        query: CourseListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, query, request).await
    }

    // 课程详情
    pub async fn get_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_course(self, course_id, request).await
    }

    // 添加选课学生
    pub async fn enroll_students(
        &self,
        course_id: i64,
        enroll_data: EnrollStudentsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enroll::enroll_students(self, course_id, enroll_data, request).await
    }

    // 课程学生列表
    pub async fn list_students(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        students::list_students(self, course_id, request).await
    }
}
