use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;

use crate::models::{attachment::Attachment, chapter::Chapter, course::{Course, CourseListing}};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CreateCourse{
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateCourse{
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i32>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CourseSearchQuery{
    pub title: Option<String>,
    pub category_id: Option<Uuid>,
}

/// Browse entry; `progress` is only set for purchased courses.
#[derive(Debug, Deserialize, Serialize)]
pub struct CourseWithProgress{
    #[serde(flatten)]
    pub course: CourseListing,
    pub progress: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CourseDetail{
    #[serde(flatten)]
    pub course: Course,
    pub chapters: Vec<Chapter>,
    pub purchased: bool,
    pub progress: Option<f64>,
}

/// Teacher's editing view of a course.
#[derive(Debug, Deserialize, Serialize)]
pub struct CourseSetup{
    #[serde(flatten)]
    pub course: Course,
    pub chapters: Vec<Chapter>,
    pub attachments: Vec<Attachment>,
    pub completed_fields: usize,
    pub total_fields: usize,
    pub is_complete: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DashboardCourse{
    #[serde(flatten)]
    pub course: Course,
    pub progress: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DashboardResponse{
    pub completed_courses: Vec<DashboardCourse>,
    pub courses_in_progress: Vec<DashboardCourse>,
}
