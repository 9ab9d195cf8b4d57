use actix_web::{get, web, HttpResponse};
use futures_util::future::try_join_all;

use crate::{errors::AppError, middlewares::auth::AuthUser, models::{progress::{get_course_progress, is_course_completed}, purchase::get_purchased_courses}, schema::course::{DashboardCourse, DashboardResponse}, GlobalState};

#[get("")]
pub async fn dashboard_handler(data:web::Data<GlobalState>, user:AuthUser) -> Result<HttpResponse, AppError>{
    let pool = &data.pool;
    let user_id = user.user_id.as_str();

    let courses = get_purchased_courses(pool, user_id).await?;
    let with_progress = try_join_all(courses.into_iter().map(|course| async move {
        let progress = get_course_progress(pool, user_id, course.id).await?;
        Ok::<_, sqlx::Error>(DashboardCourse{course, progress})
    }))
    .await?;

    let (completed_courses, courses_in_progress) = with_progress
        .into_iter()
        .partition(|entry| is_course_completed(entry.progress));

    Ok(HttpResponse::Ok().json(DashboardResponse{completed_courses, courses_in_progress}))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};

    use crate::{schema::course::DashboardResponse, test_init_app::{init, seed_course, session_token}};

    #[actix_web::test]
    async fn test_dashboard_requires_session(){
        let (app, _state) = init().await;

        let res = test::TestRequest::get()
            .uri("/api/v1/dashboard")
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    #[ignore = "requires database"]
    async fn test_dashboard_splits_by_progress(){
        let (app, state) = init().await;
        let pool = &state.pool;
        let course = seed_course(pool, "user_dash_owner", "Dashboard Course").await;

        let chapter_ids: Vec<uuid::Uuid> = sqlx::query_scalar(
            r#"
                INSERT INTO chapters (course_id, title, position, is_published)
                VALUES ($1, 'One', 1, TRUE), ($1, 'Two', 2, TRUE)
                RETURNING id
            "#,
        )
        .bind(course.id)
        .fetch_all(pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO purchases (user_id, course_id) VALUES ('user_dash_student', $1)")
            .bind(course.id)
            .execute(pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO user_progress (user_id, chapter_id, is_completed) VALUES ('user_dash_student', $1, TRUE)")
            .bind(chapter_ids[0])
            .execute(pool)
            .await
            .unwrap();

        let token = format!("Bearer {}", session_token("user_dash_student"));
        let res = test::TestRequest::get()
            .uri("/api/v1/dashboard")
            .append_header(("Authorization", token.clone()))
            .send_request(&app)
            .await;
        let dashboard: DashboardResponse = test::read_body_json(res).await;
        assert!(dashboard.completed_courses.is_empty());
        assert_eq!(dashboard.courses_in_progress[0].progress, 50.0);

        let res = test::TestRequest::put()
            .uri(&format!("/api/v1/courses/{}/chapters/{}/progress", course.id, chapter_ids[1]))
            .append_header(("Authorization", token.clone()))
            .set_json(serde_json::json!({"is_completed": true}))
            .send_request(&app)
            .await;
        assert!(res.status().is_success());

        let res = test::TestRequest::get()
            .uri("/api/v1/dashboard")
            .append_header(("Authorization", token))
            .send_request(&app)
            .await;
        let dashboard: DashboardResponse = test::read_body_json(res).await;
        assert_eq!(dashboard.completed_courses.len(), 1);
        assert_eq!(dashboard.completed_courses[0].progress, 100.0);

        sqlx::query("DELETE FROM courses WHERE id = $1").bind(course.id).execute(pool).await.unwrap();
    }
}
