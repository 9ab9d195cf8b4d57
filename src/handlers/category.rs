use actix_web::{get, web, HttpResponse};

use crate::{errors::AppError, models::category::list_categories, GlobalState};

#[get("/categories")]
pub async fn list_categories_handler(data:web::Data<GlobalState>) -> Result<HttpResponse, AppError>{
    let categories = list_categories(&data.pool).await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[cfg(test)]
mod tests {
    use actix_web::test;

    use crate::{models::category::{Category, DEFAULT_CATEGORIES}, test_init_app::init};

    #[actix_web::test]
    #[ignore = "requires database"]
    async fn test_lists_seeded_categories_in_order(){
        let (app, _state) = init().await;

        let res = test::TestRequest::get()
            .uri("/api/v1/categories")
            .send_request(&app)
            .await;
        let categories: Vec<Category> = test::read_body_json(res).await;

        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        for seeded in DEFAULT_CATEGORIES {
            assert!(names.contains(&seeded));
        }
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
