use actix_web::{get, post, web, HttpRequest, HttpResponse};

use crate::database::Store;
use crate::models::{notification::Notification, session::authorize};

#[get("/notifications")]
pub async fn get_notifications(store: web::Data<Store>, req: HttpRequest) -> HttpResponse {
    if let Err(response) = authorize(&req, &[]) {
        return response;
    }

    match Notification::find_many(&store).await {
        Ok(notifications) => HttpResponse::Ok().json(notifications),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}

#[post("/notifications/{notification_id}/dismiss")]
pub async fn dismiss_notification(
    notification_id: web::Path<String>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[]) {
        return response;
    }

    match Notification::dismiss(&store, &notification_id).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(error) => match error.as_str() {
            "NOTIFICATION_NOT_FOUND" => HttpResponse::NotFound().body(error),
            _ => HttpResponse::InternalServerError().body(error),
        },
    }
}
