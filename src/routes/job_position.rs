use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use crate::database::Store;
use crate::models::{
    audit::{AuditAction, AuditLogEntry, AuditResourceKind},
    job_position::{JobPosition, JobPositionAssignmentRequest, JobPositionRequest},
    role::Role,
    session::authorize,
    user::User,
};

fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

#[get("/job-positions")]
pub async fn get_job_positions(store: web::Data<Store>, req: HttpRequest) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin]) {
        return response;
    }

    match JobPosition::find_many(&store).await {
        Ok(positions) => HttpResponse::Ok().json(positions),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}

#[get("/job-positions/{position_id}")]
pub async fn get_job_position(
    position_id: web::Path<String>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin]) {
        return response;
    }

    match JobPosition::find_by_id(&store, &position_id).await {
        Ok(Some(position)) => HttpResponse::Ok().json(position),
        Ok(None) => HttpResponse::NotFound().body("POSITION_NOT_FOUND"),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}

#[post("/job-positions")]
pub async fn create_job_position(
    payload: web::Json<JobPositionRequest>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin]) {
        return response;
    }

    match JobPosition::save(&store, payload.into_inner()).await {
        Ok(id) => HttpResponse::Created().body(id),
        Err(error) => match error.as_str() {
            "STORE_POISONED" => HttpResponse::InternalServerError().body(error),
            _ => HttpResponse::BadRequest().body(error),
        },
    }
}

#[put("/job-positions/{position_id}")]
pub async fn update_job_position(
    position_id: web::Path<String>,
    payload: web::Json<JobPositionRequest>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin]) {
        return response;
    }

    match JobPosition::update(&store, &position_id, payload.into_inner()).await {
        Ok(position) => HttpResponse::Ok().json(position),
        Err(error) => match error.as_str() {
            "POSITION_NOT_FOUND" => HttpResponse::NotFound().body(error),
            "STORE_POISONED" => HttpResponse::InternalServerError().body(error),
            _ => HttpResponse::BadRequest().body(error),
        },
    }
}

#[delete("/job-positions/{position_id}")]
pub async fn delete_job_position(
    position_id: web::Path<String>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin]) {
        return response;
    }

    match JobPosition::delete_by_id(&store, &position_id).await {
        Ok(_) => HttpResponse::Ok().finish(),
        Err(error) => match error.as_str() {
            "POSITION_NOT_FOUND" => HttpResponse::NotFound().body(error),
            _ => HttpResponse::InternalServerError().body(error),
        },
    }
}

#[put("/job-positions/{position_id}/checklists")]
pub async fn assign_position_checklists(
    position_id: web::Path<String>,
    payload: web::Json<JobPositionAssignmentRequest>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let session = match authorize(&req, &[Role::Admin]) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let position =
        match JobPosition::assign_checklists(&store, &position_id, &payload.checklist_ids).await {
            Ok(position) => position,
            Err(error) => {
                return match error.as_str() {
                    "POSITION_NOT_FOUND" => HttpResponse::NotFound().body(error),
                    _ => HttpResponse::InternalServerError().body(error),
                }
            }
        };

    let (user_id, user_name) = match User::find_by_email(&store, &session.email).await {
        Ok(Some(user)) => (user.id, user.full_name),
        _ => (session.email.clone(), session.email.clone()),
    };
    if let Err(error) = AuditLogEntry::record(
        &store,
        &user_id,
        &user_name,
        AuditAction::Assign,
        AuditResourceKind::Checklist,
        &position.id,
        &position.name,
        format!(
            "Asignación de {} checklists por defecto al cargo",
            position.default_checklists.len()
        ),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Ok().json(position)
}
