use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use regex::Regex;

use crate::database::Store;
use crate::models::{
    audit::{AuditAction, AuditLogEntry, AuditResourceKind},
    job_position::{JobPosition, JobPositionHistory},
    role::Role,
    session::{authorize, SessionAuthentication},
    user::{
        User, UserChecklistAssignmentRequest, UserFilter, UserRequest, UserResponse, UserStatus,
    },
};

fn email_regex() -> Regex {
    Regex::new(
        r"^([a-z0-9_+]([a-z0-9_+.]*[a-z0-9_+])?)@([a-z0-9]+([\-\.]{1}[a-z0-9]+)*\.[a-z]{2,6})",
    )
    .unwrap()
}

fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

async fn issuer_identity(store: &Store, session: &SessionAuthentication) -> (String, String) {
    match User::find_by_email(store, &session.email).await {
        Ok(Some(user)) => (user.id, user.full_name),
        _ => (session.email.clone(), session.email.clone()),
    }
}

/// An operational account must point at an existing job position.
async fn validate_position(
    store: &Store,
    role: Role,
    job_position_id: &Option<String>,
) -> Result<(), HttpResponse> {
    if role != Role::Operational {
        return Ok(());
    }
    let position_id = match job_position_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(HttpResponse::BadRequest().body("USER_MUST_HAVE_JOB_POSITION")),
    };
    match JobPosition::find_by_id(store, position_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(HttpResponse::BadRequest().body("JOB_POSITION_NOT_FOUND")),
        Err(error) => Err(HttpResponse::InternalServerError().body(error)),
    }
}

#[get("/users")]
pub async fn get_users(
    query: web::Query<UserFilter>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin]) {
        return response;
    }

    match User::find_many(&store, &query).await {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}

#[get("/users/{user_id}")]
pub async fn get_user(
    user_id: web::Path<String>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin]) {
        return response;
    }

    match User::find_by_id(&store, &user_id).await {
        Ok(Some(user)) => HttpResponse::Ok().json(UserResponse::from(&user)),
        Ok(None) => HttpResponse::NotFound().body("USER_NOT_FOUND"),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}

#[post("/users")]
pub async fn create_user(
    payload: web::Json<UserRequest>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let session = match authorize(&req, &[Role::Admin]) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let payload = payload.into_inner();

    let password = match payload.password {
        Some(ref password) if password.len() >= 6 => password.clone(),
        _ => return HttpResponse::BadRequest().body("USER_MUST_HAVE_VALID_PASSWORD"),
    };
    if payload.password_confirm.as_deref() != Some(password.as_str()) {
        return HttpResponse::BadRequest().body("PASSWORDS_DO_NOT_MATCH");
    }
    if !email_regex().is_match(&payload.email) {
        return HttpResponse::BadRequest().body("USER_MUST_HAVE_VALID_EMAIL");
    }
    if payload.full_name.trim().is_empty() {
        return HttpResponse::BadRequest().body("USER_MUST_HAVE_NAME");
    }
    if let Ok(Some(_)) = User::find_by_email(&store, &payload.email).await {
        return HttpResponse::BadRequest().body("USER_ALREADY_EXIST");
    }
    if let Err(response) = validate_position(&store, payload.role, &payload.job_position_id).await {
        return response;
    }

    let mut user = User {
        id: String::new(),
        full_name: payload.full_name,
        email: payload.email,
        password,
        role: payload.role,
        status: payload.status.unwrap_or(UserStatus::Active),
        last_login: None,
        created_at: Utc::now(),
        job_position_id: payload.job_position_id.clone(),
        assigned_checklists: Vec::new(),
    };

    let id = match user.save(&store).await {
        Ok(id) => id,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };

    if let Some(position_id) = &payload.job_position_id {
        if JobPositionHistory::record(
            &store,
            &id,
            None,
            position_id,
            &session.email,
            payload.position_change_reason.clone(),
        )
        .await
        .is_err()
        {
            return HttpResponse::InternalServerError().body("STORE_POISONED");
        }
    }

    let (issuer_id, issuer_name) = issuer_identity(&store, &session).await;
    if let Err(error) = AuditLogEntry::record(
        &store,
        &issuer_id,
        &issuer_name,
        AuditAction::Create,
        AuditResourceKind::User,
        &id,
        &user.full_name,
        "Creación de usuario".to_string(),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Created().body(id)
}

#[put("/users/{user_id}")]
pub async fn update_user(
    user_id: web::Path<String>,
    payload: web::Json<UserRequest>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let session = match authorize(&req, &[Role::Admin]) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let payload = payload.into_inner();

    let current = match User::find_by_id(&store, &user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return HttpResponse::NotFound().body("USER_NOT_FOUND"),
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };

    if !email_regex().is_match(&payload.email) {
        return HttpResponse::BadRequest().body("USER_MUST_HAVE_VALID_EMAIL");
    }
    if payload.full_name.trim().is_empty() {
        return HttpResponse::BadRequest().body("USER_MUST_HAVE_NAME");
    }
    if payload.email != current.email {
        if let Ok(Some(_)) = User::find_by_email(&store, &payload.email).await {
            return HttpResponse::BadRequest().body("USER_ALREADY_EXIST");
        }
    }
    if let Err(response) = validate_position(&store, payload.role, &payload.job_position_id).await {
        return response;
    }

    // A blank password leaves the stored hash untouched.
    let (password, rehash) = match payload.password {
        Some(ref password) if !password.is_empty() => {
            if password.len() < 6 {
                return HttpResponse::BadRequest().body("USER_MUST_HAVE_VALID_PASSWORD");
            }
            if payload.password_confirm.as_deref() != Some(password.as_str()) {
                return HttpResponse::BadRequest().body("PASSWORDS_DO_NOT_MATCH");
            }
            (password.clone(), true)
        }
        _ => (current.password.clone(), false),
    };

    let position_changed = payload.job_position_id != current.job_position_id;

    let updated = User {
        id: current.id.clone(),
        full_name: payload.full_name,
        email: payload.email,
        password,
        role: payload.role,
        status: payload.status.unwrap_or(current.status),
        last_login: current.last_login,
        created_at: current.created_at,
        job_position_id: payload.job_position_id.clone(),
        assigned_checklists: current.assigned_checklists.clone(),
    };

    if let Err(error) = updated.update(&store, rehash).await {
        return HttpResponse::InternalServerError().body(error);
    }

    if position_changed {
        if let Some(position_id) = &payload.job_position_id {
            if JobPositionHistory::record(
                &store,
                &current.id,
                current.job_position_id.clone(),
                position_id,
                &session.email,
                payload.position_change_reason.clone(),
            )
            .await
            .is_err()
            {
                return HttpResponse::InternalServerError().body("STORE_POISONED");
            }
        }
    }

    let (issuer_id, issuer_name) = issuer_identity(&store, &session).await;
    if let Err(error) = AuditLogEntry::record(
        &store,
        &issuer_id,
        &issuer_name,
        AuditAction::Update,
        AuditResourceKind::User,
        &updated.id,
        &updated.full_name,
        "Actualización de usuario".to_string(),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Ok().json(UserResponse::from(&updated))
}

#[delete("/users/{user_id}")]
pub async fn delete_user(
    user_id: web::Path<String>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let session = match authorize(&req, &[Role::Admin]) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let removed = match User::delete_by_id(&store, &user_id).await {
        Ok(user) => user,
        Err(error) => return HttpResponse::NotFound().body(error),
    };

    let (issuer_id, issuer_name) = issuer_identity(&store, &session).await;
    if let Err(error) = AuditLogEntry::record(
        &store,
        &issuer_id,
        &issuer_name,
        AuditAction::Delete,
        AuditResourceKind::User,
        &removed.id,
        &removed.full_name,
        "Eliminación de usuario".to_string(),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Ok().finish()
}

#[put("/users/{user_id}/checklists")]
pub async fn assign_user_checklists(
    user_id: web::Path<String>,
    payload: web::Json<UserChecklistAssignmentRequest>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let session = match authorize(&req, &[Role::Admin]) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let user = match User::assign_checklists(&store, &user_id, &payload.checklist_ids).await {
        Ok(user) => user,
        Err(error) => {
            return match error.as_str() {
                "USER_NOT_FOUND" => HttpResponse::NotFound().body(error),
                "USER_NOT_ASSIGNABLE" => HttpResponse::BadRequest().body(error),
                _ => HttpResponse::InternalServerError().body(error),
            }
        }
    };

    let (issuer_id, issuer_name) = issuer_identity(&store, &session).await;
    if let Err(error) = AuditLogEntry::record(
        &store,
        &issuer_id,
        &issuer_name,
        AuditAction::Assign,
        AuditResourceKind::Checklist,
        &user.id,
        &user.full_name,
        format!("Asignación de {} checklists al usuario", user.assigned_checklists.len()),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Ok().json(user)
}

#[get("/users/{user_id}/position-history")]
pub async fn get_user_position_history(
    user_id: web::Path<String>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin]) {
        return response;
    }

    match JobPositionHistory::find_by_user(&store, &user_id).await {
        Ok(history) => HttpResponse::Ok().json(history),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}
