use actix_web::{get, post, web, HttpRequest, HttpResponse};
use regex::Regex;
use serde::Serialize;

use crate::database::Store;
use crate::models::{
    audit::{AuditAction, AuditLogEntry, AuditResourceKind},
    job_position::{JobPosition, JobPositionHistory},
    role::Role,
    session::{authorize, SessionCredential},
    user::{User, UserRequest, UserResponse, UserStatus},
};

#[derive(Serialize)]
struct SessionResponse {
    token: String,
    email: String,
    role: Role,
}

fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

fn email_regex() -> Regex {
    Regex::new(
        r"^([a-z0-9_+]([a-z0-9_+.]*[a-z0-9_+])?)@([a-z0-9]+([\-\.]{1}[a-z0-9]+)*\.[a-z]{2,6})",
    )
    .unwrap()
}

#[post("/auth/login")]
pub async fn login(
    payload: web::Json<SessionCredential>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let credential = payload.into_inner();

    if !email_regex().is_match(&credential.email) {
        return HttpResponse::BadRequest().body("USER_MUST_HAVE_VALID_EMAIL");
    }
    if credential.password.is_empty() {
        return HttpResponse::BadRequest().body("USER_MUST_HAVE_PASSWORD");
    }

    let (token, identity) = match credential.authenticate(&store).await {
        Ok(session) => session,
        Err(error) => return HttpResponse::BadRequest().body(error),
    };

    let (user_id, user_name) = match User::find_by_email(&store, &identity.email).await {
        Ok(Some(user)) => (user.id, user.full_name),
        _ => (identity.email.clone(), identity.email.clone()),
    };
    if let Err(error) = AuditLogEntry::record(
        &store,
        &user_id,
        &user_name,
        AuditAction::Login,
        AuditResourceKind::User,
        &user_id,
        &user_name,
        "Inicio de sesión".to_string(),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Ok().json(SessionResponse {
        token,
        email: identity.email,
        role: identity.role,
    })
}

#[post("/auth/logout")]
pub async fn logout(store: web::Data<Store>, req: HttpRequest) -> HttpResponse {
    let session = match authorize(&req, &[]) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let identity = match SessionCredential::revoke(&session.token, &store) {
        Ok(identity) => identity,
        Err(error) => return HttpResponse::BadRequest().body(error),
    };

    let (user_id, user_name) = match User::find_by_email(&store, &identity.email).await {
        Ok(Some(user)) => (user.id, user.full_name),
        _ => (identity.email.clone(), identity.email.clone()),
    };
    if let Err(error) = AuditLogEntry::record(
        &store,
        &user_id,
        &user_name,
        AuditAction::Logout,
        AuditResourceKind::User,
        &user_id,
        &user_name,
        "Cierre de sesión".to_string(),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Ok().finish()
}

#[get("/auth/me")]
pub async fn me(store: web::Data<Store>, req: HttpRequest) -> HttpResponse {
    let session = match authorize(&req, &[]) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match User::find_by_email(&store, &session.email).await {
        Ok(Some(user)) => HttpResponse::Ok().json(UserResponse::from(&user)),
        // Sessions opened with a caller-supplied role need not match a
        // stored account.
        Ok(None) => HttpResponse::Ok().json(crate::models::session::Identity {
            email: session.email.clone(),
            role: session.role,
        }),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}

#[post("/auth/register")]
pub async fn register(
    payload: web::Json<UserRequest>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
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
    if let Ok(Some(_)) = User::find_by_email(&store, &payload.email).await {
        return HttpResponse::BadRequest().body("USER_ALREADY_EXIST");
    }

    // Self-registration always lands on the least-privileged role; an
    // administrator promotes the account afterwards. Operational accounts
    // must reference an existing job position, same as admin-side create.
    let position_id = match payload.job_position_id {
        Some(ref id) if !id.is_empty() => id.clone(),
        _ => return HttpResponse::BadRequest().body("USER_MUST_HAVE_JOB_POSITION"),
    };
    match JobPosition::find_by_id(&store, &position_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::BadRequest().body("JOB_POSITION_NOT_FOUND"),
        Err(error) => return HttpResponse::InternalServerError().body(error),
    }

    let mut user = User {
        id: String::new(),
        full_name: payload.full_name,
        email: payload.email,
        password,
        role: Role::Operational,
        status: UserStatus::Active,
        last_login: None,
        created_at: chrono::Utc::now(),
        job_position_id: Some(position_id.clone()),
        assigned_checklists: Vec::new(),
    };

    let id = match user.save(&store).await {
        Ok(id) => id,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };

    if JobPositionHistory::record(
        &store,
        &id,
        None,
        &position_id,
        &user.email,
        payload.position_change_reason.clone(),
    )
    .await
    .is_err()
    {
        return HttpResponse::InternalServerError().body("STORE_POISONED");
    }

    if let Err(error) = AuditLogEntry::record(
        &store,
        &id,
        &user.full_name,
        AuditAction::Create,
        AuditResourceKind::User,
        &id,
        &user.full_name,
        "Registro de cuenta".to_string(),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Created().body(id)
}
