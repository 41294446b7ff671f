use actix_web::{get, put, web, HttpRequest, HttpResponse};

use crate::database::Store;
use crate::models::{
    audit::{AuditAction, AuditLogEntry, AuditResourceKind},
    notification::{Notification, NotificationKind},
    role::Role,
    session::authorize,
    system_config::SystemConfig,
    user::User,
};

#[get("/admin/system-config")]
pub async fn get_system_config(store: web::Data<Store>, req: HttpRequest) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin]) {
        return response;
    }

    match SystemConfig::find(&store).await {
        Ok(config) => HttpResponse::Ok().json(config),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}

#[put("/admin/system-config")]
pub async fn update_system_config(
    payload: web::Json<SystemConfig>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let session = match authorize(&req, &[Role::Admin]) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let config = payload.into_inner();
    if let Err(error) = SystemConfig::replace(&store, config.clone()).await {
        return HttpResponse::InternalServerError().body(error);
    }

    let (user_id, user_name) = match User::find_by_email(&store, &session.email).await {
        Ok(Some(user)) => (user.id, user.full_name),
        _ => (session.email.clone(), session.email.clone()),
    };
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();
    if let Err(error) = AuditLogEntry::record(
        &store,
        &user_id,
        &user_name,
        AuditAction::Update,
        AuditResourceKind::SystemConfig,
        "system-config",
        "Configuración del sistema",
        "Actualización de la configuración del sistema".to_string(),
        &ip,
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    if let Err(error) = Notification::push(
        &store,
        NotificationKind::Success,
        "Configuración guardada",
        "La configuración del sistema fue actualizada correctamente.".to_string(),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Ok().json(config)
}
