use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::database::Store;
use crate::models::{
    audit::{AuditAction, AuditLogEntry, AuditLogQuery, AuditResourceKind},
    role::Role,
    session::authorize,
    user::User,
};

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Pdf,
    Excel,
    Csv,
}

impl ExportFormat {
    fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "excel",
            ExportFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    #[serde(flatten)]
    pub query: AuditLogQuery,
}

#[derive(Serialize)]
struct ExportResponse {
    format: ExportFormat,
    entries: usize,
}

#[get("/admin/audit-log")]
pub async fn get_audit_log(
    query: web::Query<AuditLogQuery>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin]) {
        return response;
    }

    match AuditLogEntry::find_page(&store, &query).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}

/// Accepts the export request and records it; actual file generation is
/// left to a downstream document service.
#[post("/admin/audit-log/export")]
pub async fn export_audit_log(
    payload: web::Json<ExportRequest>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let session = match authorize(&req, &[Role::Admin]) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let payload = payload.into_inner();

    let entries = match AuditLogEntry::count_matching(&store, &payload.query).await {
        Ok(count) => count,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };

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
        AuditAction::Export,
        AuditResourceKind::Report,
        "audit-log",
        "Registro de auditoría",
        format!("Exportación en formato {}", payload.format.as_str()),
        &ip,
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Accepted().json(ExportResponse {
        format: payload.format,
        entries,
    })
}
