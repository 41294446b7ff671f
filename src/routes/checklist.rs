use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::database::Store;
use crate::models::{
    audit::{AuditAction, AuditLogEntry, AuditResourceKind},
    checklist::{ChecklistCategory, ChecklistInstance, ChecklistItemUpdate, ChecklistRequest},
    notification::{Notification, NotificationKind},
    role::Role,
    session::authorize,
    user::User,
};

const EDITOR_ROLES: [Role; 3] = [Role::Admin, Role::ContractAdmin, Role::Preventionist];

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

#[get("/categories")]
pub async fn get_categories(store: web::Data<Store>, req: HttpRequest) -> HttpResponse {
    if let Err(response) = authorize(&req, &[]) {
        return response;
    }

    HttpResponse::Ok().json(&store.categories)
}

#[get("/checklists/catalog")]
pub async fn get_catalog(
    query: web::Query<CatalogQuery>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[]) {
        return response;
    }

    let checklists = match query.category.as_deref().filter(|c| !c.is_empty()) {
        Some(category_id) => {
            ChecklistCategory::checklists_by_category(&store.categories, category_id)
        }
        None => ChecklistCategory::all_checklists(&store.categories),
    };

    HttpResponse::Ok().json(checklists)
}

#[get("/checklists")]
pub async fn get_checklists(store: web::Data<Store>, req: HttpRequest) -> HttpResponse {
    if let Err(response) = authorize(&req, &[]) {
        return response;
    }

    match ChecklistInstance::find_many(&store).await {
        Ok(instances) => HttpResponse::Ok().json(instances),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}

#[get("/checklists/{checklist_id}")]
pub async fn get_checklist(
    checklist_id: web::Path<String>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[]) {
        return response;
    }

    match ChecklistInstance::find_by_id(&store, &checklist_id).await {
        Ok(Some(instance)) => HttpResponse::Ok().json(instance),
        Ok(None) => HttpResponse::NotFound().body("CHECKLIST_NOT_FOUND"),
        Err(error) => HttpResponse::InternalServerError().body(error),
    }
}

#[post("/checklists")]
pub async fn create_checklist(
    payload: web::Json<ChecklistRequest>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let session = match authorize(&req, &EDITOR_ROLES) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let payload = payload.into_inner();
    let title = payload.title.clone();

    let id = match ChecklistInstance::create(&store, payload).await {
        Ok(id) => id,
        Err(error) => return HttpResponse::BadRequest().body(error),
    };

    let (user_id, user_name) = match User::find_by_email(&store, &session.email).await {
        Ok(Some(user)) => (user.id, user.full_name),
        _ => (session.email.clone(), session.email.clone()),
    };
    if let Err(error) = AuditLogEntry::record(
        &store,
        &user_id,
        &user_name,
        AuditAction::Create,
        AuditResourceKind::Checklist,
        &id,
        &title,
        "Creación de checklist".to_string(),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Created().body(id)
}

#[put("/checklists/{checklist_id}")]
pub async fn update_checklist(
    checklist_id: web::Path<String>,
    payload: web::Json<ChecklistRequest>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let session = match authorize(&req, &EDITOR_ROLES) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let payload = payload.into_inner();
    let title = payload.title.clone();

    let id = match ChecklistInstance::update(&store, &checklist_id, payload).await {
        Ok(id) => id,
        Err(error) => {
            return match error.as_str() {
                "CHECKLIST_NOT_FOUND" => HttpResponse::NotFound().body(error),
                "STORE_POISONED" => HttpResponse::InternalServerError().body(error),
                _ => HttpResponse::BadRequest().body(error),
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
        AuditAction::Update,
        AuditResourceKind::Checklist,
        &id,
        &title,
        "Actualización de checklist".to_string(),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Ok().body(id)
}

#[post("/checklists/{checklist_id}/start")]
pub async fn start_checklist(
    checklist_id: web::Path<String>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &[]) {
        return response;
    }

    match ChecklistInstance::start(&store, &checklist_id).await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(error) => match error.as_str() {
            "CHECKLIST_NOT_FOUND" => HttpResponse::NotFound().body(error),
            "STORE_POISONED" => HttpResponse::InternalServerError().body(error),
            _ => HttpResponse::BadRequest().body(error),
        },
    }
}

#[put("/checklists/{checklist_id}/items/{item_id}")]
pub async fn update_checklist_item(
    path: web::Path<(String, String)>,
    payload: web::Json<ChecklistItemUpdate>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let session = match authorize(&req, &[]) {
        Ok(session) => session,
        Err(response) => return response,
    };
    let (checklist_id, item_id) = path.into_inner();

    let item = match ChecklistInstance::update_item(
        &store,
        &checklist_id,
        &item_id,
        payload.into_inner(),
    )
    .await
    {
        Ok(item) => item,
        Err(error) => {
            return match error.as_str() {
                "CHECKLIST_NOT_FOUND" | "ITEM_NOT_FOUND" => HttpResponse::NotFound().body(error),
                "STORE_POISONED" => HttpResponse::InternalServerError().body(error),
                _ => HttpResponse::BadRequest().body(error),
            }
        }
    };

    let instance = match ChecklistInstance::find_by_id(&store, &checklist_id).await {
        Ok(Some(instance)) => instance,
        Ok(None) => return HttpResponse::NotFound().body("CHECKLIST_NOT_FOUND"),
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };
    let (user_id, user_name) = match User::find_by_email(&store, &session.email).await {
        Ok(Some(user)) => (user.id, user.full_name),
        _ => (session.email.clone(), session.email.clone()),
    };
    if let Err(error) = AuditLogEntry::record(
        &store,
        &user_id,
        &user_name,
        AuditAction::Update,
        AuditResourceKind::Checklist,
        &instance.id,
        &instance.title,
        "Actualización de ítems del checklist".to_string(),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Ok().json(item)
}

#[post("/checklists/{checklist_id}/complete")]
pub async fn complete_checklist(
    checklist_id: web::Path<String>,
    store: web::Data<Store>,
    req: HttpRequest,
) -> HttpResponse {
    let session = match authorize(&req, &[]) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let status = match ChecklistInstance::complete(&store, &checklist_id).await {
        Ok(status) => status,
        Err(error) => {
            return match error.as_str() {
                "CHECKLIST_NOT_FOUND" => HttpResponse::NotFound().body(error),
                "STORE_POISONED" => HttpResponse::InternalServerError().body(error),
                _ => HttpResponse::BadRequest().body(error),
            }
        }
    };

    let instance = match ChecklistInstance::find_by_id(&store, &checklist_id).await {
        Ok(Some(instance)) => instance,
        Ok(None) => return HttpResponse::NotFound().body("CHECKLIST_NOT_FOUND"),
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };

    if let Err(error) = Notification::push(
        &store,
        NotificationKind::Success,
        "Checklist completado",
        format!("El checklist \"{}\" fue completado exitosamente.", instance.title),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    let (user_id, user_name) = match User::find_by_email(&store, &session.email).await {
        Ok(Some(user)) => (user.id, user.full_name),
        _ => (session.email.clone(), session.email.clone()),
    };
    if let Err(error) = AuditLogEntry::record(
        &store,
        &user_id,
        &user_name,
        AuditAction::Update,
        AuditResourceKind::Checklist,
        &instance.id,
        &instance.title,
        "Checklist completado".to_string(),
        &client_ip(&req),
    )
    .await
    {
        return HttpResponse::InternalServerError().body(error);
    }

    HttpResponse::Ok().json(status)
}
