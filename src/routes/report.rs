use actix_web::{get, web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::database::Store;
use crate::models::{
    checklist::{ChecklistInstance, ChecklistKind, ChecklistStatus},
    job_position::JobPosition,
    role::Role,
    session::authorize,
    user::{User, UserFilter, UserStatus},
};

#[derive(Serialize)]
struct StatusSummary {
    total: usize,
    pending: usize,
    in_progress: usize,
    completed: usize,
}

#[derive(Serialize)]
struct DashboardSummary {
    checklists: StatusSummary,
    pending_for_me: Vec<ChecklistInstance>,
}

#[derive(Serialize)]
struct KindBreakdown {
    kind: ChecklistKind,
    total: usize,
    completed: usize,
}

#[derive(Serialize)]
struct ComplianceReport {
    total: usize,
    completed: usize,
    completion_rate: f64,
    items_total: usize,
    items_completed: usize,
    by_kind: Vec<KindBreakdown>,
}

#[derive(Serialize)]
struct RoleCount {
    role: Role,
    total: usize,
}

#[derive(Serialize)]
struct AdminDashboard {
    users_total: usize,
    users_active: usize,
    users_by_role: Vec<RoleCount>,
    positions_total: usize,
    positions_with_defaults: usize,
    checklists: StatusSummary,
    audit_entries: usize,
}

const ALL_ROLES: [Role; 5] = [
    Role::Admin,
    Role::ContractAdmin,
    Role::Preventionist,
    Role::Supervisor,
    Role::Operational,
];

const ALL_KINDS: [ChecklistKind; 6] = [
    ChecklistKind::Equipment,
    ChecklistKind::Mining,
    ChecklistKind::Explosives,
    ChecklistKind::Transport,
    ChecklistKind::Maintenance,
    ChecklistKind::Emergency,
];

fn summarize(instances: &[ChecklistInstance]) -> StatusSummary {
    let count =
        |status: ChecklistStatus| instances.iter().filter(|i| i.status == status).count();

    StatusSummary {
        total: instances.len(),
        pending: count(ChecklistStatus::Pending),
        in_progress: count(ChecklistStatus::InProgress),
        completed: count(ChecklistStatus::Completed),
    }
}

#[get("/dashboard")]
pub async fn get_dashboard(store: web::Data<Store>, req: HttpRequest) -> HttpResponse {
    let session = match authorize(&req, &[]) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let instances = match ChecklistInstance::find_many(&store).await {
        Ok(instances) => instances,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };

    // Instances are assigned by display name.
    let full_name = match User::find_by_email(&store, &session.email).await {
        Ok(Some(user)) => user.full_name,
        _ => session.email.clone(),
    };
    let pending_for_me: Vec<ChecklistInstance> = instances
        .iter()
        .filter(|instance| {
            instance.assigned_to == full_name && instance.status != ChecklistStatus::Completed
        })
        .cloned()
        .collect();

    HttpResponse::Ok().json(DashboardSummary {
        checklists: summarize(&instances),
        pending_for_me,
    })
}

#[get("/reports")]
pub async fn get_reports(store: web::Data<Store>, req: HttpRequest) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin, Role::Preventionist]) {
        return response;
    }

    let instances = match ChecklistInstance::find_many(&store).await {
        Ok(instances) => instances,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };

    let completed = instances
        .iter()
        .filter(|instance| instance.status == ChecklistStatus::Completed)
        .count();
    let (items_completed, items_total) = instances.iter().fold((0, 0), |(done, total), instance| {
        let (instance_done, instance_total) = instance.progress();
        (done + instance_done, total + instance_total)
    });
    let completion_rate = if instances.is_empty() {
        0.0
    } else {
        completed as f64 / instances.len() as f64
    };

    let by_kind = ALL_KINDS
        .iter()
        .map(|&kind| KindBreakdown {
            kind,
            total: instances.iter().filter(|i| i.kind == kind).count(),
            completed: instances
                .iter()
                .filter(|i| i.kind == kind && i.status == ChecklistStatus::Completed)
                .count(),
        })
        .filter(|breakdown| breakdown.total > 0)
        .collect();

    HttpResponse::Ok().json(ComplianceReport {
        total: instances.len(),
        completed,
        completion_rate,
        items_total,
        items_completed,
        by_kind,
    })
}

#[get("/admin/dashboard")]
pub async fn get_admin_dashboard(store: web::Data<Store>, req: HttpRequest) -> HttpResponse {
    if let Err(response) = authorize(&req, &[Role::Admin]) {
        return response;
    }

    let users = match User::find_many(
        &store,
        &UserFilter {
            search: None,
            role: None,
            status: None,
        },
    )
    .await
    {
        Ok(users) => users,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };
    let instances = match ChecklistInstance::find_many(&store).await {
        Ok(instances) => instances,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };
    let positions = match JobPosition::find_many(&store).await {
        Ok(positions) => positions,
        Err(error) => return HttpResponse::InternalServerError().body(error),
    };
    let audit_entries = match store.audit_log.read() {
        Ok(log) => log.len(),
        Err(_) => return HttpResponse::InternalServerError().body("STORE_POISONED"),
    };

    HttpResponse::Ok().json(AdminDashboard {
        users_total: users.len(),
        users_active: users
            .iter()
            .filter(|user| user.status == UserStatus::Active)
            .count(),
        users_by_role: ALL_ROLES
            .iter()
            .map(|&role| RoleCount {
                role,
                total: users.iter().filter(|user| user.role == role).count(),
            })
            .collect(),
        positions_total: positions.len(),
        positions_with_defaults: positions
            .iter()
            .filter(|position| !position.default_checklists.is_empty())
            .count(),
        checklists: summarize(&instances),
        audit_entries,
    })
}
