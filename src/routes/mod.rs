use actix_web::web;

pub mod audit;
pub mod checklist;
pub mod job_position;
pub mod notification;
pub mod report;
pub mod session;
pub mod system_config;
pub mod user;

/// Shared by the binary and the integration tests. `get_catalog` must be
/// registered before `get_checklist` so the literal `/checklists/catalog`
/// path wins over the `{checklist_id}` match.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(session::login)
        .service(session::logout)
        .service(session::me)
        .service(session::register)
        .service(user::get_users)
        .service(user::create_user)
        .service(user::assign_user_checklists)
        .service(user::get_user_position_history)
        .service(user::get_user)
        .service(user::update_user)
        .service(user::delete_user)
        .service(checklist::get_categories)
        .service(checklist::get_catalog)
        .service(checklist::get_checklists)
        .service(checklist::create_checklist)
        .service(checklist::start_checklist)
        .service(checklist::update_checklist_item)
        .service(checklist::complete_checklist)
        .service(checklist::get_checklist)
        .service(checklist::update_checklist)
        .service(job_position::get_job_positions)
        .service(job_position::create_job_position)
        .service(job_position::assign_position_checklists)
        .service(job_position::get_job_position)
        .service(job_position::update_job_position)
        .service(job_position::delete_job_position)
        .service(audit::get_audit_log)
        .service(audit::export_audit_log)
        .service(system_config::get_system_config)
        .service(system_config::update_system_config)
        .service(notification::get_notifications)
        .service(notification::dismiss_notification)
        .service(report::get_dashboard)
        .service(report::get_reports)
        .service(report::get_admin_dashboard);
}
