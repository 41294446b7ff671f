pub mod audit;
pub mod checklist;
pub mod job_position;
pub mod notification;
pub mod role;
pub mod session;
pub mod system_config;
pub mod user;
