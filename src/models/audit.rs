use crate::database::Store;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: usize = 10;
const PAGE_WINDOW: u32 = 5;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    Logout,
    Create,
    Update,
    Delete,
    View,
    Export,
    Assign,
}

impl AuditAction {
    pub fn parse(value: &str) -> Option<AuditAction> {
        match value {
            "login" => Some(AuditAction::Login),
            "logout" => Some(AuditAction::Logout),
            "create" => Some(AuditAction::Create),
            "update" => Some(AuditAction::Update),
            "delete" => Some(AuditAction::Delete),
            "view" => Some(AuditAction::View),
            "export" => Some(AuditAction::Export),
            "assign" => Some(AuditAction::Assign),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditResourceKind {
    User,
    Checklist,
    Report,
    SystemConfig,
}

impl AuditResourceKind {
    pub fn parse(value: &str) -> Option<AuditResourceKind> {
        match value {
            "user" => Some(AuditResourceKind::User),
            "checklist" => Some(AuditResourceKind::Checklist),
            "report" => Some(AuditResourceKind::Report),
            "system_config" => Some(AuditResourceKind::SystemConfig),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AuditLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub action: AuditAction,
    pub resource_type: AuditResourceKind,
    pub resource_id: String,
    pub resource_name: String,
    pub details: String,
    pub ip_address: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user: Option<String>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AuditLogPage {
    pub entries: Vec<AuditLogEntry>,
    pub total: usize,
    pub page: u32,
    pub total_pages: u32,
    pub page_numbers: Vec<u32>,
}

fn day_start(value: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Utc.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single()
}

fn day_end(value: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Utc.from_local_datetime(&date.and_hms_opt(23, 59, 59)?)
        .single()
}

impl AuditLogEntry {
    /// Date range is inclusive on whole days; `user` matches the id
    /// exactly or the name as a case-insensitive substring; action and
    /// resource kind are exact (empty string = any, like the UI's empty
    /// select option).
    pub fn matches(&self, query: &AuditLogQuery) -> bool {
        if let Some(start) = query.start_date.as_deref().filter(|s| !s.is_empty()) {
            match day_start(start) {
                Some(start) if self.timestamp >= start => {}
                _ => return false,
            }
        }
        if let Some(end) = query.end_date.as_deref().filter(|s| !s.is_empty()) {
            match day_end(end) {
                Some(end) if self.timestamp <= end => {}
                _ => return false,
            }
        }
        if let Some(user) = query.user.as_deref().filter(|s| !s.is_empty()) {
            if self.user_id != user
                && !self
                    .user_name
                    .to_lowercase()
                    .contains(&user.to_lowercase())
            {
                return false;
            }
        }
        if let Some(action) = query.action.as_deref().filter(|s| !s.is_empty()) {
            if AuditAction::parse(action) != Some(self.action) {
                return false;
            }
        }
        if let Some(kind) = query.resource_type.as_deref().filter(|s| !s.is_empty()) {
            if AuditResourceKind::parse(kind) != Some(self.resource_type) {
                return false;
            }
        }
        true
    }

    /// Five page-number buttons centered on the current page, clamped at
    /// both ends.
    pub fn page_window(current: u32, total_pages: u32) -> Vec<u32> {
        if total_pages <= PAGE_WINDOW {
            return (1..=total_pages).collect();
        }
        let first = if current <= 3 {
            1
        } else if current >= total_pages - 2 {
            total_pages - (PAGE_WINDOW - 1)
        } else {
            current - 2
        };
        (first..first + PAGE_WINDOW).collect()
    }

    /// Fixed-size pagination; a requested page beyond the last available
    /// page is clamped rather than answered with an empty page.
    pub fn paginate(filtered: Vec<AuditLogEntry>, requested: u32) -> AuditLogPage {
        let total = filtered.len();
        let total_pages = ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1) as u32;
        let page = requested.clamp(1, total_pages);

        let offset = (page as usize - 1) * PAGE_SIZE;
        let entries: Vec<AuditLogEntry> =
            filtered.into_iter().skip(offset).take(PAGE_SIZE).collect();

        AuditLogPage {
            entries,
            total,
            page,
            total_pages,
            page_numbers: Self::page_window(page, total_pages),
        }
    }

    pub async fn find_page(store: &Store, query: &AuditLogQuery) -> Result<AuditLogPage, String> {
        let log = store
            .audit_log
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        let filtered: Vec<AuditLogEntry> = log
            .iter()
            .filter(|entry| entry.matches(query))
            .cloned()
            .collect();

        Ok(Self::paginate(filtered, query.page.unwrap_or(1)))
    }

    pub async fn count_matching(store: &Store, query: &AuditLogQuery) -> Result<usize, String> {
        let log = store
            .audit_log
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        Ok(log.iter().filter(|entry| entry.matches(query)).count())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        store: &Store,
        user_id: &str,
        user_name: &str,
        action: AuditAction,
        resource_type: AuditResourceKind,
        resource_id: &str,
        resource_name: &str,
        details: String,
        ip_address: &str,
    ) -> Result<String, String> {
        let entry = AuditLogEntry {
            id: store.mint_id("log"),
            timestamp: Utc::now(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            action,
            resource_type,
            resource_id: resource_id.to_string(),
            resource_name: resource_name.to_string(),
            details,
            ip_address: ip_address.to_string(),
        };
        let id = entry.id.clone();

        store
            .audit_log
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?
            .push(entry);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize, timestamp: &str, user_name: &str, action: AuditAction) -> AuditLogEntry {
        AuditLogEntry {
            id: format!("log-{n}"),
            timestamp: timestamp.parse().unwrap(),
            user_id: format!("usr-{n}"),
            user_name: user_name.to_string(),
            action,
            resource_type: AuditResourceKind::Checklist,
            resource_id: "chk-1".to_string(),
            resource_name: "Inspección Camión Minero #456".to_string(),
            details: String::new(),
            ip_address: "10.0.0.1".to_string(),
        }
    }

    fn twelve_entries() -> Vec<AuditLogEntry> {
        (0..12)
            .map(|n| {
                entry(
                    n,
                    "2024-01-20T10:00:00Z",
                    "María González",
                    AuditAction::Update,
                )
            })
            .collect()
    }

    #[test]
    fn second_page_holds_the_remainder() {
        let page = AuditLogEntry::paginate(twelve_entries(), 2);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.entries[0].id, "log-10");
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let page = AuditLogEntry::paginate(twelve_entries(), 99);
        assert_eq!(page.page, 2);
        assert_eq!(page.entries.len(), 2);

        let page = AuditLogEntry::paginate(twelve_entries(), 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.entries.len(), 10);
    }

    #[test]
    fn empty_result_still_reports_one_page() {
        let page = AuditLogEntry::paginate(Vec::new(), 3);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.entries.is_empty());
    }

    #[test]
    fn page_window_is_centered_and_clamped() {
        assert_eq!(AuditLogEntry::page_window(1, 3), vec![1, 2, 3]);
        assert_eq!(AuditLogEntry::page_window(2, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(AuditLogEntry::page_window(6, 10), vec![4, 5, 6, 7, 8]);
        assert_eq!(AuditLogEntry::page_window(10, 10), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let e = entry(1, "2024-01-20T15:30:00Z", "María González", AuditAction::Login);

        let query = AuditLogQuery {
            start_date: Some("2024-01-20".to_string()),
            end_date: Some("2024-01-20".to_string()),
            ..Default::default()
        };
        assert!(e.matches(&query));

        let query = AuditLogQuery {
            end_date: Some("2024-01-19".to_string()),
            ..Default::default()
        };
        assert!(!e.matches(&query));
    }

    #[test]
    fn user_filter_matches_id_exactly_or_name_substring() {
        let e = entry(7, "2024-01-20T15:30:00Z", "María González", AuditAction::Login);

        let by_id = AuditLogQuery {
            user: Some("usr-7".to_string()),
            ..Default::default()
        };
        assert!(e.matches(&by_id));

        let by_name = AuditLogQuery {
            user: Some("gonzá".to_string()),
            ..Default::default()
        };
        assert!(e.matches(&by_name));

        let neither = AuditLogQuery {
            user: Some("usr-8".to_string()),
            ..Default::default()
        };
        assert!(!e.matches(&neither));
    }

    #[test]
    fn action_and_resource_filters_are_exact() {
        let e = entry(1, "2024-01-20T15:30:00Z", "María González", AuditAction::Login);

        let login = AuditLogQuery {
            action: Some("login".to_string()),
            ..Default::default()
        };
        assert!(e.matches(&login));

        let delete = AuditLogQuery {
            action: Some("delete".to_string()),
            ..Default::default()
        };
        assert!(!e.matches(&delete));

        let report = AuditLogQuery {
            resource_type: Some("report".to_string()),
            ..Default::default()
        };
        assert!(!e.matches(&report));
    }
}
