use crate::database::Store;
use crate::models::role::Role;
use chrono::{DateTime, Utc};
use pwhash::bcrypt;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn parse(value: &str) -> Option<UserStatus> {
        match value {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub job_position_id: Option<String>,
    pub assigned_checklists: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UserRequest {
    pub full_name: String,
    pub email: String,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
    pub role: Role,
    pub status: Option<UserStatus>,
    pub job_position_id: Option<String>,
    pub position_change_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub job_position_id: Option<String>,
    pub assigned_checklists: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UserChecklistAssignmentRequest {
    pub checklist_ids: Vec<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            last_login: user.last_login,
            created_at: user.created_at,
            job_position_id: user.job_position_id.clone(),
            assigned_checklists: user.assigned_checklists.clone(),
        }
    }
}

impl User {
    /// Filter predicate: case-insensitive substring on full name or
    /// email; role/status are exact matches, with `all` (or an absent
    /// field) as the match-everything sentinel.
    pub fn matches(&self, filter: &UserFilter) -> bool {
        if let Some(search) = &filter.search {
            if !search.is_empty() {
                let needle = search.to_lowercase();
                if !self.full_name.to_lowercase().contains(&needle)
                    && !self.email.to_lowercase().contains(&needle)
                {
                    return false;
                }
            }
        }
        if let Some(role) = filter.role.as_deref() {
            if role != "all" && Role::parse(role) != Some(self.role) {
                return false;
            }
        }
        if let Some(status) = filter.status.as_deref() {
            if status != "all" && UserStatus::parse(status) != Some(self.status) {
                return false;
            }
        }
        true
    }

    pub async fn find_many(store: &Store, filter: &UserFilter) -> Result<Vec<UserResponse>, String> {
        let users = store
            .users
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        Ok(users
            .iter()
            .filter(|user| user.matches(filter))
            .map(UserResponse::from)
            .collect())
    }

    pub async fn find_by_id(store: &Store, id: &str) -> Result<Option<User>, String> {
        let users = store
            .users
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    pub async fn find_by_email(store: &Store, email: &str) -> Result<Option<User>, String> {
        let users = store
            .users
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        Ok(users.iter().find(|user| user.email == email).cloned())
    }

    pub async fn save(&mut self, store: &Store) -> Result<String, String> {
        self.id = store.mint_id("usr");

        if let Ok(hash) = bcrypt::hash(&self.password) {
            self.password = hash;
            store
                .users
                .write()
                .map_err(|_| "STORE_POISONED".to_string())?
                .push(self.clone());
            Ok(self.id.clone())
        } else {
            Err("HASHING_FAILED".to_string())
        }
    }

    pub async fn update(&self, store: &Store, rehash: bool) -> Result<String, String> {
        let mut updated = self.clone();
        if rehash {
            updated.password =
                bcrypt::hash(&self.password).map_err(|_| "HASHING_FAILED".to_string())?;
        }

        let mut users = store
            .users
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        match users.iter_mut().find(|user| user.id == self.id) {
            Some(slot) => {
                *slot = updated;
                Ok(self.id.clone())
            }
            None => Err("USER_NOT_FOUND".to_string()),
        }
    }

    pub async fn delete_by_id(store: &Store, id: &str) -> Result<User, String> {
        let mut users = store
            .users
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        match users.iter().position(|user| user.id == id) {
            Some(index) => Ok(users.remove(index)),
            None => Err("USER_NOT_FOUND".to_string()),
        }
    }

    pub async fn assign_checklists(
        store: &Store,
        id: &str,
        checklist_ids: &[String],
    ) -> Result<UserResponse, String> {
        let mut users = store
            .users
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        let user = users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| "USER_NOT_FOUND".to_string())?;

        if !user.role.is_assignable() {
            return Err("USER_NOT_ASSIGNABLE".to_string());
        }

        let mut assigned: Vec<String> = Vec::new();
        for checklist_id in checklist_ids {
            if !assigned.contains(checklist_id) {
                assigned.push(checklist_id.clone());
            }
        }
        user.assigned_checklists = assigned;

        Ok(UserResponse::from(&*user))
    }

    pub async fn stamp_last_login(store: &Store, email: &str) -> Result<(), String> {
        let mut users = store
            .users
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        if let Some(user) = users.iter_mut().find(|user| user.email == email) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(full_name: &str, email: &str, role: Role, status: UserStatus) -> User {
        User {
            id: "usr-test".to_string(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: String::new(),
            role,
            status,
            last_login: None,
            created_at: Utc::now(),
            job_position_id: None,
            assigned_checklists: Vec::new(),
        }
    }

    fn filter(search: &str, role: &str, status: &str) -> UserFilter {
        UserFilter {
            search: Some(search.to_string()),
            role: Some(role.to_string()),
            status: Some(status.to_string()),
        }
    }

    #[test]
    fn search_matches_name_case_insensitively() {
        let maria = user(
            "María González",
            "maria.gonzalez@minera.com",
            Role::Operational,
            UserStatus::Active,
        );
        let carlos = user(
            "Carlos",
            "carlos@minera.com",
            Role::Operational,
            UserStatus::Active,
        );

        let criteria = filter("mar", "all", "active");
        assert!(maria.matches(&criteria));
        assert!(!carlos.matches(&criteria));
    }

    #[test]
    fn search_matches_email_substring() {
        let maria = user(
            "María González",
            "maria.gonzalez@minera.com",
            Role::Operational,
            UserStatus::Active,
        );
        assert!(maria.matches(&filter("gonzalez@", "all", "all")));
    }

    #[test]
    fn role_and_status_are_exact_filters() {
        let maria = user(
            "María González",
            "maria.gonzalez@minera.com",
            Role::Operational,
            UserStatus::Active,
        );

        assert!(maria.matches(&filter("", "operational", "active")));
        assert!(!maria.matches(&filter("", "supervisor", "active")));
        assert!(!maria.matches(&filter("", "operational", "inactive")));
    }

    #[test]
    fn absent_filter_fields_match_everything() {
        let maria = user(
            "María González",
            "maria.gonzalez@minera.com",
            Role::Operational,
            UserStatus::Active,
        );
        assert!(maria.matches(&UserFilter {
            search: None,
            role: None,
            status: None,
        }));
    }
}
