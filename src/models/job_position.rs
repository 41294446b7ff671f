use crate::database::Store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct JobPosition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub operational_role: String,
    pub job_title: String,
    pub default_checklists: Vec<String>,
    pub required_supervisor: bool,
    pub required_preventionist: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct JobPositionRequest {
    pub name: String,
    pub description: String,
    pub operational_role: String,
    pub job_title: String,
    pub default_checklists: Option<Vec<String>>,
    pub required_supervisor: bool,
    pub required_preventionist: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct JobPositionAssignmentRequest {
    pub checklist_ids: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct JobPositionHistory {
    pub id: String,
    pub user_id: String,
    pub old_position: Option<String>,
    pub new_position: String,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl JobPositionRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("POSITION_MUST_HAVE_NAME".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("POSITION_MUST_HAVE_DESCRIPTION".to_string());
        }
        if self.job_title.trim().is_empty() {
            return Err("POSITION_MUST_HAVE_JOB_TITLE".to_string());
        }
        Ok(())
    }
}

impl JobPosition {
    pub async fn find_many(store: &Store) -> Result<Vec<JobPosition>, String> {
        let positions = store
            .job_positions
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        Ok(positions.clone())
    }

    pub async fn find_by_id(store: &Store, id: &str) -> Result<Option<JobPosition>, String> {
        let positions = store
            .job_positions
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        Ok(positions.iter().find(|position| position.id == id).cloned())
    }

    pub async fn save(store: &Store, request: JobPositionRequest) -> Result<String, String> {
        request.validate()?;

        let now = Utc::now();
        let position = JobPosition {
            id: store.mint_id("pos"),
            name: request.name,
            description: request.description,
            operational_role: request.operational_role,
            job_title: request.job_title,
            default_checklists: dedup(request.default_checklists.unwrap_or_default()),
            required_supervisor: request.required_supervisor,
            required_preventionist: request.required_preventionist,
            created_at: now,
            updated_at: now,
        };
        let id = position.id.clone();

        store
            .job_positions
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?
            .push(position);

        Ok(id)
    }

    pub async fn update(
        store: &Store,
        id: &str,
        request: JobPositionRequest,
    ) -> Result<JobPosition, String> {
        request.validate()?;

        let mut positions = store
            .job_positions
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        let position = positions
            .iter_mut()
            .find(|position| position.id == id)
            .ok_or_else(|| "POSITION_NOT_FOUND".to_string())?;

        position.name = request.name;
        position.description = request.description;
        position.operational_role = request.operational_role;
        position.job_title = request.job_title;
        if let Some(default_checklists) = request.default_checklists {
            position.default_checklists = dedup(default_checklists);
        }
        position.required_supervisor = request.required_supervisor;
        position.required_preventionist = request.required_preventionist;
        position.updated_at = Utc::now();

        Ok(position.clone())
    }

    pub async fn delete_by_id(store: &Store, id: &str) -> Result<JobPosition, String> {
        let mut positions = store
            .job_positions
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        match positions.iter().position(|position| position.id == id) {
            Some(index) => Ok(positions.remove(index)),
            None => Err("POSITION_NOT_FOUND".to_string()),
        }
    }

    /// Replaces the default-checklist set with the final selection the
    /// caller toggled together and stamps `updated_at`. The ids are not
    /// validated against the catalog.
    pub async fn assign_checklists(
        store: &Store,
        id: &str,
        checklist_ids: &[String],
    ) -> Result<JobPosition, String> {
        let mut positions = store
            .job_positions
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        let position = positions
            .iter_mut()
            .find(|position| position.id == id)
            .ok_or_else(|| "POSITION_NOT_FOUND".to_string())?;

        position.default_checklists = dedup(checklist_ids.to_vec());
        position.updated_at = Utc::now();

        Ok(position.clone())
    }
}

impl JobPositionHistory {
    pub async fn record(
        store: &Store,
        user_id: &str,
        old_position: Option<String>,
        new_position: &str,
        changed_by: &str,
        reason: Option<String>,
    ) -> Result<String, String> {
        let entry = JobPositionHistory {
            id: store.mint_id("jph"),
            user_id: user_id.to_string(),
            old_position,
            new_position: new_position.to_string(),
            changed_by: changed_by.to_string(),
            changed_at: Utc::now(),
            reason,
        };
        let id = entry.id.clone();

        store
            .position_history
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?
            .push(entry);

        Ok(id)
    }

    pub async fn find_by_user(store: &Store, user_id: &str) -> Result<Vec<JobPositionHistory>, String> {
        let history = store
            .position_history
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        Ok(history
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect())
    }
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Store;

    #[actix_web::test]
    async fn assignment_replaces_set_and_stamps_updated_at() {
        let store = Store::seed("test-secret".to_string());
        let before = JobPosition::find_by_id(&store, "rigger")
            .await
            .unwrap()
            .unwrap();

        let ids = vec!["gen-1".to_string(), "cri-1".to_string()];
        let after = JobPosition::assign_checklists(&store, "rigger", &ids)
            .await
            .unwrap();

        assert_eq!(after.default_checklists, ids);
        assert!(after.updated_at > before.updated_at);
    }

    #[actix_web::test]
    async fn assignment_deduplicates_toggled_ids() {
        let store = Store::seed("test-secret".to_string());
        let ids = vec![
            "gen-1".to_string(),
            "cri-1".to_string(),
            "gen-1".to_string(),
        ];

        let after = JobPosition::assign_checklists(&store, "rigger", &ids)
            .await
            .unwrap();
        assert_eq!(
            after.default_checklists,
            vec!["gen-1".to_string(), "cri-1".to_string()]
        );
    }

    #[actix_web::test]
    async fn create_requires_descriptive_fields() {
        let store = Store::seed("test-secret".to_string());
        let request = JobPositionRequest {
            name: " ".to_string(),
            description: "Opera camiones".to_string(),
            operational_role: "Usuario Operacional".to_string(),
            job_title: "Operador".to_string(),
            default_checklists: None,
            required_supervisor: true,
            required_preventionist: true,
        };

        assert_eq!(
            JobPosition::save(&store, request).await.unwrap_err(),
            "POSITION_MUST_HAVE_NAME"
        );
    }
}
