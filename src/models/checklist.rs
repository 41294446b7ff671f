use crate::database::Store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistKind {
    Equipment,
    Mining,
    Explosives,
    Transport,
    Maintenance,
    Emergency,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChecklistInfo {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: ChecklistKind,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChecklistCategory {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub checklists: Vec<ChecklistInfo>,
}

impl ChecklistCategory {
    /// Flattened catalog: category declaration order, then in-category
    /// order. Duplicate ids across categories are preserved as-is.
    pub fn all_checklists(categories: &[ChecklistCategory]) -> Vec<ChecklistInfo> {
        categories
            .iter()
            .flat_map(|category| category.checklists.iter().cloned())
            .collect()
    }

    /// Unknown category ids yield an empty list, never an error.
    pub fn checklists_by_category(
        categories: &[ChecklistCategory],
        category_id: &str,
    ) -> Vec<ChecklistInfo> {
        categories
            .iter()
            .find(|category| category.id == category_id)
            .map(|category| category.checklists.clone())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChecklistItem {
    pub id: String,
    pub description: String,
    pub required: bool,
    pub has_evidence: bool,
    pub completed: bool,
    pub evidence: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChecklistInstance {
    pub id: String,
    pub title: String,
    pub kind: ChecklistKind,
    pub status: ChecklistStatus,
    pub assigned_to: String,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChecklistItemRequest {
    pub description: String,
    pub required: bool,
    pub has_evidence: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChecklistRequest {
    pub title: String,
    pub kind: ChecklistKind,
    pub assigned_to: String,
    pub due_date: DateTime<Utc>,
    pub description: Option<String>,
    pub items: Vec<ChecklistItemRequest>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChecklistItemUpdate {
    pub completed: Option<bool>,
    pub evidence: Option<String>,
    pub notes: Option<String>,
}

impl ChecklistInstance {
    /// Completion gate, checked in order: first that every required item
    /// is checked, then that every checked evidence-bearing item carries
    /// a non-empty evidence value. Failure leaves the instance untouched.
    pub fn completion_gate(items: &[ChecklistItem]) -> Result<(), String> {
        if items.iter().any(|item| item.required && !item.completed) {
            return Err("REQUIRED_ITEMS_INCOMPLETE".to_string());
        }
        if items.iter().any(|item| {
            item.has_evidence
                && item.completed
                && item.evidence.as_deref().map_or(true, str::is_empty)
        }) {
            return Err("EVIDENCE_MISSING".to_string());
        }
        Ok(())
    }

    pub fn progress(&self) -> (usize, usize) {
        let completed = self.items.iter().filter(|item| item.completed).count();
        (completed, self.items.len())
    }

    pub async fn find_many(store: &Store) -> Result<Vec<ChecklistInstance>, String> {
        let instances = store
            .instances
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        Ok(instances.clone())
    }

    pub async fn find_by_id(store: &Store, id: &str) -> Result<Option<ChecklistInstance>, String> {
        let instances = store
            .instances
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        Ok(instances.iter().find(|instance| instance.id == id).cloned())
    }

    pub async fn create(store: &Store, request: ChecklistRequest) -> Result<String, String> {
        if request.title.trim().is_empty() {
            return Err("CHECKLIST_MUST_HAVE_TITLE".to_string());
        }
        if request.items.is_empty() {
            return Err("CHECKLIST_MUST_HAVE_ITEMS".to_string());
        }

        let id = store.mint_id("chk");
        let items = request
            .items
            .into_iter()
            .map(|item| ChecklistItem {
                id: store.mint_id("itm"),
                description: item.description,
                required: item.required,
                has_evidence: item.has_evidence,
                completed: false,
                evidence: None,
                notes: None,
            })
            .collect();

        let instance = ChecklistInstance {
            id: id.clone(),
            title: request.title,
            kind: request.kind,
            status: ChecklistStatus::Pending,
            assigned_to: request.assigned_to,
            due_date: request.due_date,
            created_at: Utc::now(),
            description: request.description,
            items,
        };

        store
            .instances
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?
            .push(instance);

        Ok(id)
    }

    pub async fn update(store: &Store, id: &str, request: ChecklistRequest) -> Result<String, String> {
        if request.title.trim().is_empty() {
            return Err("CHECKLIST_MUST_HAVE_TITLE".to_string());
        }

        let mut instances = store
            .instances
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        let instance = instances
            .iter_mut()
            .find(|instance| instance.id == id)
            .ok_or_else(|| "CHECKLIST_NOT_FOUND".to_string())?;

        if instance.status == ChecklistStatus::Completed {
            return Err("CHECKLIST_ALREADY_COMPLETED".to_string());
        }

        instance.title = request.title;
        instance.kind = request.kind;
        instance.assigned_to = request.assigned_to;
        instance.due_date = request.due_date;
        instance.description = request.description;

        Ok(instance.id.clone())
    }

    pub async fn start(store: &Store, id: &str) -> Result<ChecklistStatus, String> {
        let mut instances = store
            .instances
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        let instance = instances
            .iter_mut()
            .find(|instance| instance.id == id)
            .ok_or_else(|| "CHECKLIST_NOT_FOUND".to_string())?;

        match instance.status {
            ChecklistStatus::Pending => {
                instance.status = ChecklistStatus::InProgress;
                Ok(instance.status)
            }
            _ => Err("CHECKLIST_NOT_PENDING".to_string()),
        }
    }

    pub async fn update_item(
        store: &Store,
        id: &str,
        item_id: &str,
        update: ChecklistItemUpdate,
    ) -> Result<ChecklistItem, String> {
        let mut instances = store
            .instances
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        let instance = instances
            .iter_mut()
            .find(|instance| instance.id == id)
            .ok_or_else(|| "CHECKLIST_NOT_FOUND".to_string())?;

        if instance.status == ChecklistStatus::Completed {
            return Err("CHECKLIST_ALREADY_COMPLETED".to_string());
        }

        let item = instance
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| "ITEM_NOT_FOUND".to_string())?;

        if let Some(completed) = update.completed {
            item.completed = completed;
        }
        if let Some(evidence) = update.evidence {
            item.evidence = Some(evidence);
        }
        if let Some(notes) = update.notes {
            item.notes = Some(notes);
        }

        Ok(item.clone())
    }

    pub async fn complete(store: &Store, id: &str) -> Result<ChecklistStatus, String> {
        let mut instances = store
            .instances
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        let instance = instances
            .iter_mut()
            .find(|instance| instance.id == id)
            .ok_or_else(|| "CHECKLIST_NOT_FOUND".to_string())?;

        if instance.status == ChecklistStatus::Completed {
            return Err("CHECKLIST_ALREADY_COMPLETED".to_string());
        }

        Self::completion_gate(&instance.items)?;
        instance.status = ChecklistStatus::Completed;

        Ok(instance.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(required: bool, has_evidence: bool, completed: bool, evidence: Option<&str>) -> ChecklistItem {
        ChecklistItem {
            id: "itm-test".to_string(),
            description: "Verificar nivel de aceite".to_string(),
            required,
            has_evidence,
            completed,
            evidence: evidence.map(str::to_string),
            notes: None,
        }
    }

    fn catalog() -> Vec<ChecklistCategory> {
        vec![
            ChecklistCategory {
                id: "general".to_string(),
                name: "Checklists Generales".to_string(),
                description: None,
                checklists: vec![
                    ChecklistInfo {
                        id: "gen-1".to_string(),
                        title: "Checklist diario de seguridad general".to_string(),
                        description: None,
                        kind: ChecklistKind::Equipment,
                    },
                    ChecklistInfo {
                        id: "gen-2".to_string(),
                        title: "Checklist semanal de seguridad general".to_string(),
                        description: None,
                        kind: ChecklistKind::Equipment,
                    },
                ],
            },
            ChecklistCategory {
                id: "transport".to_string(),
                name: "Transporte".to_string(),
                description: None,
                checklists: vec![ChecklistInfo {
                    // Same id on purpose: duplicates across categories
                    // must be preserved by the flattened view.
                    id: "gen-1".to_string(),
                    title: "Checklist de vehículos livianos".to_string(),
                    description: None,
                    kind: ChecklistKind::Transport,
                }],
            },
        ]
    }

    #[test]
    fn flattened_catalog_keeps_order_and_duplicates() {
        let categories = catalog();
        let all = ChecklistCategory::all_checklists(&categories);

        let expected: usize = categories
            .iter()
            .map(|category| category.checklists.len())
            .sum();
        assert_eq!(all.len(), expected);
        assert_eq!(all[0].id, "gen-1");
        assert_eq!(all[1].id, "gen-2");
        assert_eq!(all[2].id, "gen-1");
    }

    #[test]
    fn unknown_category_yields_empty_list() {
        let categories = catalog();
        assert!(ChecklistCategory::checklists_by_category(&categories, "no-such").is_empty());
    }

    #[test]
    fn gate_rejects_unchecked_required_items() {
        let items = vec![item(true, false, false, None), item(false, false, true, None)];
        assert_eq!(
            ChecklistInstance::completion_gate(&items).unwrap_err(),
            "REQUIRED_ITEMS_INCOMPLETE"
        );
    }

    #[test]
    fn gate_rejects_completed_evidence_items_without_evidence() {
        let items = vec![item(true, true, true, None)];
        assert_eq!(
            ChecklistInstance::completion_gate(&items).unwrap_err(),
            "EVIDENCE_MISSING"
        );

        let items = vec![item(true, true, true, Some(""))];
        assert_eq!(
            ChecklistInstance::completion_gate(&items).unwrap_err(),
            "EVIDENCE_MISSING"
        );
    }

    #[test]
    fn gate_ignores_evidence_on_unchecked_optional_items() {
        // An evidence-bearing item that was never checked does not block
        // completion; only completed ones must carry evidence.
        let items = vec![
            item(true, false, true, None),
            item(false, true, false, None),
        ];
        assert!(ChecklistInstance::completion_gate(&items).is_ok());
    }

    #[test]
    fn gate_accepts_fully_satisfied_items() {
        let items = vec![
            item(true, true, true, Some("foto-neumaticos.jpg")),
            item(false, false, false, None),
        ];
        assert!(ChecklistInstance::completion_gate(&items).is_ok());
    }

    #[actix_web::test]
    async fn start_moves_pending_to_in_progress_exactly_once() {
        let store = crate::database::Store::seed("test-secret".to_string());

        // chk-3 is seeded pending, chk-1 already in progress.
        assert_eq!(
            ChecklistInstance::start(&store, "chk-3").await.unwrap(),
            ChecklistStatus::InProgress
        );
        assert_eq!(
            ChecklistInstance::start(&store, "chk-3").await.unwrap_err(),
            "CHECKLIST_NOT_PENDING"
        );
        assert_eq!(
            ChecklistInstance::start(&store, "chk-1").await.unwrap_err(),
            "CHECKLIST_NOT_PENDING"
        );
        assert_eq!(
            ChecklistInstance::start(&store, "chk-999").await.unwrap_err(),
            "CHECKLIST_NOT_FOUND"
        );
    }

    #[actix_web::test]
    async fn complete_is_rejected_and_state_unchanged_when_gate_fails() {
        let store = crate::database::Store::seed("test-secret".to_string());

        // Seeded instance chk-1 still has unchecked required items.
        assert_eq!(
            ChecklistInstance::complete(&store, "chk-1").await.unwrap_err(),
            "REQUIRED_ITEMS_INCOMPLETE"
        );
        let instance = ChecklistInstance::find_by_id(&store, "chk-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(instance.status, ChecklistStatus::InProgress);
    }

    #[actix_web::test]
    async fn items_become_read_only_after_completion() {
        let store = crate::database::Store::seed("test-secret".to_string());
        let instance = ChecklistInstance::find_by_id(&store, "chk-1")
            .await
            .unwrap()
            .unwrap();

        for item in &instance.items {
            ChecklistInstance::update_item(
                &store,
                "chk-1",
                &item.id,
                ChecklistItemUpdate {
                    completed: Some(true),
                    evidence: item.has_evidence.then(|| "evidencia.jpg".to_string()),
                    notes: None,
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(
            ChecklistInstance::complete(&store, "chk-1").await.unwrap(),
            ChecklistStatus::Completed
        );
        assert_eq!(
            ChecklistInstance::update_item(
                &store,
                "chk-1",
                "101",
                ChecklistItemUpdate {
                    completed: Some(false),
                    evidence: None,
                    notes: None,
                },
            )
            .await
            .unwrap_err(),
            "CHECKLIST_ALREADY_COMPLETED"
        );
    }
}
