use crate::database::Store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub async fn push(
        store: &Store,
        kind: NotificationKind,
        title: &str,
        message: String,
    ) -> Result<String, String> {
        let notification = Notification {
            id: store.mint_id("ntf"),
            kind,
            title: title.to_string(),
            message,
            created_at: Utc::now(),
        };
        let id = notification.id.clone();

        store
            .notifications
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?
            .push(notification);

        Ok(id)
    }

    /// Visible notifications, newest first.
    pub async fn find_many(store: &Store) -> Result<Vec<Notification>, String> {
        let notifications = store
            .notifications
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        let mut visible: Vec<Notification> = notifications.clone();
        visible.reverse();
        Ok(visible)
    }

    pub async fn dismiss(store: &Store, id: &str) -> Result<(), String> {
        let mut notifications = store
            .notifications
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        match notifications
            .iter()
            .position(|notification| notification.id == id)
        {
            Some(index) => {
                notifications.remove(index);
                Ok(())
            }
            None => Err("NOTIFICATION_NOT_FOUND".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Store;

    #[actix_web::test]
    async fn push_list_dismiss() {
        let store = Store::seed("test-secret".to_string());

        let first = Notification::push(
            &store,
            NotificationKind::Success,
            "Checklist completado",
            "Checklist completado con éxito".to_string(),
        )
        .await
        .unwrap();
        let second = Notification::push(
            &store,
            NotificationKind::Warning,
            "Checklist vencido",
            "Hay checklists pendientes vencidos".to_string(),
        )
        .await
        .unwrap();

        let visible = Notification::find_many(&store).await.unwrap();
        assert_eq!(visible[0].id, second);

        Notification::dismiss(&store, &first).await.unwrap();
        let visible = Notification::find_many(&store).await.unwrap();
        assert!(visible.iter().all(|notification| notification.id != first));

        assert_eq!(
            Notification::dismiss(&store, &first).await.unwrap_err(),
            "NOTIFICATION_NOT_FOUND"
        );
    }
}
