use crate::database::Store;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderFrequency {
    Daily,
    Weekly,
    Never,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackupFrequency {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NotificationConfig {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub reminder_frequency: ReminderFrequency,
    pub notify_on_checklist_assignment: bool,
    pub notify_on_checklist_completion: bool,
    pub notify_on_due_date: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SecurityConfig {
    pub password_expiry_days: u32,
    pub session_timeout_minutes: u32,
    pub two_factor_auth: bool,
    pub login_attempts: u32,
    pub data_encryption: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BackupConfig {
    pub auto_backup: bool,
    pub backup_frequency: BackupFrequency,
    pub backup_time: String,
    pub retention_period_days: u32,
    pub include_attachments: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub maintenance_mode: bool,
    pub maintenance_message: String,
    pub system_language: String,
    pub date_format: String,
    pub time_format: String,
    pub timezone: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SystemConfig {
    pub notifications: NotificationConfig,
    pub security: SecurityConfig,
    pub backup: BackupConfig,
    pub system: GeneralConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            notifications: NotificationConfig {
                email_notifications: true,
                push_notifications: true,
                reminder_frequency: ReminderFrequency::Daily,
                notify_on_checklist_assignment: true,
                notify_on_checklist_completion: true,
                notify_on_due_date: true,
            },
            security: SecurityConfig {
                password_expiry_days: 90,
                session_timeout_minutes: 30,
                two_factor_auth: false,
                login_attempts: 3,
                data_encryption: true,
            },
            backup: BackupConfig {
                auto_backup: true,
                backup_frequency: BackupFrequency::Daily,
                backup_time: "02:00".to_string(),
                retention_period_days: 30,
                include_attachments: true,
            },
            system: GeneralConfig {
                maintenance_mode: false,
                maintenance_message: String::new(),
                system_language: "es".to_string(),
                date_format: "DD/MM/YYYY".to_string(),
                time_format: "24h".to_string(),
                timezone: "America/Santiago".to_string(),
            },
        }
    }
}

impl SystemConfig {
    pub async fn find(store: &Store) -> Result<SystemConfig, String> {
        let config = store
            .system_config
            .read()
            .map_err(|_| "STORE_POISONED".to_string())?;

        Ok(config.clone())
    }

    /// Whole-document replacement, as the panel saves all sections at
    /// once.
    pub async fn replace(store: &Store, config: SystemConfig) -> Result<(), String> {
        let mut current = store
            .system_config
            .write()
            .map_err(|_| "STORE_POISONED".to_string())?;

        *current = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Store;

    #[actix_web::test]
    async fn replace_swaps_the_whole_document() {
        let store = Store::seed("test-secret".to_string());

        let mut config = SystemConfig::find(&store).await.unwrap();
        config.system.maintenance_mode = true;
        config.system.maintenance_message = "Mantención programada".to_string();
        config.security.session_timeout_minutes = 15;

        SystemConfig::replace(&store, config).await.unwrap();

        let stored = SystemConfig::find(&store).await.unwrap();
        assert!(stored.system.maintenance_mode);
        assert_eq!(stored.security.session_timeout_minutes, 15);
    }
}
