//! Application context: every model, built once from configuration.

use std::sync::Arc;

use tracing::info;

use crate::auth::{AuthModel, Backend};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::error::Result;
use crate::ids::IdIssuer;
use crate::storage::{FileStorage, MemoryStorage, Storage};
use crate::stores::{
    ClassList, DocumentControlModel, InstrumentBookingModel, KanbanModel, QualityModel, SafetyModel, ThemeModel,
};

/// Shared state handed to the view layer.
pub struct AppContext {
    pub config: AppConfig,
    pub storage: Arc<dyn Storage>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<IdIssuer>,
    /// Class list of the root presentation element.
    pub root: Arc<ClassList>,
    pub auth: AuthModel,
    pub theme: ThemeModel,
    pub documents: DocumentControlModel,
    pub kanban: KanbanModel,
    pub quality: QualityModel,
    pub safety: SafetyModel,
    pub bookings: InstrumentBookingModel,
}

impl AppContext {
    pub fn new(config: AppConfig, storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Result<Self> {
        let ids = Arc::new(IdIssuer::new());
        let root = Arc::new(ClassList::new());

        let auth = AuthModel::new(Backend::from_config(&config.auth, storage.clone())?, config.auth.dev_mode);
        let theme = ThemeModel::new(storage.clone(), root.clone(), config.ui.prefer_dark);

        Ok(Self {
            documents: DocumentControlModel::new(ids.clone(), clock.clone()),
            kanban: KanbanModel::new(ids.clone(), clock.clone()),
            quality: QualityModel::new(ids.clone(), clock.clone()),
            safety: SafetyModel::new(ids.clone(), clock.clone()),
            bookings: InstrumentBookingModel::new(config.booking.clone(), ids.clone(), clock.clone()),
            auth,
            theme,
            config,
            storage,
            clock,
            ids,
            root,
        })
    }

    /// Context over the real data directory and system clock.
    ///
    /// Dev mode keeps storage in memory so no session survives the run.
    pub fn open(config: AppConfig) -> Result<Self> {
        let storage: Arc<dyn Storage> = if config.auth.dev_mode {
            Arc::new(MemoryStorage::new())
        } else {
            let file = FileStorage::open_in(&config.data_dir())?;
            info!("Storage: {:?}", file.path());
            Arc::new(file)
        };
        Self::new(config, storage, Arc::new(SystemClock))
    }

    /// Apply the stored theme and restore the session.
    pub async fn init(&self) {
        self.theme.init();
        self.auth.init().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::NewNonConformity;
    use crate::models::{NcSeverity, NcSource};
    use crate::storage::THEME_KEY;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn context(config: AppConfig) -> AppContext {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        AppContext::new(config, Arc::new(MemoryStorage::new()), Arc::new(clock)).unwrap()
    }

    #[tokio::test]
    async fn test_dev_mode_context_is_signed_in() {
        let mut config = AppConfig::default();
        config.auth.dev_mode = true;
        let ctx = context(config);
        ctx.init().await;

        assert!(ctx.auth.is_authenticated());
        assert!(!ctx.documents.documents().is_empty());
        assert_eq!(ctx.bookings.instruments().len(), 5);
    }

    #[test]
    fn test_models_share_clock() {
        let ctx = context(AppConfig::default());
        let id = ctx.quality.add_nc(NewNonConformity {
            title: "Fume hood airflow below limit".to_string(),
            description: "Hood 3 reads 0.38 m/s".to_string(),
            source: NcSource::Safety,
            severity: NcSeverity::Major,
            assigned_to: None,
        });
        assert_eq!(id, "NC-2026-003");
        assert_eq!(
            ctx.quality.get(&id).unwrap().date_opened,
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
    }

    #[tokio::test]
    async fn test_open_uses_file_storage() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.storage.dir = Some(dir.path().to_path_buf());
        config.auth.login_delay_ms = 0;

        let ctx = AppContext::open(config.clone()).unwrap();
        ctx.init().await;
        ctx.theme.toggle();
        assert!(ctx.auth.login("admin@radioanalysis.com", "admin123").await);
        drop(ctx);

        let reopened = AppContext::open(config).unwrap();
        reopened.init().await;
        assert!(reopened.theme.is_dark());
        assert!(reopened.root.contains(crate::stores::theme::DARK_CLASS));
        assert_eq!(reopened.storage.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(reopened.auth.current_user().unwrap().id, "user-001");
    }
}
