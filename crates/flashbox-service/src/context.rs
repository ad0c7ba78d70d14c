//! Application wiring: open the store, pick the settings backend, seed.

use std::sync::Arc;

use tracing::{error, info};

use flashbox_core::config::AppConfig;
use flashbox_core::result::AppResult;
use flashbox_core::traits::settings::SettingsStore;
use flashbox_database::settings::{FileSettingsStore, MemorySettingsStore};
use flashbox_database::{SeedData, SeedLoader, Store};

use crate::library::Library;
use crate::study::StudyService;
use crate::tree::TreeService;

/// Every long-lived service, built once at startup.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Store handle, already opened.
    pub store: Store,
    /// Key-value settings holding the seed flag.
    pub settings: Arc<dyn SettingsStore>,
    /// Repository facade.
    pub library: Library,
    /// Tree navigation.
    pub tree: TreeService,
    /// Study pool.
    pub study: StudyService,
    /// Starter data loader.
    pub seed: SeedLoader,
}

impl AppContext {
    /// Open the store and wire the services without loading starter data.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        let store = Store::connect(config.database.clone()).await?;

        // An in-memory database starts empty every run, so its flag must too.
        let settings: Arc<dyn SettingsStore> = if config.database.is_in_memory() {
            Arc::new(MemorySettingsStore::new())
        } else {
            Arc::new(FileSettingsStore::new(&config.settings.path))
        };

        let data = match &config.seed.directory {
            Some(dir) => SeedData::from_dir(dir).await?,
            None => SeedData::builtin()?,
        };
        let seed = SeedLoader::new(store.clone(), Arc::clone(&settings), data);

        let library = Library::new(store.clone());
        let tree = TreeService::new(library.folder_repo(), library.collection_repo());
        let study = StudyService::new(library.card_repo());

        info!(
            database = %config.database.url,
            settings = %config.settings.path,
            "Application context ready"
        );

        Ok(Self {
            config,
            store,
            settings,
            library,
            tree,
            study,
            seed,
        })
    }

    /// Build the context and load starter data when enabled.
    ///
    /// A failed seed is logged; the application still starts.
    pub async fn bootstrap(config: AppConfig) -> AppResult<Self> {
        let ctx = Self::build(config).await?;
        if ctx.config.seed.enabled {
            if let Err(e) = ctx.seed.load().await {
                error!(error = %e, "Failed to load starter data");
            }
        }
        Ok(ctx)
    }

    /// Owner tag for records created interactively.
    pub fn owner(&self) -> i64 {
        self.config.seed.owner
    }
}
