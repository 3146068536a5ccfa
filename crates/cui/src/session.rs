use anyhow::{Context, Result};
use deckhand_core::{
    CardCatalog, DeckAction, DeckBuilder, DeckError, DeckState, Event, EventBus, RngState,
};
use deckhand_data::{
    builtin_catalog, export_counts, import_counts, load_catalog, load_deck_state, load_role,
    load_rules, save_deck_state, save_role, CountsExport, FileStore, ImportError, KeyValueStore,
    Role, RoleRules, StorageKeys, StoreError,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub store_dir: Option<PathBuf>,
    pub role: Option<Role>,
    pub seed: Option<u64>,
    pub catalog: Option<PathBuf>,
    pub rules: Option<PathBuf>,
}

pub fn default_store_dir() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("DECKHAND_HOME") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".deckhand"))
}

/// Opens the file-backed session described by `options`.
pub fn open_session(options: &LaunchOptions) -> Result<Session> {
    let catalog = match options.catalog.as_ref() {
        Some(path) => load_catalog(path)?,
        None => builtin_catalog().context("load bundled catalog")?,
    };
    let rules = match options.rules.as_ref() {
        Some(path) => load_rules(path)?,
        None => RoleRules::default(),
    };
    let dir = options
        .store_dir
        .clone()
        .or_else(default_store_dir)
        .context("no storage directory; pass --store or set DECKHAND_HOME")?;
    tracing::info!(dir = %dir.display(), "opening deck storage");
    let config = SessionConfig {
        keys: StorageKeys::default(),
        rules,
        catalog,
        seed: options.seed,
        role: options.role,
    };
    Ok(Session::open(Box::new(FileStore::new(dir)), config))
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub keys: StorageKeys,
    pub rules: RoleRules,
    pub catalog: CardCatalog,
    pub seed: Option<u64>,
    /// Overrides and replaces the stored mode.
    pub role: Option<Role>,
}

/// A deck builder bound to its storage: every accepted action is written back
/// before the caller sees the result.
pub struct Session {
    store: Box<dyn KeyValueStore>,
    keys: StorageKeys,
    rules: RoleRules,
    seed: Option<u64>,
    role: Role,
    builder: DeckBuilder,
    last_store_error: Option<String>,
}

fn rng_for(seed: Option<u64>) -> RngState {
    match seed {
        Some(seed) => RngState::from_seed(seed),
        None => RngState::from_entropy(),
    }
}

impl Session {
    pub fn open(store: Box<dyn KeyValueStore>, config: SessionConfig) -> Self {
        let SessionConfig {
            keys,
            rules,
            catalog,
            seed,
            role,
        } = config;
        let stored_role = load_role(store.as_ref(), &keys);
        let role = role.unwrap_or(stored_role);
        let builder = Self::load_builder(store.as_ref(), &keys, &rules, catalog, role, seed);
        let mut session = Self {
            store,
            keys,
            rules,
            seed,
            role,
            builder,
            last_store_error: None,
        };
        if role != stored_role {
            let result = save_role(session.store.as_mut(), &session.keys, role);
            session.record_store_result(result);
        }
        session
    }

    fn load_builder(
        store: &dyn KeyValueStore,
        keys: &StorageKeys,
        rules: &RoleRules,
        catalog: CardCatalog,
        role: Role,
        seed: Option<u64>,
    ) -> DeckBuilder {
        let rules = rules.for_role(role).clone();
        let state = load_deck_state(store, keys.deck_key(role), &rules, &catalog);
        tracing::debug!(role = role.code(), phase = ?state.phase, "deck state loaded");
        DeckBuilder::with_state(rules, catalog, state, rng_for(seed))
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn builder(&self) -> &DeckBuilder {
        &self.builder
    }

    pub fn state(&self) -> &DeckState {
        &self.builder.state
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.builder.catalog
    }

    pub fn storage_key(&self) -> &str {
        self.keys.deck_key(self.role)
    }

    pub fn last_store_error(&self) -> Option<&str> {
        self.last_store_error.as_deref()
    }

    pub fn apply(&mut self, action: DeckAction) -> Result<Vec<Event>, DeckError> {
        let mut events = EventBus::default();
        self.builder.apply(action, &mut events)?;
        self.persist_logged();
        let emitted = events.drain().collect();
        Ok(emitted)
    }

    pub fn import(&mut self, export: &CountsExport) -> Result<Vec<Event>, ImportError> {
        let mut events = EventBus::default();
        import_counts(&mut self.builder, export, &mut events)?;
        self.persist_logged();
        let emitted = events.drain().collect();
        Ok(emitted)
    }

    pub fn export(&self) -> CountsExport {
        export_counts(&self.builder.state)
    }

    /// Saves the current deck, records the new mode and loads that role's deck.
    pub fn switch_role(&mut self, role: Role) -> Result<(), StoreError> {
        if role == self.role {
            return Ok(());
        }
        self.persist()?;
        save_role(self.store.as_mut(), &self.keys, role)?;
        let catalog = self.builder.catalog.clone();
        self.builder = Self::load_builder(
            self.store.as_ref(),
            &self.keys,
            &self.rules,
            catalog,
            role,
            self.seed,
        );
        self.role = role;
        tracing::info!(role = role.code(), "switched role");
        Ok(())
    }

    pub fn persist(&mut self) -> Result<(), StoreError> {
        let key = self.keys.deck_key(self.role).to_string();
        save_deck_state(self.store.as_mut(), &key, &self.builder.state)
    }

    fn persist_logged(&mut self) {
        let result = self.persist();
        self.record_store_result(result);
    }

    fn record_store_result(&mut self, result: Result<(), StoreError>) {
        match result {
            Ok(()) => self.last_store_error = None,
            Err(err) => {
                tracing::warn!(%err, "failed to persist deck state");
                self.last_store_error = Some(err.to_string());
            }
        }
    }
}
