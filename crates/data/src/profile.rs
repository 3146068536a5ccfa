use crate::{KeyValueStore, StoreError};
use deckhand_core::DeckRules;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Player,
    #[serde(alias = "gm")]
    GameMaster,
}

impl Role {
    pub fn code(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::GameMaster => "gm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::GameMaster => "Game Master",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "player" | "p" => Some(Self::Player),
            "gm" | "game_master" | "game-master" | "gamemaster" => Some(Self::GameMaster),
            _ => None,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Player => Self::GameMaster,
            Self::GameMaster => Self::Player,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageKeys {
    pub mode: String,
    pub player_deck: String,
    pub game_master_deck: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            mode: "deckhand.mode".to_string(),
            player_deck: "deckhand.deck.player".to_string(),
            game_master_deck: "deckhand.deck.gm".to_string(),
        }
    }
}

impl StorageKeys {
    pub fn deck_key(&self, role: Role) -> &str {
        match role {
            Role::Player => &self.player_deck,
            Role::GameMaster => &self.game_master_deck,
        }
    }
}

/// Rules per role; a missing role falls back to its preset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RoleRules {
    pub player: DeckRules,
    pub game_master: DeckRules,
}

impl Default for RoleRules {
    fn default() -> Self {
        Self {
            player: DeckRules::player(),
            game_master: DeckRules::game_master(),
        }
    }
}

impl RoleRules {
    pub fn for_role(&self, role: Role) -> &DeckRules {
        match role {
            Role::Player => &self.player,
            Role::GameMaster => &self.game_master,
        }
    }
}

/// Unknown or unreadable values fall back to the player role.
pub fn load_role(store: &dyn KeyValueStore, keys: &StorageKeys) -> Role {
    let raw = match store.get(&keys.mode) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Role::default(),
        Err(err) => {
            tracing::warn!(%err, "mode unreadable, using player");
            return Role::default();
        }
    };
    serde_json::from_str::<Role>(&raw)
        .ok()
        .or_else(|| Role::parse(&raw))
        .unwrap_or_else(|| {
            tracing::warn!(value = %raw, "unknown stored mode, using player");
            Role::default()
        })
}

pub fn save_role(
    store: &mut dyn KeyValueStore,
    keys: &StorageKeys,
    role: Role,
) -> Result<(), StoreError> {
    let body = serde_json::to_string(&role).map_err(|source| StoreError::Encode {
        key: keys.mode.clone(),
        source,
    })?;
    store.set(&keys.mode, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn role_round_trips_through_store() {
        let mut store = MemoryStore::new();
        let keys = StorageKeys::default();
        assert_eq!(load_role(&store, &keys), Role::Player);
        save_role(&mut store, &keys, Role::GameMaster).expect("save");
        assert_eq!(load_role(&store, &keys), Role::GameMaster);
    }

    #[test]
    fn bare_mode_strings_are_accepted() {
        let mut store = MemoryStore::new();
        let keys = StorageKeys::default();
        store.set(&keys.mode, "gm").expect("set");
        assert_eq!(load_role(&store, &keys), Role::GameMaster);
        store.set(&keys.mode, "\"gm\"").expect("set");
        assert_eq!(load_role(&store, &keys), Role::GameMaster);
        store.set(&keys.mode, "{oops").expect("set");
        assert_eq!(load_role(&store, &keys), Role::Player);
    }

    #[test]
    fn each_role_has_its_own_deck_key() {
        let keys = StorageKeys::default();
        assert_ne!(keys.deck_key(Role::Player), keys.deck_key(Role::GameMaster));
    }

    #[test]
    fn partial_rules_keep_presets() {
        let rules: RoleRules =
            serde_json::from_str(r#"{"player": {"base_target": 20}}"#).expect("parse");
        assert_eq!(rules.player.base_target, 20);
        assert_eq!(rules.game_master, DeckRules::game_master());
    }
}
