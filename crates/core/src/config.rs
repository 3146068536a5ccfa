use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CapacityMode {
    /// Each modifier consumes its card cost.
    #[default]
    Cost,
    /// Each modifier consumes one unit regardless of cost.
    Count,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeckRules {
    pub base_target: u32,
    pub min_nulls: u32,
    pub max_nulls: u32,
    pub default_capacity: u32,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub max_copies: u32,
    pub default_hand_limit: usize,
    pub min_hand_limit: usize,
    pub max_hand_limit: usize,
    pub capacity_mode: CapacityMode,
    pub simple_counters: bool,
    pub play_capacity_check: bool,
    pub null_card_id: String,
}

impl Default for DeckRules {
    fn default() -> Self {
        Self::player()
    }
}

impl DeckRules {
    pub fn player() -> Self {
        Self {
            base_target: 26,
            min_nulls: 5,
            max_nulls: 20,
            default_capacity: 10,
            min_capacity: 0,
            max_capacity: 40,
            max_copies: 26,
            default_hand_limit: 7,
            min_hand_limit: 1,
            max_hand_limit: 15,
            capacity_mode: CapacityMode::Cost,
            simple_counters: false,
            play_capacity_check: true,
            null_card_id: "null".to_string(),
        }
    }

    /// The game master tracks loose counters instead of a tournament deck.
    pub fn game_master() -> Self {
        Self {
            capacity_mode: CapacityMode::Count,
            simple_counters: true,
            default_hand_limit: 10,
            ..Self::player()
        }
    }

    /// Simple counters combined with count-based capacity switch every capacity check off.
    pub fn capacity_checks_enabled(&self) -> bool {
        !(self.simple_counters && self.capacity_mode == CapacityMode::Count)
    }

    pub fn charge(&self, cost: u32) -> u32 {
        match self.capacity_mode {
            CapacityMode::Cost => cost,
            CapacityMode::Count => 1,
        }
    }

    pub fn clamp_nulls(&self, value: u32) -> u32 {
        value.clamp(self.min_nulls, self.max_nulls.max(self.min_nulls))
    }

    pub fn clamp_capacity(&self, value: u32) -> u32 {
        value.clamp(self.min_capacity, self.max_capacity.max(self.min_capacity))
    }

    pub fn clamp_hand_limit(&self, value: usize) -> usize {
        value.clamp(
            self.min_hand_limit,
            self.max_hand_limit.max(self.min_hand_limit),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_player_preset() {
        let rules: DeckRules = serde_json::from_str(r#"{"base_target": 30}"#).expect("parse");
        assert_eq!(rules.base_target, 30);
        assert_eq!(rules.min_nulls, 5);
        assert_eq!(rules.capacity_mode, CapacityMode::Cost);
    }

    #[test]
    fn game_master_preset_disables_capacity_checks() {
        assert!(DeckRules::player().capacity_checks_enabled());
        assert!(!DeckRules::game_master().capacity_checks_enabled());

        let simple_only = DeckRules {
            simple_counters: true,
            ..DeckRules::player()
        };
        assert!(simple_only.capacity_checks_enabled());
    }

    #[test]
    fn charge_follows_capacity_mode() {
        let mut rules = DeckRules::player();
        assert_eq!(rules.charge(3), 3);
        rules.capacity_mode = CapacityMode::Count;
        assert_eq!(rules.charge(3), 1);
    }

    #[test]
    fn clamps_tolerate_inverted_bounds() {
        let rules = DeckRules {
            min_nulls: 6,
            max_nulls: 2,
            ..DeckRules::player()
        };
        assert_eq!(rules.clamp_nulls(0), 6);
        assert_eq!(rules.clamp_nulls(9), 6);
    }
}
