use crate::state::set_count;
use crate::{CardKind, DeckBuilder, DeckError, Event, EventBus};

fn offset(value: u32, delta: i32) -> i64 {
    i64::from(value) + i64::from(delta)
}

fn clamp_to(value: i64, floor: u32, ceiling: u32) -> u32 {
    let ceiling = ceiling.max(floor);
    value.clamp(i64::from(floor), i64::from(ceiling)) as u32
}

impl DeckBuilder {
    pub fn adjust_base(
        &mut self,
        id: &str,
        delta: i32,
        events: &mut EventBus,
    ) -> Result<(), DeckError> {
        self.ensure_editable()?;
        self.expect_kind(id, CardKind::Base)?;
        let current = self.state.base_count(id);
        let next = clamp_to(offset(current, delta), 0, self.rules.max_copies);
        if next > current && !self.rules.simple_counters {
            let total = self.state.base_total();
            let target = self.rules.base_target;
            if total + (next - current) > target {
                return Err(DeckError::BaseTargetReached { total, target });
            }
        }
        if next == current {
            return Ok(());
        }
        set_count(&mut self.state.base_counts, id, next);
        events.push(Event::BaseCountChanged {
            card: id.to_string(),
            count: next,
            total: self.state.base_total(),
        });
        Ok(())
    }

    pub fn adjust_modifier(
        &mut self,
        id: &str,
        delta: i32,
        events: &mut EventBus,
    ) -> Result<(), DeckError> {
        self.ensure_editable()?;
        self.expect_kind(id, CardKind::Modifier)?;
        let current = self.state.modifier_count(id);
        let next = clamp_to(offset(current, delta), 0, self.rules.max_copies);
        if next > current && self.rules.capacity_checks_enabled() {
            let used = self.capacity_used();
            let needed = (next - current).saturating_mul(self.charge_for(id));
            if used.saturating_add(needed) > self.state.capacity {
                return Err(DeckError::CapacityExceeded {
                    used,
                    capacity: self.state.capacity,
                    needed,
                });
            }
        }
        if next == current {
            return Ok(());
        }
        set_count(&mut self.state.modifier_counts, id, next);
        events.push(Event::ModifierCountChanged {
            card: id.to_string(),
            count: next,
            used: self.capacity_used(),
        });
        Ok(())
    }

    pub fn adjust_nulls(&mut self, delta: i32, events: &mut EventBus) -> Result<(), DeckError> {
        self.ensure_editable()?;
        let current = self.state.null_count;
        let next = clamp_to(
            offset(current, delta),
            self.rules.min_nulls,
            self.rules.max_nulls,
        );
        if next == current {
            return Ok(());
        }
        self.state.null_count = next;
        events.push(Event::NullCountChanged { count: next });
        Ok(())
    }

    /// Capacity never drops below what the current modifiers already use.
    pub fn adjust_capacity(&mut self, delta: i32, events: &mut EventBus) -> Result<(), DeckError> {
        self.ensure_editable()?;
        let current = self.state.capacity;
        let floor = if self.rules.capacity_checks_enabled() {
            self.rules.min_capacity.max(self.capacity_used())
        } else {
            self.rules.min_capacity
        };
        let ceiling = self.rules.max_capacity.max(floor);
        let next = clamp_to(offset(current, delta), floor, ceiling);
        let next = if delta < 0 {
            next.min(current)
        } else {
            next.max(current)
        };
        if next == current {
            return Ok(());
        }
        self.state.capacity = next;
        events.push(Event::CapacityChanged { capacity: next });
        Ok(())
    }

    /// Allowed while locked; the limit never drops below the cards already held.
    pub fn adjust_hand_limit(
        &mut self,
        delta: i32,
        events: &mut EventBus,
    ) -> Result<(), DeckError> {
        let current = self.state.hand_limit;
        let floor = self.rules.min_hand_limit.max(self.state.hand.len());
        let ceiling = self.rules.max_hand_limit.max(floor);
        let next = (current as i64 + i64::from(delta)).clamp(floor as i64, ceiling as i64) as usize;
        if next == current {
            return Ok(());
        }
        self.state.hand_limit = next;
        events.push(Event::HandLimitChanged { limit: next });
        Ok(())
    }

    pub fn reset_composition(&mut self, events: &mut EventBus) -> Result<(), DeckError> {
        self.ensure_editable()?;
        self.state.base_counts.clear();
        self.state.modifier_counts.clear();
        self.state.null_count = self.rules.clamp_nulls(self.rules.min_nulls);
        self.state.capacity = self.rules.clamp_capacity(self.rules.default_capacity);
        events.push(Event::CompositionReset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Card, CardCatalog, CapacityMode, DeckRules};

    fn builder_with(rules: DeckRules) -> DeckBuilder {
        let catalog = CardCatalog::new(vec![
            Card::base("strike", "Strike"),
            Card::base("guard", "Guard"),
            Card::modifier("keen", "Keen", 3),
            Card::modifier("swift", "Swift", 1),
        ])
        .expect("catalog");
        DeckBuilder::new(rules, catalog, 5)
    }

    #[test]
    fn base_increase_past_target_is_rejected() {
        let mut builder = builder_with(DeckRules::player());
        let mut events = EventBus::default();
        builder.adjust_base("strike", 20, &mut events).expect("strike");
        builder.adjust_base("guard", 6, &mut events).expect("guard");
        assert_eq!(
            builder.adjust_base("guard", 1, &mut events),
            Err(DeckError::BaseTargetReached {
                total: 26,
                target: 26
            })
        );
        assert_eq!(builder.state.base_total(), 26);
    }

    #[test]
    fn base_increase_that_overshoots_is_rejected_whole() {
        let mut builder = builder_with(DeckRules::player());
        let mut events = EventBus::default();
        builder.adjust_base("strike", 24, &mut events).expect("strike");
        assert!(builder.adjust_base("guard", 3, &mut events).is_err());
        assert_eq!(builder.state.base_count("guard"), 0);
    }

    #[test]
    fn simple_counters_allow_any_base_total() {
        let rules = DeckRules {
            simple_counters: true,
            ..DeckRules::player()
        };
        let mut builder = builder_with(rules);
        let mut events = EventBus::default();
        builder.adjust_base("strike", 26, &mut events).expect("strike");
        builder.adjust_base("guard", 10, &mut events).expect("guard");
        assert_eq!(builder.state.base_total(), 36);
    }

    #[test]
    fn base_decrease_clamps_at_zero() {
        let mut builder = builder_with(DeckRules::player());
        let mut events = EventBus::default();
        builder.adjust_base("strike", 2, &mut events).expect("add");
        builder.adjust_base("strike", -5, &mut events).expect("remove");
        assert_eq!(builder.state.base_count("strike"), 0);
        assert!(!builder.state.base_counts.contains_key("strike"));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut builder = builder_with(DeckRules::player());
        let mut events = EventBus::default();
        assert_eq!(
            builder.adjust_base("keen", 1, &mut events),
            Err(DeckError::NotBase("keen".to_string()))
        );
        assert_eq!(
            builder.adjust_modifier("strike", 1, &mut events),
            Err(DeckError::NotModifier("strike".to_string()))
        );
        assert_eq!(
            builder.adjust_base("null", 1, &mut events),
            Err(DeckError::NotBase("null".to_string()))
        );
        assert_eq!(
            builder.adjust_base("ghost", 1, &mut events),
            Err(DeckError::UnknownCard("ghost".to_string()))
        );
    }

    #[test]
    fn modifier_capacity_charged_by_cost() {
        let mut builder = builder_with(DeckRules::player());
        let mut events = EventBus::default();
        builder.adjust_modifier("keen", 3, &mut events).expect("keen");
        assert_eq!(builder.capacity_used(), 9);
        assert_eq!(
            builder.adjust_modifier("keen", 1, &mut events),
            Err(DeckError::CapacityExceeded {
                used: 9,
                capacity: 10,
                needed: 3
            })
        );
        builder.adjust_modifier("swift", 1, &mut events).expect("swift");
        assert_eq!(builder.capacity_remaining(), 0);
    }

    #[test]
    fn modifier_capacity_charged_by_count() {
        let rules = DeckRules {
            capacity_mode: CapacityMode::Count,
            ..DeckRules::player()
        };
        let mut builder = builder_with(rules);
        let mut events = EventBus::default();
        builder.adjust_modifier("keen", 10, &mut events).expect("keen");
        assert!(builder.adjust_modifier("swift", 1, &mut events).is_err());
    }

    #[test]
    fn simple_count_mode_skips_capacity() {
        let mut builder = builder_with(DeckRules::game_master());
        let mut events = EventBus::default();
        builder.adjust_modifier("keen", 25, &mut events).expect("keen");
        assert_eq!(builder.state.modifier_count("keen"), 25);
    }

    #[test]
    fn null_count_respects_bounds() {
        let mut builder = builder_with(DeckRules::player());
        let mut events = EventBus::default();
        builder.adjust_nulls(-3, &mut events).expect("floor");
        assert_eq!(builder.state.null_count, 5);
        builder.adjust_nulls(100, &mut events).expect("ceiling");
        assert_eq!(builder.state.null_count, 20);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn capacity_cannot_drop_below_usage() {
        let mut builder = builder_with(DeckRules::player());
        let mut events = EventBus::default();
        builder.adjust_modifier("keen", 2, &mut events).expect("keen");
        builder.adjust_capacity(-10, &mut events).expect("lower");
        assert_eq!(builder.state.capacity, 6);
        builder.adjust_capacity(100, &mut events).expect("raise");
        assert_eq!(builder.state.capacity, 40);
    }

    #[test]
    fn lowering_capacity_never_raises_it() {
        let rules = DeckRules {
            max_capacity: 6,
            ..DeckRules::player()
        };
        let mut builder = builder_with(rules);
        let mut events = EventBus::default();
        builder.state.capacity = 6;
        builder.state.modifier_counts.insert("keen".to_string(), 3);
        builder.adjust_capacity(-1, &mut events).expect("lower");
        assert_eq!(builder.state.capacity, 6);
        builder.adjust_capacity(1, &mut events).expect("raise");
        assert_eq!(builder.state.capacity, 6);
        assert!(events.is_empty());
    }

    #[test]
    fn hand_limit_stays_above_held_cards() {
        let mut builder = builder_with(DeckRules::player());
        let mut events = EventBus::default();
        for _ in 0..4 {
            builder
                .state
                .hand
                .push(crate::HandCard::fresh("strike".to_string()));
        }
        builder.adjust_hand_limit(-10, &mut events).expect("lower");
        assert_eq!(builder.state.hand_limit, 4);
        builder.adjust_hand_limit(50, &mut events).expect("raise");
        assert_eq!(builder.state.hand_limit, 15);
    }

    #[test]
    fn composition_is_frozen_while_locked() {
        let rules = DeckRules {
            simple_counters: true,
            ..DeckRules::player()
        };
        let mut builder = builder_with(rules);
        let mut events = EventBus::default();
        builder.lock(&mut events).expect("lock");
        assert_eq!(
            builder.adjust_base("strike", 1, &mut events),
            Err(DeckError::Locked)
        );
        assert_eq!(builder.adjust_nulls(1, &mut events), Err(DeckError::Locked));
        assert_eq!(builder.reset_composition(&mut events), Err(DeckError::Locked));
        builder.adjust_hand_limit(1, &mut events).expect("hand limit");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut builder = builder_with(DeckRules::player());
        let mut events = EventBus::default();
        builder.adjust_base("strike", 4, &mut events).expect("strike");
        builder.adjust_nulls(3, &mut events).expect("nulls");
        builder.adjust_capacity(5, &mut events).expect("capacity");
        builder.reset_composition(&mut events).expect("reset");
        assert!(builder.state.base_counts.is_empty());
        assert_eq!(builder.state.null_count, 5);
        assert_eq!(builder.state.capacity, 10);
    }
}
