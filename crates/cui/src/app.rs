use crate::session::Session;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use deckhand_core::{
    CardCatalog, CardId, CardKind, DeckAction, DiscardOrigin, DiscardedCard, Event, HandCard,
    RefillSource,
};
use std::collections::VecDeque;
use std::fmt::Display;

const MAX_EVENT_LOG: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Composition,
    Hand,
    Discard,
    Saved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionRow {
    Card { id: CardId, kind: CardKind },
    Nulls,
}

pub struct App {
    pub session: Session,
    pub focus: FocusPane,
    pub composition_cursor: usize,
    pub hand_cursor: usize,
    pub discard_cursor: usize,
    pub saved_cursor: usize,
    pub event_log: VecDeque<String>,
    pub status_line: String,
    pub show_help: bool,
    pub name_prompt: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        let mut app = Self {
            session,
            focus: FocusPane::Composition,
            composition_cursor: 0,
            hand_cursor: 0,
            discard_cursor: 0,
            saved_cursor: 0,
            event_log: VecDeque::new(),
            status_line: "ready".to_string(),
            show_help: false,
            name_prompt: None,
            should_quit: false,
        };
        if app.session.state().is_locked() {
            app.focus = FocusPane::Hand;
        }
        app.push_event_line(format!(
            "{} deck loaded from {}",
            app.session.role().label(),
            app.session.storage_key()
        ));
        app
    }

    pub fn focus_label(&self, pane: FocusPane) -> &'static str {
        match pane {
            FocusPane::Composition => "Composition",
            FocusPane::Hand => "Hand",
            FocusPane::Discard => "Discard",
            FocusPane::Saved => "Saved decks",
        }
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        self.focus = match (self.focus, forward) {
            (FocusPane::Composition, true) => FocusPane::Hand,
            (FocusPane::Hand, true) => FocusPane::Discard,
            (FocusPane::Discard, true) => FocusPane::Saved,
            (FocusPane::Saved, true) => FocusPane::Composition,
            (FocusPane::Composition, false) => FocusPane::Saved,
            (FocusPane::Hand, false) => FocusPane::Composition,
            (FocusPane::Discard, false) => FocusPane::Hand,
            (FocusPane::Saved, false) => FocusPane::Discard,
        };
    }

    pub fn move_cursor(&mut self, down: bool) {
        match self.focus {
            FocusPane::Composition => {
                let len = self.composition_rows().len();
                move_index(&mut self.composition_cursor, len, down);
            }
            FocusPane::Hand => {
                let len = self.session.state().hand.len();
                move_index(&mut self.hand_cursor, len, down);
            }
            FocusPane::Discard => {
                let len = self.session.state().discard.len();
                move_index(&mut self.discard_cursor, len, down);
            }
            FocusPane::Saved => {
                let len = self.saved_names().len();
                move_index(&mut self.saved_cursor, len, down);
            }
        }
    }

    pub fn next_hint(&self) -> String {
        let state = self.session.state();
        if state.active_play.is_some() {
            return "attach modifiers with p, enter to play, esc to cancel".to_string();
        }
        if !state.is_locked() && !self.session.builder().composition_is_valid() {
            let target = self.session.builder().rules.base_target;
            return format!("fill base cards to {target}, then lock");
        }
        state.phase.next_step().to_string()
    }

    /// Bases, then modifiers, then the null counter.
    pub fn composition_rows(&self) -> Vec<CompositionRow> {
        let catalog = self.session.catalog();
        let mut rows: Vec<CompositionRow> = catalog
            .of_kind(CardKind::Base)
            .chain(catalog.of_kind(CardKind::Modifier))
            .map(|card| CompositionRow::Card {
                id: card.id.clone(),
                kind: card.kind,
            })
            .collect();
        rows.push(CompositionRow::Nulls);
        rows
    }

    pub fn composition_label(&self, row: &CompositionRow) -> String {
        let state = self.session.state();
        match row {
            CompositionRow::Card {
                id,
                kind: CardKind::Modifier,
            } => format!(
                "{:>2}x {} (cost {})",
                state.modifier_count(id),
                self.session.catalog().name_of(id),
                self.session.builder().charge_for(id)
            ),
            CompositionRow::Card { id, .. } => format!(
                "{:>2}x {}",
                state.base_count(id),
                self.session.catalog().name_of(id)
            ),
            CompositionRow::Nulls => format!("{:>2}x null", state.null_count),
        }
    }

    pub fn hand_label(&self, index: usize, entry: &HandCard) -> String {
        let marker = match self.session.state().active_play.as_ref() {
            Some(play) if play.base == index => "B",
            Some(play) if play.modifiers.contains(&index) => "+",
            _ => " ",
        };
        let spent = if entry.spent { " (spent)" } else { "" };
        format!(
            "{marker} {index:>2}: {}{spent}",
            card_name(self.session.catalog(), &entry.card)
        )
    }

    pub fn discard_label(&self, index: usize, entry: &DiscardedCard) -> String {
        format!(
            "{index:>2}: {} [{}]",
            card_name(self.session.catalog(), &entry.card),
            entry.origin.label()
        )
    }

    pub fn saved_names(&self) -> Vec<String> {
        self.session
            .builder()
            .saved_deck_names()
            .map(str::to_string)
            .collect()
    }

    pub fn capacity_summary(&self) -> String {
        let builder = self.session.builder();
        let capacity = builder.state.capacity;
        if builder.rules.capacity_checks_enabled() {
            format!("{}/{capacity}", builder.capacity_used())
        } else {
            format!("{capacity} (unchecked)")
        }
    }

    pub fn run(&mut self, action: DeckAction) -> bool {
        let ok = match self.session.apply(action) {
            Ok(events) => {
                for event in &events {
                    let line = format_event(self.session.catalog(), event);
                    self.push_event_line(line);
                }
                self.push_status("ok");
                true
            }
            Err(err) => {
                self.push_error(err);
                false
            }
        };
        if let Some(err) = self.session.last_store_error() {
            self.status_line = format!("not saved: {err}");
        }
        self.normalize_cursors();
        ok
    }

    pub fn adjust_focused(&mut self, delta: i32) {
        if self.focus != FocusPane::Composition {
            self.push_status("focus the composition pane to change counts");
            return;
        }
        let rows = self.composition_rows();
        let Some(row) = rows.get(self.composition_cursor).cloned() else {
            return;
        };
        let action = match row {
            CompositionRow::Card {
                id,
                kind: CardKind::Modifier,
            } => DeckAction::AdjustModifier { card: id, delta },
            CompositionRow::Card { id, .. } => DeckAction::AdjustBase { card: id, delta },
            CompositionRow::Nulls => DeckAction::AdjustNulls { delta },
        };
        self.run(action);
    }

    pub fn adjust_capacity(&mut self, delta: i32) {
        self.run(DeckAction::AdjustCapacity { delta });
    }

    pub fn adjust_hand_limit(&mut self, delta: i32) {
        self.run(DeckAction::AdjustHandLimit { delta });
    }

    pub fn toggle_lock(&mut self) {
        if self.session.state().is_locked() {
            self.run(DeckAction::Unlock);
        } else if self.run(DeckAction::Lock) {
            self.focus = FocusPane::Hand;
        }
    }

    pub fn build(&mut self) {
        self.run(DeckAction::Build);
    }

    pub fn shuffle(&mut self) {
        self.run(DeckAction::Shuffle);
    }

    pub fn draw(&mut self) {
        if self.run(DeckAction::Draw) {
            self.hand_cursor = self.session.state().hand.len().saturating_sub(1);
        }
    }

    pub fn discard_focused(&mut self) {
        if self.focus != FocusPane::Hand {
            self.push_status("focus the hand to discard");
            return;
        }
        self.run(DeckAction::DiscardAt {
            index: self.hand_cursor,
            origin: DiscardOrigin::Discarded,
        });
    }

    pub fn discard_hand(&mut self) {
        self.run(DeckAction::DiscardHand {
            origin: DiscardOrigin::Discarded,
        });
    }

    /// Starts a play with the focused card, or toggles it as a modifier of the
    /// play already in progress.
    pub fn play_focused(&mut self) {
        if self.focus != FocusPane::Hand {
            self.push_status("focus the hand to play");
            return;
        }
        let index = self.hand_cursor;
        let Some(card) = self.session.state().hand.get(index).map(|entry| entry.card.clone())
        else {
            self.push_status("hand is empty");
            return;
        };
        let kind = self.session.builder().card_kind(&card);
        let action = match self.session.state().active_play.as_ref() {
            Some(play) if play.modifiers.contains(&index) => DeckAction::Detach { index },
            Some(play) if play.base == index => DeckAction::CancelPlay,
            Some(_) if kind != Some(CardKind::Base) => DeckAction::Attach { index },
            _ => DeckAction::SelectBase { index },
        };
        self.run(action);
    }

    pub fn finalize_play(&mut self) {
        self.run(DeckAction::FinalizePlay);
    }

    pub fn cancel_play(&mut self) {
        self.run(DeckAction::CancelPlay);
    }

    pub fn return_focused_to_hand(&mut self) {
        if self.focus != FocusPane::Discard {
            self.push_status("focus the discard pile to return a card");
            return;
        }
        self.run(DeckAction::ReturnToHand {
            index: self.discard_cursor,
        });
    }

    pub fn return_all_to_hand(&mut self) {
        self.run(DeckAction::ReturnAllToHand);
    }

    pub fn return_focused_to_deck(&mut self, shuffle: bool) {
        if self.focus != FocusPane::Discard {
            self.push_status("focus the discard pile to return a card");
            return;
        }
        self.run(DeckAction::ReturnToDeck {
            index: self.discard_cursor,
            shuffle,
        });
    }

    pub fn return_all_to_deck(&mut self) {
        self.run(DeckAction::ReturnAllToDeck { shuffle: true });
    }

    pub fn toggle_spent(&mut self) {
        if self.focus != FocusPane::Hand {
            return;
        }
        self.run(DeckAction::ToggleSpent {
            index: self.hand_cursor,
        });
    }

    pub fn reset_composition(&mut self) {
        self.run(DeckAction::ResetComposition);
    }

    pub fn open_name_prompt(&mut self) {
        self.name_prompt = Some(String::new());
    }

    pub fn handle_name_prompt_key(&mut self, key: KeyEvent) -> bool {
        let Some(input) = self.name_prompt.as_mut() else {
            return false;
        };
        match key.code {
            KeyCode::Esc => {
                self.name_prompt = None;
                self.push_status("save cancelled");
            }
            KeyCode::Enter => {
                let name = input.trim().to_string();
                self.name_prompt = None;
                self.run(DeckAction::SaveDeck { name });
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(ch) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    input.push(ch);
                }
            }
            _ => {}
        }
        true
    }

    fn focused_saved_name(&mut self) -> Option<String> {
        if self.focus != FocusPane::Saved {
            self.push_status("focus the saved decks pane first");
            return None;
        }
        let name = self.saved_names().get(self.saved_cursor).cloned();
        if name.is_none() {
            self.push_status("no saved decks");
        }
        name
    }

    pub fn load_focused_saved(&mut self) {
        if let Some(name) = self.focused_saved_name() {
            self.run(DeckAction::LoadDeck { name });
        }
    }

    pub fn delete_focused_saved(&mut self) {
        if let Some(name) = self.focused_saved_name() {
            self.run(DeckAction::DeleteDeck { name });
        }
    }

    pub fn switch_role(&mut self) {
        let next = self.session.role().toggle();
        match self.session.switch_role(next) {
            Ok(()) => {
                self.push_event_line(format!("switched to {} deck", next.label()));
                self.push_status(format!("{} mode", next.label()));
            }
            Err(err) => self.push_error(err),
        }
        self.normalize_cursors();
    }

    /// Enter: finish a pending play, otherwise the focused pane's main action.
    pub fn activate_primary(&mut self) {
        if self.session.state().active_play.is_some() {
            self.finalize_play();
            return;
        }
        match self.focus {
            FocusPane::Composition => self.adjust_focused(1),
            FocusPane::Hand => self.play_focused(),
            FocusPane::Discard => self.return_focused_to_hand(),
            FocusPane::Saved => self.load_focused_saved(),
        }
    }

    pub fn escape(&mut self) {
        if self.show_help {
            self.show_help = false;
        } else if self.session.state().active_play.is_some() {
            self.cancel_play();
        }
    }

    pub fn normalize_cursors(&mut self) {
        let composition_len = self.composition_rows().len();
        let hand_len = self.session.state().hand.len();
        let discard_len = self.session.state().discard.len();
        let saved_len = self.saved_names().len();
        clamp_index(&mut self.composition_cursor, composition_len);
        clamp_index(&mut self.hand_cursor, hand_len);
        clamp_index(&mut self.discard_cursor, discard_len);
        clamp_index(&mut self.saved_cursor, saved_len);
    }

    pub fn push_status(&mut self, value: impl Into<String>) {
        self.status_line = value.into();
    }

    pub fn push_error(&mut self, err: impl Display) {
        self.status_line = format!("error: {err}");
    }

    fn push_event_line(&mut self, line: String) {
        if self.event_log.len() >= MAX_EVENT_LOG {
            let _ = self.event_log.pop_front();
        }
        self.event_log.push_back(line);
    }
}

fn move_index(value: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *value = 0;
        return;
    }
    if down {
        *value = (*value + 1) % len;
    } else if *value == 0 {
        *value = len - 1;
    } else {
        *value -= 1;
    }
}

fn clamp_index(value: &mut usize, len: usize) {
    if len == 0 {
        *value = 0;
    } else if *value >= len {
        *value = len - 1;
    }
}

fn card_name<'a>(catalog: &'a CardCatalog, id: &'a str) -> &'a str {
    catalog.name_of(id)
}

fn names(catalog: &CardCatalog, cards: &[CardId]) -> String {
    cards
        .iter()
        .map(|id| card_name(catalog, id))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_event(catalog: &CardCatalog, event: &Event) -> String {
    match event {
        Event::BaseCountChanged { card, count, total } => {
            format!("{} x{count} (bases {total})", card_name(catalog, card))
        }
        Event::ModifierCountChanged { card, count, used } => {
            format!("{} x{count} (capacity used {used})", card_name(catalog, card))
        }
        Event::NullCountChanged { count } => format!("nulls x{count}"),
        Event::CapacityChanged { capacity } => format!("capacity {capacity}"),
        Event::HandLimitChanged { limit } => format!("hand limit {limit}"),
        Event::CompositionReset => "composition reset".to_string(),
        Event::PhaseChanged { from, to } => format!("{} -> {}", from.label(), to.label()),
        Event::DeckBuilt { size } => format!("deck built with {size} cards"),
        Event::DeckShuffled { size } => format!("shuffled {size} cards"),
        Event::DeckRefilled { source, size } => match source {
            RefillSource::Discard => format!("reshuffled discard into deck ({size})"),
            RefillSource::Counts => format!("rebuilt deck from counts ({size})"),
        },
        Event::CardDrawn { card } => format!("drew {}", card_name(catalog, card)),
        Event::CardsDiscarded { cards, origin } => {
            format!("{} -> discard [{}]", names(catalog, cards), origin.label())
        }
        Event::ReturnedToHand { cards } => format!("{} -> hand", names(catalog, cards)),
        Event::ReturnedToDeck { cards, shuffled } => format!(
            "{} -> deck{}",
            names(catalog, cards),
            if *shuffled { " (shuffled)" } else { "" }
        ),
        Event::SpentToggled { card, spent } => format!(
            "{} {}",
            card_name(catalog, card),
            if *spent { "spent" } else { "ready" }
        ),
        Event::BaseSelected { card } => format!("playing {}", card_name(catalog, card)),
        Event::ModifierAttached { card, used } => {
            format!("+ {} (capacity used {used})", card_name(catalog, card))
        }
        Event::ModifierDetached { card, used } => {
            format!("- {} (capacity used {used})", card_name(catalog, card))
        }
        Event::PlayFinalized { base, modifiers } => {
            if modifiers.is_empty() {
                format!("played {}", card_name(catalog, base))
            } else {
                format!(
                    "played {} with {}",
                    card_name(catalog, base),
                    names(catalog, modifiers)
                )
            }
        }
        Event::PlayCancelled => "play cancelled".to_string(),
        Event::DeckSaved { name } => format!("saved deck '{name}'"),
        Event::DeckLoaded { name } => format!("loaded deck '{name}'"),
        Event::DeckDeleted { name } => format!("deleted deck '{name}'"),
        Event::CountsImported => "deck list imported".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use deckhand_core::DeckPhase;
    use deckhand_data::{builtin_catalog, MemoryStore, RoleRules, StorageKeys};

    fn app() -> App {
        let config = SessionConfig {
            keys: StorageKeys::default(),
            rules: RoleRules::default(),
            catalog: builtin_catalog().expect("catalog"),
            seed: Some(3),
            role: None,
        };
        App::new(Session::open(Box::new(MemoryStore::new()), config))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ready(app: &mut App) {
        app.focus = FocusPane::Composition;
        app.composition_cursor = 0;
        for _ in 0..26 {
            app.adjust_focused(1);
        }
        app.toggle_lock();
        app.build();
        app.shuffle();
    }

    #[test]
    fn composition_rows_end_with_nulls() {
        let app = app();
        let rows = app.composition_rows();
        assert_eq!(rows.last(), Some(&CompositionRow::Nulls));
        assert!(matches!(
            rows.first(),
            Some(CompositionRow::Card {
                kind: CardKind::Base,
                ..
            })
        ));
    }

    #[test]
    fn lock_moves_focus_to_hand() {
        let mut app = app();
        ready(&mut app);
        assert_eq!(app.focus, FocusPane::Hand);
        assert_eq!(app.session.state().phase, DeckPhase::LockedReady);
    }

    #[test]
    fn errors_land_in_the_status_line() {
        let mut app = app();
        app.draw();
        assert_eq!(app.status_line, "error: Lock the deck before drawing");
    }

    #[test]
    fn name_prompt_saves_a_deck() {
        let mut app = app();
        app.open_name_prompt();
        for ch in "main".chars() {
            assert!(app.handle_name_prompt_key(key(KeyCode::Char(ch))));
        }
        assert!(app.handle_name_prompt_key(key(KeyCode::Enter)));
        assert!(app.name_prompt.is_none());
        assert_eq!(app.saved_names(), vec!["main".to_string()]);
        assert!(!app.handle_name_prompt_key(key(KeyCode::Enter)));
    }

    #[test]
    fn play_focused_starts_and_cancels_a_play() {
        let mut app = app();
        ready(&mut app);
        let hand_len = app.session.state().hand.len();
        assert_eq!(hand_len, 0);
        app.draw();
        let entry = app.session.state().hand[0].card.clone();
        app.hand_cursor = 0;
        app.play_focused();
        if app.session.builder().card_kind(&entry) == Some(CardKind::Base) {
            assert!(app.session.state().active_play.is_some());
            app.play_focused();
            assert!(app.session.state().active_play.is_none());
        } else {
            assert!(app.status_line.starts_with("error:"));
        }
    }

    #[test]
    fn switching_roles_keeps_decks_apart() {
        let mut app = app();
        ready(&mut app);
        app.switch_role();
        assert_eq!(app.session.state().phase, DeckPhase::Unlocked);
        assert_eq!(app.status_line, "Game Master mode");
        app.switch_role();
        assert_eq!(app.session.state().phase, DeckPhase::LockedReady);
    }
}
