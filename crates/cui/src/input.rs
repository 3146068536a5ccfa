use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    ToggleHelp,
    NextFocus,
    PrevFocus,
    MoveUp,
    MoveDown,
    Increase,
    Decrease,
    CapacityUp,
    CapacityDown,
    HandLimitUp,
    HandLimitDown,
    ResetComposition,
    ToggleLock,
    Build,
    Shuffle,
    Draw,
    Discard,
    DiscardHand,
    Play,
    Activate,
    Escape,
    ToggleSpent,
    ReturnToHand,
    ReturnAllToHand,
    ReturnToDeck,
    ReturnToDeckShuffled,
    ReturnAllToDeck,
    SaveDeck,
    LoadDeck,
    DeleteDeck,
    SwitchRole,
}

pub fn map_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Esc => InputAction::Escape,
        KeyCode::Tab => InputAction::NextFocus,
        KeyCode::BackTab => InputAction::PrevFocus,
        KeyCode::Up => InputAction::MoveUp,
        KeyCode::Down => InputAction::MoveDown,
        KeyCode::Right => InputAction::Increase,
        KeyCode::Left => InputAction::Decrease,
        KeyCode::Enter => InputAction::Activate,
        KeyCode::Delete => InputAction::DeleteDeck,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::Quit,
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            InputAction::SaveDeck
        }
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('?') => InputAction::ToggleHelp,
        KeyCode::Char('k') => InputAction::MoveUp,
        KeyCode::Char('j') => InputAction::MoveDown,
        KeyCode::Char('+') | KeyCode::Char('=') => InputAction::Increase,
        KeyCode::Char('-') | KeyCode::Char('_') => InputAction::Decrease,
        KeyCode::Char(']') => InputAction::CapacityUp,
        KeyCode::Char('[') => InputAction::CapacityDown,
        KeyCode::Char('>') | KeyCode::Char('.') => InputAction::HandLimitUp,
        KeyCode::Char('<') | KeyCode::Char(',') => InputAction::HandLimitDown,
        KeyCode::Char('Z') => InputAction::ResetComposition,
        KeyCode::Char('l') => InputAction::ToggleLock,
        KeyCode::Char('b') => InputAction::Build,
        KeyCode::Char('s') => InputAction::Shuffle,
        KeyCode::Char('d') => InputAction::Draw,
        KeyCode::Char('x') => InputAction::Discard,
        KeyCode::Char('X') => InputAction::DiscardHand,
        KeyCode::Char('p') => InputAction::Play,
        KeyCode::Char(' ') => InputAction::ToggleSpent,
        KeyCode::Char('h') => InputAction::ReturnToHand,
        KeyCode::Char('H') => InputAction::ReturnAllToHand,
        KeyCode::Char('r') => InputAction::ReturnToDeck,
        KeyCode::Char('R') => InputAction::ReturnToDeckShuffled,
        KeyCode::Char('A') => InputAction::ReturnAllToDeck,
        KeyCode::Char('S') => InputAction::SaveDeck,
        KeyCode::Char('o') => InputAction::LoadDeck,
        KeyCode::Char('D') => InputAction::DeleteDeck,
        KeyCode::Char('m') => InputAction::SwitchRole,
        _ => InputAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_lifecycle_keys() {
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::NONE)),
            InputAction::ToggleLock
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::NONE)),
            InputAction::Build
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE)),
            InputAction::Draw
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
            InputAction::Quit
        );
    }

    #[test]
    fn shifted_letters_are_distinct_actions() {
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT)),
            InputAction::SaveDeck
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE)),
            InputAction::Shuffle
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            InputAction::SaveDeck
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT)),
            InputAction::ReturnToDeckShuffled
        );
    }

    #[test]
    fn counters_accept_both_key_styles() {
        for code in [KeyCode::Char('+'), KeyCode::Char('='), KeyCode::Right] {
            assert_eq!(
                map_key(KeyEvent::new(code, KeyModifiers::NONE)),
                InputAction::Increase
            );
        }
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)),
            InputAction::Decrease
        );
    }
}
