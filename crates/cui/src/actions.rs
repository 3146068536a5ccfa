use crate::app::App;
use crate::input::InputAction;

pub fn dispatch(app: &mut App, action: InputAction) {
    match action {
        InputAction::None => {}
        InputAction::Quit => app.should_quit = true,
        InputAction::ToggleHelp => app.show_help = !app.show_help,
        InputAction::NextFocus => app.cycle_focus(true),
        InputAction::PrevFocus => app.cycle_focus(false),
        InputAction::MoveUp => app.move_cursor(false),
        InputAction::MoveDown => app.move_cursor(true),
        InputAction::Increase => app.adjust_focused(1),
        InputAction::Decrease => app.adjust_focused(-1),
        InputAction::CapacityUp => app.adjust_capacity(1),
        InputAction::CapacityDown => app.adjust_capacity(-1),
        InputAction::HandLimitUp => app.adjust_hand_limit(1),
        InputAction::HandLimitDown => app.adjust_hand_limit(-1),
        InputAction::ResetComposition => app.reset_composition(),
        InputAction::ToggleLock => app.toggle_lock(),
        InputAction::Build => app.build(),
        InputAction::Shuffle => app.shuffle(),
        InputAction::Draw => app.draw(),
        InputAction::Discard => app.discard_focused(),
        InputAction::DiscardHand => app.discard_hand(),
        InputAction::Play => app.play_focused(),
        InputAction::Activate => app.activate_primary(),
        InputAction::Escape => app.escape(),
        InputAction::ToggleSpent => app.toggle_spent(),
        InputAction::ReturnToHand => app.return_focused_to_hand(),
        InputAction::ReturnAllToHand => app.return_all_to_hand(),
        InputAction::ReturnToDeck => app.return_focused_to_deck(false),
        InputAction::ReturnToDeckShuffled => app.return_focused_to_deck(true),
        InputAction::ReturnAllToDeck => app.return_all_to_deck(),
        InputAction::SaveDeck => app.open_name_prompt(),
        InputAction::LoadDeck => app.load_focused_saved(),
        InputAction::DeleteDeck => app.delete_focused_saved(),
        InputAction::SwitchRole => app.switch_role(),
    }
}
