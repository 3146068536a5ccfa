use crate::app::{App, FocusPane};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Alignment, Color, Line, Modifier, Style, Stylize};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub fn draw(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Length(8),
        ])
        .split(frame.area());

    draw_header(frame, root[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(root[1]);

    let piles = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(middle[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(4)])
        .split(middle[2]);

    draw_composition(frame, middle[0], app);
    draw_hand(frame, piles[0], app);
    draw_discard(frame, piles[1], app);
    draw_play(frame, right[0], app);
    draw_saved(frame, right[1], app);
    draw_events(frame, root[2], app);

    if app.show_help {
        draw_help_popup(frame);
    }
    if let Some(input) = app.name_prompt.as_deref() {
        draw_name_prompt(frame, input);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let builder = app.session.builder();
    let state = &builder.state;
    let title = format!(
        "Deckhand | {} | Focus: {} | Next: {}",
        app.session.role().label(),
        app.focus_label(app.focus),
        app.next_hint()
    );
    let base_summary = if builder.rules.simple_counters {
        format!("Bases {}", state.base_total())
    } else {
        format!("Bases {}/{}", state.base_total(), builder.rules.base_target)
    };
    let summary = format!(
        "{}  {}  Nulls {}  Capacity {}  Deck {}  Hand {}/{}  Discard {}",
        state.phase.label(),
        base_summary,
        state.null_count,
        app.capacity_summary(),
        state.deck.len(),
        state.hand.len(),
        state.hand_limit,
        state.discard.len()
    );
    let mut lines = vec![
        Line::from(title.bold()),
        Line::from(summary),
        Line::from(format!("Status: {}", app.status_line)),
    ];
    if let Some(err) = app.session.last_store_error() {
        lines.push(Line::from(format!("Storage: {err}")).fg(Color::Red));
    }
    let block = Block::default().borders(Borders::ALL).title("Overview");
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(paragraph, area);
}

fn highlighted(list: List<'_>) -> List<'_> {
    list.highlight_style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol(">> ")
}

fn draw_composition(frame: &mut Frame, area: Rect, app: &App) {
    let rows = app.composition_rows();
    let items: Vec<ListItem<'_>> = rows
        .iter()
        .map(|row| ListItem::new(app.composition_label(row)))
        .collect();
    let title = if app.session.state().is_locked() {
        "Composition (locked)"
    } else {
        "Composition"
    };
    let block = pane_block(title, app.focus == FocusPane::Composition);
    let list = highlighted(List::new(items).block(block));
    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(app.composition_cursor.min(rows.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_hand(frame: &mut Frame, area: Rect, app: &App) {
    let hand = &app.session.state().hand;
    let items: Vec<ListItem<'_>> = if hand.is_empty() {
        vec![ListItem::new("empty")]
    } else {
        hand.iter()
            .enumerate()
            .map(|(idx, entry)| ListItem::new(app.hand_label(idx, entry)))
            .collect()
    };
    let block = pane_block("Hand", app.focus == FocusPane::Hand);
    let list = highlighted(List::new(items).block(block));
    let mut state = ListState::default();
    if !hand.is_empty() {
        state.select(Some(app.hand_cursor.min(hand.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_discard(frame: &mut Frame, area: Rect, app: &App) {
    let discard = &app.session.state().discard;
    let items: Vec<ListItem<'_>> = if discard.is_empty() {
        vec![ListItem::new("empty")]
    } else {
        discard
            .iter()
            .enumerate()
            .map(|(idx, entry)| ListItem::new(app.discard_label(idx, entry)))
            .collect()
    };
    let block = pane_block("Discard", app.focus == FocusPane::Discard);
    let list = highlighted(List::new(items).block(block));
    let mut state = ListState::default();
    if !discard.is_empty() {
        state.select(Some(app.discard_cursor.min(discard.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_play(frame: &mut Frame, area: Rect, app: &App) {
    let builder = app.session.builder();
    let block = Block::default().borders(Borders::ALL).title("Play");
    let Some(play) = builder.state.active_play.as_ref() else {
        frame.render_widget(
            Paragraph::new("no play in progress")
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    };
    let catalog = &builder.catalog;
    let base = play
        .base_id(&builder.state)
        .map(|id| catalog.name_of(id))
        .unwrap_or("-");
    let mut lines = vec![Line::from(format!("Base: {base}").bold())];
    for id in play.modifier_ids(&builder.state) {
        lines.push(Line::from(format!(
            "  + {} ({})",
            catalog.name_of(id),
            builder.charge_for(id)
        )));
    }
    if builder.rules.capacity_checks_enabled() && builder.rules.play_capacity_check {
        lines.push(Line::from(format!(
            "Capacity {}/{}",
            builder.play_capacity_used(),
            builder.state.capacity
        )));
    }
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_saved(frame: &mut Frame, area: Rect, app: &App) {
    let names = app.saved_names();
    let items: Vec<ListItem<'_>> = if names.is_empty() {
        vec![ListItem::new("none")]
    } else {
        names.iter().map(|name| ListItem::new(name.clone())).collect()
    };
    let block = pane_block("Saved decks", app.focus == FocusPane::Saved);
    let list = highlighted(List::new(items).block(block));
    let mut state = ListState::default();
    if !names.is_empty() {
        state.select(Some(app.saved_cursor.min(names.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_events(frame: &mut Frame, area: Rect, app: &App) {
    let capacity = area.height.saturating_sub(2) as usize;
    let start = app.event_log.len().saturating_sub(capacity);
    let lines: Vec<Line<'_>> = app
        .event_log
        .iter()
        .skip(start)
        .map(|line| Line::from(line.clone()))
        .collect();
    let block = Block::default().borders(Borders::ALL).title("Events");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help_popup(frame: &mut Frame) {
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from("q quit | ? help | tab focus | arrows/jk move"),
        Line::from("+/- or left/right change the focused count"),
        Line::from("[ ] capacity | < > hand limit | Z reset counts"),
        Line::from("l lock/unlock | b build | s shuffle | d draw"),
        Line::from("p play base / attach or detach modifier"),
        Line::from("enter finalize play or focused action | esc cancel play"),
        Line::from("x discard | X discard hand | space toggle spent"),
        Line::from("h discard to hand | H all discard to hand"),
        Line::from("r discard to deck top | R same, then shuffle | A whole pile"),
        Line::from("S save deck | o load saved | D delete saved"),
        Line::from("m switch player / game master"),
    ];
    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_name_prompt(frame: &mut Frame, input: &str) {
    let area = centered_rect(60, 24, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from("Enter=save  Esc=cancel"),
        Line::from("An existing name is overwritten."),
        Line::from(""),
        Line::from(format!("> {input}")),
    ];
    let block = Block::default()
        .title("Save deck as")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let mut block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    block
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
