use anyhow::{Context, Result};
use deckhand_core::{CardKind, DeckAction, DiscardOrigin};
use deckhand_cui::{format_event, Session};
use deckhand_data::{parse_counts, Role};
use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Status,
    Catalog,
    Hand,
    Discards,
    Saves,
    Deck(Vec<DeckAction>),
    Export(Option<PathBuf>),
    Import(PathBuf),
    Mode(Option<Role>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Rejected,
    Quit,
}

pub fn run_line(session: &mut Session, line: &str, out: &mut impl Write) -> Result<()> {
    let command = match parse_command(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Ok(()),
        Err(err) => anyhow::bail!(err),
    };
    match execute(session, command, out)? {
        Flow::Rejected => anyhow::bail!("command rejected"),
        Flow::Continue | Flow::Quit => Ok(()),
    }
}

pub fn run_repl(
    session: &mut Session,
    input: impl BufRead,
    out: &mut impl Write,
    interactive: bool,
) -> Result<()> {
    if interactive {
        writeln!(out, "deckhand: type 'help' for commands")?;
        print_status(session, out)?;
        write!(out, "{}", prompt(session))?;
        out.flush()?;
    }
    for line in input.lines() {
        let line = line.context("read command")?;
        let flow = match parse_command(&line) {
            Ok(Some(command)) => execute(session, command, out)?,
            Ok(None) => Flow::Continue,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                Flow::Rejected
            }
        };
        if flow == Flow::Quit {
            break;
        }
        if interactive {
            write!(out, "{}", prompt(session))?;
            out.flush()?;
        }
    }
    Ok(())
}

fn prompt(session: &Session) -> String {
    format!(
        "[{} {}] > ",
        session.role().code(),
        session.state().phase.label()
    )
}

fn parse_delta(value: Option<&&str>) -> Result<i32, String> {
    let value = value.ok_or_else(|| "missing amount".to_string())?;
    value
        .parse::<i32>()
        .map_err(|_| format!("invalid amount '{value}'"))
}

fn parse_index(value: Option<&&str>) -> Result<usize, String> {
    let value = value.ok_or_else(|| "missing index".to_string())?;
    value
        .parse::<usize>()
        .map_err(|_| format!("invalid index '{value}'"))
}

fn parse_indices(args: &[&str]) -> Result<Vec<usize>, String> {
    let mut indices = Vec::new();
    for arg in args {
        for part in arg.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some((start, end)) = part.split_once('-') {
                let start = start
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| "invalid range start".to_string())?;
                let end = end
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| "invalid range end".to_string())?;
                if start > end {
                    return Err("range start larger than end".to_string());
                }
                indices.extend(start..=end);
            } else {
                let idx = part
                    .parse::<usize>()
                    .map_err(|_| format!("invalid index '{part}'"))?;
                indices.push(idx);
            }
        }
    }
    if indices.is_empty() {
        return Err("missing indices".to_string());
    }
    Ok(indices)
}

/// Highest first so earlier removals do not shift later positions.
fn descending(mut indices: Vec<usize>) -> Vec<usize> {
    indices.sort_unstable_by(|a, b| b.cmp(a));
    indices.dedup();
    indices
}

fn take_origin(args: &mut Vec<&str>) -> DiscardOrigin {
    match args.iter().position(|arg| *arg == "played") {
        Some(pos) => {
            args.remove(pos);
            DiscardOrigin::Played
        }
        None => DiscardOrigin::Discarded,
    }
}

fn take_flag(args: &mut Vec<&str>, flag: &str) -> bool {
    match args.iter().position(|arg| *arg == flag) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}

fn require_name(args: &[&str]) -> Result<String, String> {
    if args.is_empty() {
        return Err("missing deck name".to_string());
    }
    Ok(args.join(" "))
}

pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(None);
    };
    let mut args: Vec<&str> = parts.collect();
    let single = |action: DeckAction| Ok(Some(Command::Deck(vec![action])));
    match cmd {
        "help" | "h" | "?" => Ok(Some(Command::Help)),
        "quit" | "exit" | "q" => Ok(Some(Command::Quit)),
        "status" | "s" => Ok(Some(Command::Status)),
        "catalog" | "cards" => Ok(Some(Command::Catalog)),
        "hand" => Ok(Some(Command::Hand)),
        "pile" | "discards" => Ok(Some(Command::Discards)),
        "saves" => Ok(Some(Command::Saves)),
        "base" | "mod" => {
            let card = args
                .first()
                .ok_or_else(|| "missing card id".to_string())?
                .to_string();
            let delta = parse_delta(args.get(1))?;
            if cmd == "base" {
                single(DeckAction::AdjustBase { card, delta })
            } else {
                single(DeckAction::AdjustModifier { card, delta })
            }
        }
        "nulls" => single(DeckAction::AdjustNulls {
            delta: parse_delta(args.first())?,
        }),
        "capacity" | "cap" => single(DeckAction::AdjustCapacity {
            delta: parse_delta(args.first())?,
        }),
        "limit" => single(DeckAction::AdjustHandLimit {
            delta: parse_delta(args.first())?,
        }),
        "reset" => single(DeckAction::ResetComposition),
        "lock" => single(DeckAction::Lock),
        "unlock" => single(DeckAction::Unlock),
        "build" => single(DeckAction::Build),
        "shuffle" => single(DeckAction::Shuffle),
        "draw" | "d" => match args.first() {
            None => single(DeckAction::Draw),
            Some(_) => single(DeckAction::DrawMany {
                count: parse_index(args.first())?,
            }),
        },
        "discard" | "x" => {
            let origin = take_origin(&mut args);
            let all = take_flag(&mut args, "all");
            let card = args
                .first()
                .ok_or_else(|| "missing card id".to_string())?
                .to_string();
            single(DeckAction::Discard { card, origin, all })
        }
        "toss" => {
            let origin = take_origin(&mut args);
            let actions = descending(parse_indices(&args)?)
                .into_iter()
                .map(|index| DeckAction::DiscardAt { index, origin })
                .collect();
            Ok(Some(Command::Deck(actions)))
        }
        "discard-hand" => {
            let origin = take_origin(&mut args);
            single(DeckAction::DiscardHand { origin })
        }
        "play" | "p" => single(DeckAction::SelectBase {
            index: parse_index(args.first())?,
        }),
        "attach" | "detach" => {
            let actions = parse_indices(&args)?
                .into_iter()
                .map(|index| {
                    if cmd == "attach" {
                        DeckAction::Attach { index }
                    } else {
                        DeckAction::Detach { index }
                    }
                })
                .collect();
            Ok(Some(Command::Deck(actions)))
        }
        "finalize" | "go" => single(DeckAction::FinalizePlay),
        "cancel" => single(DeckAction::CancelPlay),
        "spent" => single(DeckAction::ToggleSpent {
            index: parse_index(args.first())?,
        }),
        "return" | "ret" => {
            let shuffle = take_flag(&mut args, "shuffle");
            let target = args
                .first()
                .copied()
                .ok_or_else(|| "return hand|deck <index|all>".to_string())?;
            let rest = &args[1..];
            let all = rest.first() == Some(&"all");
            match (target, all) {
                ("hand", true) => single(DeckAction::ReturnAllToHand),
                ("hand", false) => Ok(Some(Command::Deck(
                    descending(parse_indices(rest)?)
                        .into_iter()
                        .map(|index| DeckAction::ReturnToHand { index })
                        .collect(),
                ))),
                ("deck", true) => single(DeckAction::ReturnAllToDeck { shuffle }),
                ("deck", false) => single(DeckAction::ReturnToDeck {
                    index: parse_index(rest.first())?,
                    shuffle,
                }),
                _ => Err(format!("unknown return target '{target}'")),
            }
        }
        "save" => single(DeckAction::SaveDeck {
            name: require_name(&args)?,
        }),
        "load" => single(DeckAction::LoadDeck {
            name: require_name(&args)?,
        }),
        "delete" | "rm" => single(DeckAction::DeleteDeck {
            name: require_name(&args)?,
        }),
        "export" => Ok(Some(Command::Export(args.first().map(PathBuf::from)))),
        "import" => {
            let path = args.first().ok_or_else(|| "missing file".to_string())?;
            Ok(Some(Command::Import(PathBuf::from(path))))
        }
        "mode" => match args.first() {
            None => Ok(Some(Command::Mode(None))),
            Some(value) => Role::parse(value)
                .map(|role| Some(Command::Mode(Some(role))))
                .ok_or_else(|| format!("unknown role '{value}'")),
        },
        "action" => {
            let raw = line.trim_start().trim_start_matches("action").trim();
            let action: DeckAction =
                serde_json::from_str(raw).map_err(|err| format!("invalid action: {err}"))?;
            single(action)
        }
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

pub fn execute(session: &mut Session, command: Command, out: &mut impl Write) -> Result<Flow> {
    match command {
        Command::Help => print_help(out)?,
        Command::Quit => return Ok(Flow::Quit),
        Command::Status => print_status(session, out)?,
        Command::Catalog => print_catalog(session, out)?,
        Command::Hand => print_hand(session, out)?,
        Command::Discards => print_discards(session, out)?,
        Command::Saves => print_saves(session, out)?,
        Command::Deck(actions) => {
            for action in actions {
                match session.apply(action) {
                    Ok(events) => {
                        for event in &events {
                            writeln!(out, "  {}", format_event(session.catalog(), event))?;
                        }
                    }
                    Err(err) => {
                        writeln!(out, "error: {err}")?;
                        return Ok(Flow::Rejected);
                    }
                }
            }
            if let Some(err) = session.last_store_error() {
                writeln!(out, "warning: not saved: {err}")?;
            }
        }
        Command::Export(path) => {
            let body = serde_json::to_string_pretty(&session.export())?;
            match path {
                Some(path) => {
                    fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
                    writeln!(out, "exported deck list to {}", path.display())?;
                }
                None => writeln!(out, "{body}")?,
            }
        }
        Command::Import(path) => {
            let raw = match fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(err) => {
                    writeln!(out, "error: read {}: {err}", path.display())?;
                    return Ok(Flow::Rejected);
                }
            };
            let outcome = parse_counts(&raw)
                .map_err(|err| err.to_string())
                .and_then(|export| session.import(&export).map_err(|err| err.to_string()));
            match outcome {
                Ok(events) => {
                    for event in &events {
                        writeln!(out, "  {}", format_event(session.catalog(), event))?;
                    }
                }
                Err(err) => {
                    writeln!(out, "error: {err}")?;
                    return Ok(Flow::Rejected);
                }
            }
        }
        Command::Mode(role) => {
            let role = role.unwrap_or_else(|| session.role().toggle());
            session
                .switch_role(role)
                .with_context(|| format!("switch to {}", role.label()))?;
            writeln!(out, "{} mode", role.label())?;
            print_status(session, out)?;
        }
    }
    Ok(Flow::Continue)
}

fn print_help(out: &mut impl Write) -> Result<()> {
    let lines = [
        "status | catalog | hand | pile | saves",
        "base <id> <+n|-n> | mod <id> <+n|-n> | nulls <n> | capacity <n> | limit <n> | reset",
        "lock | unlock | build | shuffle | draw [count]",
        "discard <id> [all] [played] | toss <idx..> [played] | discard-hand [played]",
        "play <idx> | attach <idx..> | detach <idx..> | finalize | cancel",
        "return hand <idx..|all> | return deck <idx|all> [shuffle] | spent <idx>",
        "save <name> | load <name> | delete <name>",
        "export [file] | import <file> | mode [player|gm] | action <json>",
        "quit",
    ];
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn print_status(session: &Session, out: &mut impl Write) -> Result<()> {
    let builder = session.builder();
    let state = &builder.state;
    let rules = &builder.rules;
    writeln!(
        out,
        "{} | phase: {} | next: {}",
        session.role().label(),
        state.phase.label(),
        state.phase.next_step()
    )?;
    let bases = if rules.simple_counters {
        state.base_total().to_string()
    } else {
        format!("{}/{}", state.base_total(), rules.base_target)
    };
    let capacity = if rules.capacity_checks_enabled() {
        format!("{}/{}", builder.capacity_used(), state.capacity)
    } else {
        format!("{} (unchecked)", state.capacity)
    };
    writeln!(
        out,
        "bases {bases} | modifiers {} | nulls {} | capacity {capacity}",
        state.modifier_total(),
        state.null_count
    )?;
    writeln!(
        out,
        "deck {} | hand {}/{} | discard {}",
        state.deck.len(),
        state.hand.len(),
        state.hand_limit,
        state.discard.len()
    )?;
    if let Some(play) = state.active_play.as_ref() {
        let base = play
            .base_id(state)
            .map(|id| builder.catalog.name_of(id))
            .unwrap_or("-");
        let modifiers: Vec<&str> = play
            .modifier_ids(state)
            .into_iter()
            .map(|id| builder.catalog.name_of(id))
            .collect();
        writeln!(
            out,
            "play: {base}{}",
            if modifiers.is_empty() {
                String::new()
            } else {
                format!(" + {}", modifiers.join(", "))
            }
        )?;
    }
    Ok(())
}

fn print_catalog(session: &Session, out: &mut impl Write) -> Result<()> {
    let builder = session.builder();
    for card in builder.catalog.iter() {
        let count = match card.kind {
            CardKind::Base => builder.state.base_count(&card.id),
            CardKind::Modifier => builder.state.modifier_count(&card.id),
            CardKind::Null => builder.state.null_count,
        };
        let cost = if card.kind == CardKind::Modifier {
            format!(" cost {}", builder.charge_for(&card.id))
        } else {
            String::new()
        };
        writeln!(
            out,
            "{:<10} {:<14} {:<8} x{count}{cost}",
            card.id,
            card.name,
            card.kind.label()
        )?;
        for detail in &card.details {
            writeln!(out, "           {detail}")?;
        }
    }
    Ok(())
}

fn print_hand(session: &Session, out: &mut impl Write) -> Result<()> {
    let state = session.state();
    if state.hand.is_empty() {
        writeln!(out, "hand is empty")?;
        return Ok(());
    }
    for (idx, entry) in state.hand.iter().enumerate() {
        let marker = match state.active_play.as_ref() {
            Some(play) if play.base == idx => "B",
            Some(play) if play.modifiers.contains(&idx) => "+",
            _ => " ",
        };
        writeln!(
            out,
            "{marker} {idx:>2}: {}{}",
            session.catalog().name_of(&entry.card),
            if entry.spent { " (spent)" } else { "" }
        )?;
    }
    Ok(())
}

fn print_discards(session: &Session, out: &mut impl Write) -> Result<()> {
    let state = session.state();
    if state.discard.is_empty() {
        writeln!(out, "discard pile is empty")?;
        return Ok(());
    }
    for (idx, entry) in state.discard.iter().enumerate() {
        writeln!(
            out,
            "{idx:>2}: {} [{}]",
            session.catalog().name_of(&entry.card),
            entry.origin.label()
        )?;
    }
    Ok(())
}

fn print_saves(session: &Session, out: &mut impl Write) -> Result<()> {
    let mut any = false;
    for name in session.builder().saved_deck_names() {
        writeln!(out, "{name}")?;
        any = true;
    }
    if !any {
        writeln!(out, "no saved decks")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckhand_core::DeckPhase;
    use deckhand_cui::SessionConfig;
    use deckhand_data::{builtin_catalog, MemoryStore, RoleRules, StorageKeys};

    fn session() -> Session {
        let config = SessionConfig {
            keys: StorageKeys::default(),
            rules: RoleRules::default(),
            catalog: builtin_catalog().expect("catalog"),
            seed: Some(11),
            role: None,
        };
        Session::open(Box::new(MemoryStore::new()), config)
    }

    fn run_script(session: &mut Session, script: &str) -> String {
        let mut out = Vec::new();
        run_repl(session, script.as_bytes(), &mut out, false).expect("script");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn parses_composition_commands() {
        assert_eq!(
            parse_command("base strike +3"),
            Ok(Some(Command::Deck(vec![DeckAction::AdjustBase {
                card: "strike".to_string(),
                delta: 3
            }])))
        );
        assert_eq!(
            parse_command("nulls -1"),
            Ok(Some(Command::Deck(vec![DeckAction::AdjustNulls { delta: -1 }])))
        );
        assert_eq!(parse_command("   "), Ok(None));
        assert!(parse_command("base strike").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn toss_removes_highest_positions_first() {
        assert_eq!(
            parse_command("toss 0,2-3 played"),
            Ok(Some(Command::Deck(vec![
                DeckAction::DiscardAt {
                    index: 3,
                    origin: DiscardOrigin::Played
                },
                DeckAction::DiscardAt {
                    index: 2,
                    origin: DiscardOrigin::Played
                },
                DeckAction::DiscardAt {
                    index: 0,
                    origin: DiscardOrigin::Played
                },
            ])))
        );
    }

    #[test]
    fn parses_return_forms() {
        assert_eq!(
            parse_command("return deck all shuffle"),
            Ok(Some(Command::Deck(vec![DeckAction::ReturnAllToDeck {
                shuffle: true
            }])))
        );
        assert_eq!(
            parse_command("return deck 2"),
            Ok(Some(Command::Deck(vec![DeckAction::ReturnToDeck {
                index: 2,
                shuffle: false
            }])))
        );
        assert_eq!(
            parse_command("return hand all"),
            Ok(Some(Command::Deck(vec![DeckAction::ReturnAllToHand])))
        );
        assert!(parse_command("return pocket 1").is_err());
    }

    #[test]
    fn parses_json_actions_and_roles() {
        assert_eq!(
            parse_command(r#"action {"action":"draw_many","count":2}"#),
            Ok(Some(Command::Deck(vec![DeckAction::DrawMany { count: 2 }])))
        );
        assert_eq!(
            parse_command("mode gm"),
            Ok(Some(Command::Mode(Some(Role::GameMaster))))
        );
        assert_eq!(
            parse_command("save my deck"),
            Ok(Some(Command::Deck(vec![DeckAction::SaveDeck {
                name: "my deck".to_string()
            }])))
        );
    }

    #[test]
    fn script_walks_the_lifecycle() {
        let mut session = session();
        let output = run_script(
            &mut session,
            "base strike 20\nbase guard 6\nlock\nbuild\nshuffle\ndraw 2\nstatus\n",
        );
        assert_eq!(session.state().phase, DeckPhase::LockedReady);
        assert_eq!(session.state().hand.len(), 2);
        assert!(output.contains("deck built with 31 cards"));
        assert!(output.contains("deck 29 | hand 2/7 | discard 0"));
    }

    #[test]
    fn rejections_are_reported_and_stop_the_batch() {
        let mut session = session();
        let output = run_script(&mut session, "draw\nattach 0,1\nquit\nbase strike 1\n");
        assert!(output.contains("error: Lock the deck before drawing"));
        assert_eq!(output.matches("error:").count(), 2);
        assert_eq!(session.state().base_total(), 0);
    }

    #[test]
    fn run_line_fails_on_rejection() {
        let mut session = session();
        let mut out = Vec::new();
        assert!(run_line(&mut session, "lock", &mut out).is_err());
        assert!(run_line(&mut session, "base strike 26", &mut out).is_ok());
        assert!(run_line(&mut session, "lock", &mut out).is_ok());
    }

    #[test]
    fn mode_switch_prints_the_other_deck() {
        let mut session = session();
        let output = run_script(&mut session, "base strike 4\nmode\n");
        assert_eq!(session.role(), Role::GameMaster);
        assert!(output.contains("Game Master mode"));
        assert!(output.contains("bases 0 |"));
    }
}
