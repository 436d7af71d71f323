use std::{
    io::{BufRead, BufReader},
    thread::{self, JoinHandle},
};

use anyhow::{Context, Result, anyhow, bail};
use bevy::prelude::Vec3;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};

use crate::{
    constants::COMMAND_NAME,
    events::{HostEvent, PyreCommand},
};
use common::protocol::ItemKind;

// ============================================================================
// Console Thread
// ============================================================================

// Stdin reads block, so the console runs on its own thread and never holds up
// runtime shutdown.
pub fn spawn_console(to_server: UnboundedSender<HostEvent>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || console_loop(BufReader::new(std::io::stdin()), &to_server))
        .context("failed to spawn console thread")
}

// Read host events, one per line, until EOF or the server is gone. EOF
// requests a shutdown.
pub fn console_loop(input: impl BufRead, to_server: &UnboundedSender<HostEvent>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("error reading console: {e}");
                break;
            }
        };

        match parse_line(&line) {
            Ok(Some(event)) => {
                debug!("console: {:?}", event);
                if to_server.send(event).is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("console: {e:#}"),
        }
    }

    debug!("console closed");
    let _ = to_server.send(HostEvent::Shutdown);
}

// ============================================================================
// Line Parsing
// ============================================================================

// Blank lines and `#` comments parse to nothing.
pub fn parse_line(line: &str) -> Result<Option<HostEvent>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let event = match words.as_slice() {
        ["join", name] => HostEvent::Join { name: (*name).to_string() },
        ["quit", name] => HostEvent::Quit { name: (*name).to_string() },
        ["look", name, x, y, z] => HostEvent::Look {
            name: (*name).to_string(),
            direction: parse_vec3(x, y, z)?,
        },
        ["tp", name, x, y, z] => HostEvent::Teleport {
            name: (*name).to_string(),
            position: parse_vec3(x, y, z)?,
        },
        ["hold", name, item] => HostEvent::Hold {
            name: (*name).to_string(),
            item: parse_item(item)?,
        },
        ["sneak", name, state] => HostEvent::Sneak {
            name: (*name).to_string(),
            sneaking: parse_switch(state)?,
        },
        ["gamemode", name, mode] => HostEvent::GameMode {
            name: (*name).to_string(),
            mode: mode.parse()?,
        },
        ["interact", name, action] => HostEvent::Interact {
            name: (*name).to_string(),
            action: action.parse()?,
        },
        ["spawn", label, x, y, z] => HostEvent::SpawnCreature {
            label: (*label).to_string(),
            position: parse_vec3(x, y, z)?,
        },
        ["command", sender, rest @ ..] => HostEvent::Command {
            sender: (*sender).to_string(),
            command: parse_command(rest)?,
        },
        ["shutdown"] => HostEvent::Shutdown,
        _ => bail!("unrecognized line '{line}'"),
    };
    Ok(Some(event))
}

fn parse_vec3(x: &str, y: &str, z: &str) -> Result<Vec3> {
    let component = |s: &str| s.parse::<f32>().with_context(|| format!("invalid coordinate '{s}'"));
    Ok(Vec3::new(component(x)?, component(y)?, component(z)?))
}

fn parse_item(item: &str) -> Result<Option<ItemKind>> {
    if item == "none" {
        return Ok(None);
    }
    Ok(Some(item.parse()?))
}

fn parse_switch(state: &str) -> Result<bool> {
    match state {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(anyhow!("expected on or off, got '{state}'")),
    }
}

fn parse_command(words: &[&str]) -> Result<PyreCommand> {
    match words {
        [name] if *name == COMMAND_NAME => Ok(PyreCommand::Start),
        [name, "start"] if *name == COMMAND_NAME => Ok(PyreCommand::Start),
        [name, "stop"] if *name == COMMAND_NAME => Ok(PyreCommand::Stop),
        _ => bail!("unknown command '{}'", words.join(" ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::protocol::{GameMode, InteractAction};

    #[test]
    fn parses_player_lines() {
        assert_eq!(
            parse_line("join alex").unwrap(),
            Some(HostEvent::Join { name: "alex".to_string() })
        );
        assert_eq!(
            parse_line("  look alex 0 -1 0.5 ").unwrap(),
            Some(HostEvent::Look {
                name: "alex".to_string(),
                direction: Vec3::new(0.0, -1.0, 0.5)
            })
        );
        assert_eq!(
            parse_line("hold alex none").unwrap(),
            Some(HostEvent::Hold {
                name: "alex".to_string(),
                item: None
            })
        );
        assert_eq!(
            parse_line("sneak alex on").unwrap(),
            Some(HostEvent::Sneak {
                name: "alex".to_string(),
                sneaking: true
            })
        );
        assert_eq!(
            parse_line("gamemode alex creative").unwrap(),
            Some(HostEvent::GameMode {
                name: "alex".to_string(),
                mode: GameMode::Creative
            })
        );
        assert_eq!(
            parse_line("interact alex right_air").unwrap(),
            Some(HostEvent::Interact {
                name: "alex".to_string(),
                action: InteractAction::RightClickAir
            })
        );
    }

    #[test]
    fn parses_admin_commands() {
        let start = HostEvent::Command {
            sender: "alex".to_string(),
            command: PyreCommand::Start,
        };
        assert_eq!(parse_line("command alex pyre").unwrap(), Some(start.clone()));
        assert_eq!(parse_line("command alex pyre start").unwrap(), Some(start));
        assert_eq!(
            parse_line("command alex pyre stop").unwrap(),
            Some(HostEvent::Command {
                sender: "alex".to_string(),
                command: PyreCommand::Stop
            })
        );
        assert!(parse_line("command alex fly").is_err());
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# setup").unwrap(), None);
    }

    #[test]
    fn console_loop_forwards_events_and_shuts_down_at_eof() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let input = std::io::Cursor::new("join alex\nbogus line\n\nspawn zombie 0 0 -3\n");
        console_loop(input, &tx);

        assert_eq!(rx.try_recv().unwrap(), HostEvent::Join { name: "alex".to_string() });
        assert!(matches!(rx.try_recv().unwrap(), HostEvent::SpawnCreature { .. }));
        assert_eq!(rx.try_recv().unwrap(), HostEvent::Shutdown);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn reports_bad_input() {
        assert!(parse_line("dance alex").is_err());
        assert!(parse_line("tp alex 1 two 3").is_err());
        assert!(parse_line("sneak alex maybe").is_err());
        let err = parse_line("hold alex diamond").unwrap_err();
        assert_eq!(err.to_string(), "unknown item 'diamond'");
    }
}
