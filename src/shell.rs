//! Headless command shell - drives the viewer from stdin.
//!
//! One command per line:
//!
//! | Input              | Command        |
//! |--------------------|----------------|
//! | `next`, `n`        | StepForward    |
//! | `prev`, `p`        | StepBackward   |
//! | `seek <i>`, `s <i>`| Seek(i)        |
//! | `play` / `pause`   | Play / Pause   |
//! | `toggle`, `t`      | TogglePlay     |
//! | `left` / `right`   | arrow keys     |
//! | `reload`           | Reload         |
//! | `quit`, `q`        | Shutdown       |
//!
//! In headless mode end of input also shuts the viewer down; next to the
//! HTTP server it only stops the reader.

use std::io::BufRead;
use std::thread;

use crossbeam_channel::Sender;
use log::{debug, warn};

use crate::core::events::{ViewerCommand, parse_frame_index};

/// Parse one input line. `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<ViewerCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "next" | "n" => ViewerCommand::StepForward,
        "prev" | "p" => ViewerCommand::StepBackward,
        "play" => ViewerCommand::Play,
        "pause" => ViewerCommand::Pause,
        "toggle" | "t" => ViewerCommand::TogglePlay,
        "left" => ViewerCommand::Key("ArrowLeft".to_string()),
        "right" => ViewerCommand::Key("ArrowRight".to_string()),
        "reload" => ViewerCommand::Reload,
        "quit" | "q" | "exit" => ViewerCommand::Shutdown,
        "seek" | "s" => {
            let arg = words.next().ok_or_else(|| "seek needs a frame index".to_string())?;
            let index =
                parse_frame_index(arg).ok_or_else(|| format!("invalid frame index: {}", arg))?;
            ViewerCommand::Seek(index)
        }
        other => return Err(format!("unknown command: {}", other)),
    };

    if let Some(extra) = words.next() {
        return Err(format!("unexpected argument: {}", extra));
    }
    Ok(Some(command))
}

/// What end of input means for the viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnEof {
    /// Headless: the shell is the only input, so stop the viewer
    Shutdown,
    /// Server: the browser keeps driving the viewer
    KeepRunning,
}

/// Feed commands from `input` into `tx` until `quit` or EOF.
pub fn read_commands(input: impl BufRead, tx: &Sender<ViewerCommand>, on_eof: OnEof) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                break;
            }
        };
        match parse_command(&line) {
            Ok(Some(command)) => {
                let quit = command == ViewerCommand::Shutdown;
                if tx.send(command).is_err() || quit {
                    return;
                }
            }
            Ok(None) => {}
            Err(msg) => eprintln!("{}", msg),
        }
    }
    debug!("End of input");
    if on_eof == OnEof::Shutdown {
        let _ = tx.send(ViewerCommand::Shutdown);
    }
}

/// Read stdin on a background thread
pub fn spawn_stdin_reader(
    tx: Sender<ViewerCommand>,
    on_eof: OnEof,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("frameview-stdin".to_string())
        .spawn(move || read_commands(std::io::stdin().lock(), &tx, on_eof))
}
