//! Command loop - owns the viewer for the lifetime of the process.
//!
//! Loads the manifest, optionally starts playback, then applies commands one
//! at a time until `Shutdown`. Every other thread (HTTP, stdin, playback
//! timer) only talks to the viewer through the channel.

use std::ops::ControlFlow;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info};

use crate::config::ViewerConfig;
use crate::core::events::ViewerCommand;
use crate::core::viewer::Viewer;
use crate::display::DisplaySurface;

/// Run the viewer until a `Shutdown` command arrives.
///
/// `commands` must be the sending half of `inbox`; the playback timer uses it.
pub fn run_viewer<S: DisplaySurface>(
    config: &ViewerConfig,
    surface: S,
    commands: Sender<ViewerCommand>,
    inbox: Receiver<ViewerCommand>,
) {
    let mut viewer = Viewer::new(surface, commands, config.play_interval);
    viewer.load_from(&config.manifest_location(), config.max_frames);

    if config.autoplay {
        info!("Autoplay enabled");
        viewer.play();
    }

    for command in inbox.iter() {
        if dispatch(&mut viewer, command, config).is_break() {
            break;
        }
    }

    viewer.pause();
    info!("Viewer stopped");
}

/// Apply one command. `Break` ends the loop.
pub fn dispatch<S: DisplaySurface>(
    viewer: &mut Viewer<S>,
    command: ViewerCommand,
    config: &ViewerConfig,
) -> ControlFlow<()> {
    match command {
        ViewerCommand::Shutdown => {
            debug!("Shutdown requested");
            return ControlFlow::Break(());
        }
        ViewerCommand::Reload => {
            info!("Reloading {}", config.manifest_location());
            viewer.load_from(&config.manifest_location(), config.max_frames);
        }
        other => viewer.apply(other),
    }
    ControlFlow::Continue(())
}
