//! Keyboard bindings.

use crate::core::events::ViewerCommand;

/// Key name (DOM `KeyboardEvent.key`) → command
pub const KEY_BINDINGS: &[(&str, ViewerCommand)] = &[
    ("ArrowLeft", ViewerCommand::StepBackward),
    ("ArrowRight", ViewerCommand::StepForward),
];

/// Command bound to `key`, if any
pub fn command_for_key(key: &str) -> Option<ViewerCommand> {
    KEY_BINDINGS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, command)| command.clone())
}
