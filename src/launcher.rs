//! Spawn-or-focus: bring an application to the front, starting it if needed.

use crate::command::Action;
use crate::error::NiriError;
use crate::niri::types::Window;
use crate::traits::Compositor;
use log::info;

/// Whether `window` belongs to the application `app_id`.
///
/// Case-insensitive.  The window's app id only has to occur inside `app_id`,
/// so `org.mozilla.firefox` also matches a window reporting `firefox`.
pub fn matches_app(window: &Window, app_id: &str) -> bool {
    let wanted = app_id.to_lowercase();
    window
        .app_id
        .as_deref()
        .map(str::to_lowercase)
        .is_some_and(|own| !own.is_empty() && wanted.contains(&own))
}

/// Focus the first window of `app_id`, or ask niri to spawn `command`.
///
/// If the focused window already belongs to `app_id`, focus goes back to the
/// previously focused window instead, so the same key binding toggles
/// between the application and whatever was in use before.  `command` is
/// split on whitespace into the program and its arguments.
///
/// Returns the action that was performed.
pub fn spawn_or_focus<C: Compositor>(
    compositor: &C,
    app_id: &str,
    command: &str,
) -> Result<Action, NiriError> {
    let focused = compositor.focused_window()?;
    let windows = compositor.windows()?;

    let action = match windows.iter().find(|w| matches_app(w, app_id)) {
        Some(_) if focused.as_ref().is_some_and(|w| matches_app(w, app_id)) => {
            Action::FocusWindowPrevious {}
        }
        Some(window) => Action::FocusWindow { id: window.id },
        None => {
            let argv: Vec<String> = command.split_whitespace().map(String::from).collect();
            if argv.is_empty() {
                return Err(NiriError::InvalidArgument(format!(
                    "no command to spawn for {}",
                    app_id
                )));
            }
            Action::Spawn { command: argv }
        }
    };

    info!("{}: {}", app_id, action.name());
    compositor.perform(action.clone())?;
    Ok(action)
}
