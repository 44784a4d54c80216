//! Workspace cycling on the focused output.
//!
//! Workspaces on a niri output form a vertical list indexed from 1.
//! [`WorkspaceNavigator::cycle`] moves one step up or down, wrapping at both
//! ends.  With occupancy skipping enabled, a jump from an empty workspace
//! over further empty ones lands on the nearest workspace that has windows.

use crate::command::{Action, Direction, WorkspaceReference};
use crate::error::NiriError;
use crate::traits::Compositor;
use log::{debug, info};
use std::collections::{BTreeSet, HashSet};

/// Compute the workspace index to focus next.
///
/// `occupied` is `None` when skipping is disabled.  The skip rule only kicks
/// in when both `current` and its immediate neighbour are empty: then the
/// nearest occupied index beyond `current` in `direction` wins, falling back
/// to the lowest (moving down) or highest (moving up) occupied index.  The
/// result is wrapped into `1..=max`.
pub fn next_workspace(
    current: u32,
    direction: Direction,
    max: u32,
    occupied: Option<&BTreeSet<u32>>,
) -> u32 {
    let step = direction.step();
    let neighbour = i64::from(current) + step;

    let target = match occupied {
        Some(occupied) if !occupied.contains(&current) && !contains(occupied, neighbour) => {
            let nearest = match direction {
                Direction::Down => occupied
                    .range(current.saturating_add(1)..)
                    .next()
                    .or_else(|| occupied.first()),
                Direction::Up => occupied.range(..current).next_back().or_else(|| occupied.last()),
            };
            nearest.map_or(neighbour, |&idx| i64::from(idx))
        }
        _ => neighbour,
    };

    if target < 1 {
        max
    } else if target > i64::from(max) {
        1
    } else {
        // 1 <= target <= max, so it fits.
        target as u32
    }
}

fn contains(set: &BTreeSet<u32>, idx: i64) -> bool {
    u32::try_from(idx).is_ok_and(|idx| set.contains(&idx))
}

/// Cycles workspaces through a [`Compositor`].
pub struct WorkspaceNavigator<C: Compositor> {
    compositor: C,
}

impl<C: Compositor> WorkspaceNavigator<C> {
    pub fn new(compositor: C) -> Self {
        Self { compositor }
    }

    /// Focus the next workspace in `direction` on the focused output and
    /// return its index.
    ///
    /// With `skip_empty`, occupancy is taken into account as described in
    /// [`next_workspace`].  An index counts as occupied when a workspace with
    /// that index hosts a window on any output.
    pub fn cycle(&self, direction: Direction, skip_empty: bool) -> Result<u32, NiriError> {
        let output = self
            .compositor
            .focused_output()?
            .ok_or_else(|| NiriError::ContractViolation("no focused output".into()))?;
        let workspaces = self.compositor.workspaces()?;
        let on_output: Vec<_> = workspaces
            .iter()
            .filter(|ws| ws.output.as_deref() == Some(output.name.as_str()))
            .collect();

        let current = on_output
            .iter()
            .find(|ws| ws.is_active)
            .map(|ws| ws.idx)
            .ok_or_else(|| {
                NiriError::ContractViolation(format!(
                    "no active workspace on output {}",
                    output.name
                ))
            })?;
        let max = on_output.iter().map(|ws| ws.idx).max().unwrap_or(current);

        let occupied = if skip_empty {
            let windows = self.compositor.windows()?;
            let hosting: HashSet<u64> = windows.iter().filter_map(|w| w.workspace_id).collect();
            // Indices hosting windows on any output.
            let occupied: BTreeSet<u32> = workspaces
                .iter()
                .filter(|ws| hosting.contains(&ws.id))
                .map(|ws| ws.idx)
                .collect();
            debug!("occupied workspace indices: {:?}", occupied);
            Some(occupied)
        } else {
            None
        };

        let target = next_workspace(current, direction, max, occupied.as_ref());
        info!(
            "{}: workspace {} -> {} (of {})",
            output.name, current, target, max
        );
        self.compositor.perform(Action::FocusWorkspace {
            reference: WorkspaceReference::Index(target),
        })?;
        Ok(target)
    }
}
