//! Fit every column of the active workspace onto the focused output.
//!
//! The output width, minus a gap before, between and after the columns, is
//! split evenly across columns.  Resizes in niri are asynchronous, so after
//! issuing them the fitter waits on the event stream until every resized
//! window has reported a new layout, then focuses each window once so that
//! all of them are redrawn at their new size.

use crate::command::{Action, SizeChange};
use crate::error::NiriError;
use crate::niri::types::{Event, Window};
use crate::traits::Compositor;
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashSet};
use std::time::{Duration, Instant};

/// Split `usable` pixels into `columns` widths.
///
/// The widths sum to `usable` and differ by at most one pixel; the first
/// `usable % columns` columns get the extra pixel.  Zero columns yield an
/// empty list.
pub fn distribute(usable: u32, columns: usize) -> Vec<u32> {
    let Ok(n) = u32::try_from(columns) else {
        return Vec::new();
    };
    if n == 0 {
        return Vec::new();
    }
    let base = usable / n;
    let remainder = usable % n;
    (0..n).map(|i| base + u32::from(i < remainder)).collect()
}

/// What a [`LayoutFitter::fit_all`] run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitReport {
    /// Target width per column, left to right.
    pub widths: Vec<u32>,
    /// Windows a resize was sent for.
    pub resized: Vec<u64>,
    /// Whether niri confirmed every resize before the deadline.
    pub confirmed: bool,
}

/// Resizes the columns of the active workspace through a [`Compositor`].
pub struct LayoutFitter<C: Compositor> {
    compositor: C,
    confirm_timeout: Duration,
}

impl<C: Compositor> LayoutFitter<C> {
    /// `confirm_timeout` bounds the wait for resize confirmations.
    pub fn new(compositor: C, confirm_timeout: Duration) -> Self {
        Self {
            compositor,
            confirm_timeout,
        }
    }

    /// Give every column of the active workspace an equal share of the
    /// focused output, leaving `gaps` pixels around each column.
    ///
    /// Resizes already applied stay in effect if a later step fails.
    pub fn fit_all(&self, gaps: u32) -> Result<FitReport, NiriError> {
        let output = self
            .compositor
            .focused_output()?
            .ok_or_else(|| NiriError::ContractViolation("no focused output".into()))?;
        let output_width = output
            .logical
            .as_ref()
            .map(|l| l.width)
            .ok_or_else(|| {
                NiriError::ContractViolation(format!("output {} has no logical size", output.name))
            })?;
        let workspace_id = self
            .compositor
            .workspaces()?
            .into_iter()
            .find(|ws| ws.is_active && ws.output.as_deref() == Some(output.name.as_str()))
            .map(|ws| ws.id)
            .ok_or_else(|| {
                NiriError::ContractViolation(format!(
                    "no active workspace on output {}",
                    output.name
                ))
            })?;
        let windows = self.compositor.windows()?;
        let focused = self.compositor.focused_window()?.map(|w| w.id);

        let mut tiled: Vec<(usize, usize, Window)> = windows
            .into_iter()
            .filter(|w| w.workspace_id == Some(workspace_id))
            .filter_map(|w| w.position().map(|(col, row)| (col, row, w)))
            .collect();
        tiled.sort_by_key(|(col, row, _)| (*col, *row));

        if tiled.is_empty() {
            info!("no tiled windows on workspace {}", workspace_id);
            return Ok(FitReport {
                widths: Vec::new(),
                resized: Vec::new(),
                confirmed: true,
            });
        }

        let columns: Vec<usize> = tiled
            .iter()
            .map(|(col, _, _)| *col)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let usable = usable_width(output_width, gaps, columns.len())?;
        let widths = distribute(usable, columns.len());
        debug!(
            "{} column(s) on {}px ({}px usable): {:?}",
            columns.len(),
            output_width,
            usable,
            widths
        );

        let mut resized = Vec::new();
        for (col, _, window) in &tiled {
            let Some(slot) = columns.iter().position(|c| c == col) else {
                continue;
            };
            let target = widths[slot];
            if i64::from(window.width()) == i64::from(target) {
                continue;
            }
            let px = i32::try_from(target).map_err(|_| {
                NiriError::InvalidArgument(format!("column width {} out of range", target))
            })?;
            debug!("window {}: {} -> {}px", window.id, window.width(), px);
            self.compositor.perform(Action::SetWindowWidth {
                id: window.id,
                change: SizeChange::SetFixed(px),
            })?;
            resized.push(window.id);
        }

        let confirmed = if resized.is_empty() {
            true
        } else {
            let deadline = Instant::now() + self.confirm_timeout;
            let events = self.compositor.events(Some(deadline))?;
            await_layout_changes(events, resized.iter().copied().collect())?
        };

        // Focusing each window makes niri redraw it at its new size.
        for (_, _, window) in &tiled {
            self.compositor
                .perform(Action::FocusWindow { id: window.id })?;
        }
        if let Some(id) = focused {
            self.compositor.perform(Action::FocusWindow { id })?;
        }

        info!(
            "fitted {} column(s), resized {} window(s)",
            widths.len(),
            resized.len()
        );
        Ok(FitReport {
            widths,
            resized,
            confirmed,
        })
    }
}

/// Width left for columns after `gaps` on both sides of each column.
fn usable_width(output_width: u32, gaps: u32, columns: usize) -> Result<u32, NiriError> {
    let gap_total = u64::from(gaps) * (columns as u64 + 1);
    u64::from(output_width)
        .checked_sub(gap_total)
        .and_then(|w| u32::try_from(w).ok())
        .ok_or_else(|| {
            NiriError::InvalidArgument(format!(
                "{} gaps of {}px do not fit on a {}px output",
                columns + 1,
                gaps,
                output_width
            ))
        })
}

/// Consume `events` until every id in `pending` has shown up in a
/// layout-change event.
///
/// Returns `Ok(false)` if the stream ends or the deadline passes first; the
/// resizes were accepted by niri either way, so this is only worth a warning.
fn await_layout_changes<I>(events: I, mut pending: HashSet<u64>) -> Result<bool, NiriError>
where
    I: Iterator<Item = Result<Event, NiriError>>,
{
    for event in events {
        match event {
            Ok(Event::Other { name }) => debug!("ignoring {} event", name),
            Ok(event) => {
                for id in event.changed_windows() {
                    pending.remove(&id);
                }
                debug!("{} resize(s) still unconfirmed", pending.len());
                if pending.is_empty() {
                    return Ok(true);
                }
            }
            Err(NiriError::Timeout) => {
                warn!(
                    "gave up waiting for {} resize(s) to be confirmed",
                    pending.len()
                );
                return Ok(false);
            }
            Err(e) => return Err(e),
        }
    }
    warn!(
        "event stream closed with {} resize(s) unconfirmed",
        pending.len()
    );
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::testing::{layouts_changed, output, tiled, workspace, Call, RecorderNiri};

    #[test]
    fn distribute_sums_and_spreads_remainder() {
        for usable in [0u32, 1, 7, 1883, 1890, 2559] {
            for n in 1..=7usize {
                let widths = distribute(usable, n);
                assert_eq!(widths.len(), n);
                assert_eq!(widths.iter().sum::<u32>(), usable);
                let extra = (usable % n as u32) as usize;
                let base = usable / n as u32;
                for (i, w) in widths.iter().enumerate() {
                    assert_eq!(*w, if i < extra { base + 1 } else { base });
                }
            }
        }
    }

    #[test]
    fn distribute_examples() {
        assert_eq!(distribute(1890, 2), vec![945, 945]);
        assert_eq!(distribute(1883, 3), vec![628, 628, 627]);
        assert!(distribute(100, 0).is_empty());
    }

    #[test]
    fn usable_width_counts_outer_gaps() {
        assert_eq!(usable_width(1920, 10, 2).unwrap(), 1890);
        assert!(matches!(
            usable_width(100, 40, 2),
            Err(NiriError::InvalidArgument(_))
        ));
    }

    /// Workspace 1 on DP-1 is active; windows 1 and 2 share column 1,
    /// window 3 is column 2, window 9 lives on another workspace.
    fn scene(widths: [i32; 3]) -> RecorderNiri {
        RecorderNiri {
            output: Some(output("DP-1", 1920)),
            workspaces: vec![workspace(1, 1, "DP-1", true), workspace(2, 2, "DP-1", false)],
            windows: vec![
                tiled(3, 1, 2, 1, widths[2]),
                tiled(2, 1, 1, 2, widths[1]),
                tiled(1, 1, 1, 1, widths[0]),
                tiled(9, 2, 1, 1, 500),
            ],
            focused: Some(2),
            ..Default::default()
        }
    }

    fn focus(id: u64) -> Action {
        Action::FocusWindow { id }
    }

    fn resize(id: u64, px: i32) -> Action {
        Action::SetWindowWidth {
            id,
            change: SizeChange::SetFixed(px),
        }
    }

    #[test]
    fn resizes_waits_then_refocuses_in_layout_order() {
        let niri = scene([900, 945, 1000]);
        niri.events.borrow_mut().extend([
            Ok(Event::Other {
                name: "WindowFocusChanged".into(),
            }),
            Ok(layouts_changed(&[1])),
            Ok(layouts_changed(&[42, 3])),
            Ok(layouts_changed(&[1])),
        ]);
        let fitter = LayoutFitter::new(niri, Duration::from_secs(1));
        let report = fitter.fit_all(10).unwrap();

        assert_eq!(report.widths, vec![945, 945]);
        assert_eq!(report.resized, vec![1, 3]);
        assert!(report.confirmed);
        assert_eq!(
            *fitter.compositor.calls.borrow(),
            vec![
                Call::Perform(resize(1, 945)),
                Call::Perform(resize(3, 945)),
                Call::Subscribe,
                Call::Perform(focus(1)),
                Call::Perform(focus(2)),
                Call::Perform(focus(3)),
                Call::Perform(focus(2)),
            ]
        );
    }

    #[test]
    fn barrier_stops_reading_once_everything_is_confirmed() {
        let mut events = vec![
            Ok(layouts_changed(&[2])),
            Ok(layouts_changed(&[1, 2])),
            Ok(layouts_changed(&[7])),
        ]
        .into_iter();
        assert!(await_layout_changes(events.by_ref(), HashSet::from([1, 2])).unwrap());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn nothing_to_resize_skips_the_wait_but_still_refocuses() {
        let fitter = LayoutFitter::new(scene([945, 945, 945]), Duration::from_secs(1));
        let report = fitter.fit_all(10).unwrap();

        assert!(report.resized.is_empty());
        assert!(report.confirmed);
        assert!(!fitter.compositor.subscribed());
        assert_eq!(
            fitter.compositor.performed(),
            vec![focus(1), focus(2), focus(3), focus(2)]
        );
    }

    #[test]
    fn timeout_is_tolerated() {
        let niri = scene([100, 945, 945]);
        niri.events
            .borrow_mut()
            .extend([Ok(layouts_changed(&[3])), Err(NiriError::Timeout)]);
        let fitter = LayoutFitter::new(niri, Duration::from_millis(10));
        let report = fitter.fit_all(10).unwrap();

        assert_eq!(report.resized, vec![1]);
        assert!(!report.confirmed);
        assert_eq!(
            fitter.compositor.performed(),
            vec![resize(1, 945), focus(1), focus(2), focus(3), focus(2)]
        );
    }

    #[test]
    fn closed_stream_is_tolerated() {
        let fitter = LayoutFitter::new(scene([100, 945, 945]), Duration::from_secs(1));
        let report = fitter.fit_all(10).unwrap();
        assert!(!report.confirmed);
        assert!(fitter.compositor.subscribed());
    }

    #[test]
    fn stream_errors_propagate() {
        let niri = scene([100, 945, 945]);
        niri.events
            .borrow_mut()
            .push(Err(NiriError::Protocol("bad event".into())));
        let fitter = LayoutFitter::new(niri, Duration::from_secs(1));
        assert!(matches!(fitter.fit_all(10), Err(NiriError::Protocol(_))));
        // Already applied resizes are not rolled back.
        assert_eq!(fitter.compositor.performed(), vec![resize(1, 945)]);
    }

    #[test]
    fn three_columns_share_the_remainder() {
        // 1923 - 4 * 10 = 1883 -> [628, 628, 627]
        let niri = RecorderNiri {
            output: Some(output("DP-1", 1923)),
            workspaces: vec![workspace(1, 1, "DP-1", true)],
            windows: vec![tiled(1, 1, 1, 1, 628), tiled(2, 1, 2, 1, 628), tiled(3, 1, 3, 1, 600)],
            ..Default::default()
        };
        niri.events.borrow_mut().push(Ok(layouts_changed(&[3])));
        let fitter = LayoutFitter::new(niri, Duration::from_secs(1));
        let report = fitter.fit_all(10).unwrap();

        assert_eq!(report.widths, vec![628, 628, 627]);
        assert_eq!(report.resized, vec![3]);
        // No window was focused, so nothing is restored at the end.
        assert_eq!(
            fitter.compositor.performed(),
            vec![resize(3, 627), focus(1), focus(2), focus(3)]
        );
    }

    #[test]
    fn floating_windows_are_left_alone() {
        let mut floating = tiled(5, 1, 1, 1, 300);
        floating.layout.pos_in_scrolling_layout = None;
        let niri = RecorderNiri {
            output: Some(output("DP-1", 1920)),
            workspaces: vec![workspace(1, 1, "DP-1", true)],
            windows: vec![floating],
            ..Default::default()
        };
        let fitter = LayoutFitter::new(niri, Duration::from_secs(1));
        let report = fitter.fit_all(10).unwrap();
        assert!(report.widths.is_empty());
        assert!(fitter.compositor.performed().is_empty());
    }

    #[test]
    fn oversized_gaps_are_rejected_before_any_resize() {
        let fitter = LayoutFitter::new(scene([1, 1, 1]), Duration::from_secs(1));
        assert!(matches!(
            fitter.fit_all(1000),
            Err(NiriError::InvalidArgument(_))
        ));
        assert!(fitter.compositor.performed().is_empty());
    }
}
