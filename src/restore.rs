//! Layout restore — move live windows back to where a profile saw them.
//!
//! Loads the profile for the current display configuration, pairs saved
//! descriptors with live windows through the [matcher](crate::matcher) and
//! then, per pair:
//!
//! 1. resolves the saved screen (stable id first, connector name second),
//! 2. sends the window to the workspace at the saved ordinal on that screen,
//!    without waiting for the compositor to finish the move,
//! 3. moves and resizes it to the saved frame, offset by the screen origin.
//!
//! Failures on one window are logged and counted; they never abort the
//! rest.

use crate::command::{find_monitor, MonitorInfo, WindowInfo};
use crate::config::Config;
use crate::display::config_id;
use crate::error::LayoutError;
use crate::matcher::{match_windows, MatchOptions, TierCounts};
use crate::spaces::SpaceIndex;
use crate::store::{LayoutSnapshot, ProfileStore, WindowDescriptor, DEFAULT_PROFILE};
use crate::traits::WindowManager;
use log::{debug, info, warn};

/// Aggregate result of a restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub profile: String,
    /// Descriptors paired with a live window.
    pub matched: usize,
    /// Paired windows that were successfully repositioned.
    pub restored: usize,
    /// Descriptors with no live window.
    pub missed: usize,
    pub tiers: TierCounts,
}

/// Restore `profile` (or the active profile) of the current display
/// configuration.
pub fn restore_layout<W: WindowManager>(
    wm: &W,
    store: &ProfileStore,
    config: &Config,
    profile: Option<&str>,
) -> Result<RestoreReport, LayoutError> {
    let monitors = wm
        .monitors()
        .map_err(|e| LayoutError::WindowManager(e.to_string()))?;
    let id = config_id(&monitors);

    let doc = store.load();
    let collection = doc
        .collection(&id)
        .ok_or_else(|| LayoutError::MissingProfile {
            config_id: id.to_string(),
        })?;
    let profile = profile
        .map(str::to_string)
        .unwrap_or_else(|| collection.active.clone());
    let profile = if profile.is_empty() {
        DEFAULT_PROFILE.to_string()
    } else {
        profile
    };
    let snapshot = match collection.layouts.get(&profile) {
        None => return Err(LayoutError::UnknownProfile { profile }),
        Some(None) => return Err(LayoutError::EmptyLayout { profile }),
        Some(Some(s)) if s.windows.is_empty() => {
            return Err(LayoutError::EmptyLayout { profile })
        }
        Some(Some(s)) => s,
    };

    let workspaces = wm
        .workspaces()
        .map_err(|e| LayoutError::WindowManager(e.to_string()))?;
    let spaces = SpaceIndex::build(&monitors, &workspaces);
    let live: Vec<WindowInfo> = wm
        .windows()
        .map_err(|e| LayoutError::WindowManager(e.to_string()))?
        .into_iter()
        .filter(|w| w.standard)
        .collect();

    let options = MatchOptions {
        trust_ids: same_session(snapshot, wm.session_id().as_deref()),
        title_suffixes: config.title_suffixes.clone(),
    };
    let outcome = match_windows(&snapshot.windows, &live, &options);

    let mut report = RestoreReport {
        profile,
        matched: outcome.counts.total(),
        missed: outcome.unmatched.len(),
        tiers: outcome.counts,
        ..RestoreReport::default()
    };
    for a in &outcome.assignments {
        let desc = &snapshot.windows[a.descriptor];
        let window = &live[a.window];
        if apply(wm, desc, window, &monitors, &spaces) {
            report.restored += 1;
        }
    }

    info!(
        "restored {}/{} windows of {:?} for {} ({} missed; id {}, exact {}, fuzzy {}, slot {})",
        report.restored,
        snapshot.windows.len(),
        report.profile,
        id,
        report.missed,
        report.tiers.id,
        report.tiers.exact,
        report.tiers.fuzzy,
        report.tiers.slot
    );
    Ok(report)
}

/// Whether window ids in `snapshot` can be compared with live ones.
///
/// Snapshots without a recorded session, or a backend that cannot name its
/// session, fall back to trusting ids (the matcher still requires the
/// application to agree).
fn same_session(snapshot: &LayoutSnapshot, current: Option<&str>) -> bool {
    match (snapshot.session.as_deref(), current) {
        (Some(saved), Some(now)) => saved == now,
        _ => true,
    }
}

/// Move one matched window into place.  Returns `true` if the final
/// geometry move succeeded.
fn apply<W: WindowManager>(
    wm: &W,
    desc: &WindowDescriptor,
    window: &WindowInfo,
    monitors: &[MonitorInfo],
    spaces: &SpaceIndex,
) -> bool {
    let target = find_monitor(monitors, &desc.screen_uuid, &desc.screen);

    if let Some(screen) = target {
        let workspace = desc
            .space_index
            .and_then(|ordinal| spaces.workspace_at(&screen.uuid, ordinal));
        match workspace {
            Some(ws) if !window.workspaces.contains(&ws) => {
                debug!("window {:#x} -> workspace {}", window.id, ws);
                // Not awaited: the geometry move below may race the relocation.
                if let Err(e) = wm.move_window_to_workspace(window.id, ws) {
                    warn!("failed to move window {:#x} to workspace {}: {}", window.id, ws, e);
                }
            }
            Some(_) => {}
            None => debug!(
                "no workspace {:?} among the {} on {} for window {:#x}",
                desc.space_index,
                spaces.workspaces_on(&screen.uuid).len(),
                screen.name,
                window.id
            ),
        }
    }

    let origin = target.or_else(|| monitors.iter().find(|m| m.name == window.monitor));
    let frame = match origin {
        Some(m) => desc.frame.offset(m.x as f64, m.y as f64),
        None => desc.frame,
    };
    match wm.move_resize_window(window.id, frame) {
        Ok(()) => true,
        Err(e) => {
            warn!("failed to place window {:#x}: {}", window.id, e);
            false
        }
    }
}
