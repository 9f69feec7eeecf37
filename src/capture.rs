//! Layout capture — snapshot the live desktop into a profile.
//!
//! Enumerates the standard windows, records where each one sits (relative
//! to its screen, plus the ordinal of its workspace) and writes the result
//! as a [`LayoutSnapshot`] under the current display configuration.  Live
//! windows are never touched.

use crate::command::{MonitorInfo, WindowInfo};
use crate::display::{config_id, ConfigId};
use crate::error::LayoutError;
use crate::spaces::SpaceIndex;
use crate::store::{
    LayoutSnapshot, ProfileDocument, ProfileStore, WindowDescriptor, DEFAULT_PROFILE,
};
use crate::traits::WindowManager;
use log::{debug, info, warn};

/// Result of a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    pub config_id: ConfigId,
    pub profile: String,
    pub windows: usize,
}

/// Pick the profile to act on: explicit name, else the collection's active
/// profile, else [`DEFAULT_PROFILE`].
pub fn resolve_profile(doc: &ProfileDocument, id: &ConfigId, explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| doc.collection(id).map(|c| c.active))
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// Describe one window for persistence.
///
/// The frame is stored relative to the window's screen.  A window on a
/// monitor the window manager no longer lists keeps its absolute frame.
pub fn describe_window(
    window: &WindowInfo,
    monitors: &[MonitorInfo],
    spaces: &SpaceIndex,
) -> WindowDescriptor {
    let monitor = monitors.iter().find(|m| m.name == window.monitor);
    let frame = match monitor {
        Some(m) => window.frame.offset(-(m.x as f64), -(m.y as f64)),
        None => window.frame,
    };
    WindowDescriptor {
        app: window.app.clone(),
        title: window.title.clone(),
        frame,
        screen: window.monitor.clone(),
        screen_uuid: monitor.map(|m| m.uuid.clone()).unwrap_or_default(),
        space_index: spaces.primary_ordinal(&window.workspaces),
        id: Some(window.id),
        is_standard: window.standard,
    }
}

/// Build a snapshot of the standard windows currently open.
pub fn snapshot_windows<W: WindowManager>(
    wm: &W,
    monitors: &[MonitorInfo],
    timestamp: &str,
) -> Result<LayoutSnapshot, LayoutError> {
    let workspaces = wm
        .workspaces()
        .map_err(|e| LayoutError::WindowManager(e.to_string()))?;
    let spaces = SpaceIndex::build(monitors, &workspaces);
    let windows = wm
        .windows()
        .map_err(|e| LayoutError::WindowManager(e.to_string()))?;

    let descriptors: Vec<WindowDescriptor> = windows
        .iter()
        .filter(|w| w.standard)
        .map(|w| describe_window(w, monitors, &spaces))
        .collect();
    debug!(
        "captured {} of {} windows",
        descriptors.len(),
        windows.len()
    );

    Ok(LayoutSnapshot {
        timestamp: timestamp.to_string(),
        display_count: monitors.len(),
        session: wm.session_id(),
        windows: descriptors,
    })
}

/// Capture the live layout into `profile` (or the active profile) and make
/// it the active profile.
///
/// `timestamp` is stored verbatim; callers pass the current UTC time in
/// RFC 3339 form.
pub fn capture_layout<W: WindowManager>(
    wm: &W,
    store: &ProfileStore,
    profile: Option<&str>,
    timestamp: &str,
) -> Result<CaptureReport, LayoutError> {
    let monitors = wm
        .monitors()
        .map_err(|e| LayoutError::WindowManager(e.to_string()))?;
    let id = config_id(&monitors);
    let snapshot = snapshot_windows(wm, &monitors, timestamp)?;

    let mut doc = store.load();
    let profile = resolve_profile(&doc, &id, profile);
    doc.put_snapshot(&id, &profile, &snapshot)
        .map_err(|e| LayoutError::Persistence(e.to_string()))?;
    store
        .save(&doc)
        .map_err(|e| LayoutError::Persistence(e.to_string()))?;

    info!(
        "saved {} windows as {:?} for {}",
        snapshot.windows.len(),
        profile,
        id
    );
    Ok(CaptureReport {
        config_id: id,
        profile,
        windows: snapshot.windows.len(),
    })
}

/// Mark `profile` as the active profile of the current display
/// configuration.
pub fn select_profile<W: WindowManager>(
    wm: &W,
    store: &ProfileStore,
    profile: &str,
) -> Result<ConfigId, LayoutError> {
    let monitors = wm
        .monitors()
        .map_err(|e| LayoutError::WindowManager(e.to_string()))?;
    let id = config_id(&monitors);
    let mut doc = store.load();
    if doc.raw(&id).is_none() {
        return Err(LayoutError::MissingProfile {
            config_id: id.to_string(),
        });
    }
    if let Err(e) = doc.set_active(&id, profile) {
        warn!("{}; saved profiles: {:?}", e, doc.profile_names(&id));
        return Err(LayoutError::UnknownProfile {
            profile: profile.to_string(),
        });
    }
    store
        .save(&doc)
        .map_err(|e| LayoutError::Persistence(e.to_string()))?;
    info!("active profile for {} is now {:?}", id, profile);
    Ok(id)
}
