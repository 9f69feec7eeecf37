//! Commands and types used throughout hyprlayouts.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every action the layout manager can perform, and
//! [`MonitorInfo`] / [`WorkspaceInfo`] / [`WindowInfo`] / [`Frame`] describe
//! what the window manager reports about the live desktop.

use serde::{Deserialize, Serialize};

/// Every action the layout manager can perform.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations (or the CLI) and consumed by the
/// [`LayoutManager`](crate::manager::LayoutManager).
///
/// On the wire:
///
/// ```json
/// {"Capture":{"profile":null}}
/// {"Restore":{"profile":"work"}}
/// {"SelectProfile":"work"}
/// "DisplaysChanged"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Snapshot all standard windows into `profile` (or the active profile)
    /// of the current display configuration.
    Capture {
        #[serde(default)]
        profile: Option<String>,
    },

    /// Reconcile `profile` (or the active profile) against the live windows
    /// and move them back into place.
    Restore {
        #[serde(default)]
        profile: Option<String>,
    },

    /// Mark a profile of the current display configuration as active
    /// without capturing.
    SelectProfile(String),

    /// The set of attached displays changed.  Restores the active profile
    /// of the new configuration when auto-restore is enabled.
    DisplaysChanged,
}

/// A window rectangle in compositor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The same rectangle shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// Static information about a monitor known to the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    /// Connector name the window manager uses for this monitor (e.g. `"DP-1"`).
    /// Not stable: the same panel can show up on another connector.
    pub name: String,
    /// Stable identifier of the physical panel (make, model, serial).
    pub uuid: String,
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// X position on the virtual desktop (pixels).
    pub x: i32,
    /// Y position on the virtual desktop (pixels).
    pub y: i32,
}

/// A workspace (virtual desktop) and the monitor it lives on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    pub id: i64,
    /// Name of the monitor showing this workspace.
    pub monitor: String,
}

/// Information about one open window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    /// Session-scoped window id.  Meaningless after a compositor restart.
    pub id: u64,
    /// Owning application (window class).
    pub app: String,
    /// Human-readable title.
    pub title: String,
    /// Absolute geometry.
    pub frame: Frame,
    /// Name of the monitor the window is on (e.g. `"DP-1"`).
    pub monitor: String,
    /// Workspaces the window belongs to; the first one is primary.
    pub workspaces: Vec<i64>,
    /// `false` for utility surfaces (hidden, unmapped, scratchpad).
    pub standard: bool,
}

/// Find a monitor by stable id first, by connector name as a fallback.
pub fn find_monitor<'a>(
    monitors: &'a [MonitorInfo],
    uuid: &str,
    name: &str,
) -> Option<&'a MonitorInfo> {
    monitors
        .iter()
        .find(|m| !uuid.is_empty() && m.uuid == uuid)
        .or_else(|| monitors.iter().find(|m| m.name == name))
}
