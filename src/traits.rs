//! Core traits that decouple hyprlayouts from any specific window manager or
//! transport mechanism.
//!
//! Every concrete backend (Hyprland, a Unix-socket listener, a test harness,
//! …) implements one of these traits.  Capture, matching and restore only
//! depend on these abstractions.

use crate::command::{Command, Frame, MonitorInfo, WindowInfo, WorkspaceInfo};
use std::sync::mpsc;

/// Abstraction over a window manager that can enumerate the desktop and
/// move windows around.
///
/// An implementation might talk to Hyprland via IPC, or it might be a
/// deterministic fake used in tests.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Return the list of monitors the window manager knows about.
    fn monitors(&self) -> Result<Vec<MonitorInfo>, Self::Error>;

    /// Return every workspace, grouped by monitor in ordinal order.
    ///
    /// The position of a workspace among its monitor's workspaces is what
    /// gets persisted, so the order must be stable for a given desktop.
    fn workspaces(&self) -> Result<Vec<WorkspaceInfo>, Self::Error>;

    /// Return every open window, including non-standard ones.
    fn windows(&self) -> Result<Vec<WindowInfo>, Self::Error>;

    /// Identifier of the running compositor session, if the backend can
    /// tell.  Window ids are only comparable within one session.
    fn session_id(&self) -> Option<String>;

    /// Send window `window` to `workspace_id` without following it.
    ///
    /// The move may complete asynchronously; callers do not wait for it.
    fn move_window_to_workspace(&self, window: u64, workspace_id: i64)
        -> Result<(), Self::Error>;

    /// Move and resize window `window` to the absolute `frame`.
    fn move_resize_window(&self, window: u64, frame: Frame) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport — a Unix socket, Hyprland's
/// event stream, an in-memory channel, … — and forward parsed commands
/// into the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
