//! Deterministic in-memory [`WindowManager`] for tests.

use crate::command::{Frame, MonitorInfo, WindowInfo, WorkspaceInfo};
use crate::traits::WindowManager;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

/// A test double that serves a fixed desktop and records every call made to
/// it.  Placements are also applied to the served window list so a capture
/// after a restore sees the new geometry.
#[derive(Debug, Default)]
pub struct FakeWm {
    pub monitors: Vec<MonitorInfo>,
    pub workspaces: Vec<WorkspaceInfo>,
    pub windows: RefCell<Vec<WindowInfo>>,
    pub session: Option<String>,
    /// Window ids whose move/resize should fail.
    pub broken: Vec<u64>,
    relocation_log: RefCell<Vec<(u64, i64)>>,
    placement_log: RefCell<Vec<(u64, Frame)>>,
}

#[derive(Debug, thiserror::Error)]
#[error("fake wm error: {0}")]
pub struct FakeWmError(pub String);

pub fn monitor(name: &str, uuid: &str, x: i32, y: i32) -> MonitorInfo {
    MonitorInfo {
        name: name.into(),
        uuid: uuid.into(),
        width: 1920,
        height: 1080,
        x,
        y,
    }
}

pub fn workspace(id: i64, monitor: &str) -> WorkspaceInfo {
    WorkspaceInfo {
        id,
        monitor: monitor.into(),
    }
}

pub fn window(id: u64, app: &str, title: &str) -> WindowInfo {
    WindowInfo {
        id,
        app: app.into(),
        title: title.into(),
        frame: Frame::new(100.0, 100.0, 800.0, 600.0),
        monitor: "DP-1".into(),
        workspaces: vec![1],
        standard: true,
    }
}

impl FakeWm {
    /// One 1920×1080 monitor `DP-1` (uuid `panel-1`) with workspaces 1 and 2.
    pub fn single_monitor() -> Self {
        Self {
            monitors: vec![monitor("DP-1", "panel-1", 0, 0)],
            workspaces: vec![workspace(1, "DP-1"), workspace(2, "DP-1")],
            session: Some("session-1".into()),
            ..Default::default()
        }
    }

    pub fn with_windows(mut self, windows: Vec<WindowInfo>) -> Self {
        self.windows = RefCell::new(windows);
        self
    }

    pub fn relocations(&self) -> Vec<(u64, i64)> {
        self.relocation_log.borrow().clone()
    }

    pub fn placements(&self) -> Vec<(u64, Frame)> {
        self.placement_log.borrow().clone()
    }
}

impl WindowManager for FakeWm {
    type Error = FakeWmError;

    fn monitors(&self) -> Result<Vec<MonitorInfo>, FakeWmError> {
        Ok(self.monitors.clone())
    }

    fn workspaces(&self) -> Result<Vec<WorkspaceInfo>, FakeWmError> {
        Ok(self.workspaces.clone())
    }

    fn windows(&self) -> Result<Vec<WindowInfo>, FakeWmError> {
        Ok(self.windows.borrow().clone())
    }

    fn session_id(&self) -> Option<String> {
        self.session.clone()
    }

    fn move_window_to_workspace(&self, window: u64, workspace_id: i64) -> Result<(), FakeWmError> {
        if self.broken.contains(&window) {
            return Err(FakeWmError(format!("cannot relocate {}", window)));
        }
        self.relocation_log.borrow_mut().push((window, workspace_id));
        Ok(())
    }

    fn move_resize_window(&self, window: u64, frame: Frame) -> Result<(), FakeWmError> {
        if self.broken.contains(&window) {
            return Err(FakeWmError(format!("cannot move {}", window)));
        }
        self.placement_log.borrow_mut().push((window, frame));
        if let Some(w) = self.windows.borrow_mut().iter_mut().find(|w| w.id == window) {
            w.frame = frame;
        }
        Ok(())
    }
}

/// Monotonic counter to generate unique temp paths per test.
static TEST_ID: AtomicU32 = AtomicU32::new(0);

/// A unique, not-yet-existing file path under the system temp dir.
pub fn tmp_path(stem: &str) -> PathBuf {
    let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "hyprlayouts-test-{}-{}-{}.json",
        stem,
        std::process::id(),
        id
    ))
}
