//! [`WindowManager`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.

use crate::command::{Frame, MonitorInfo, WindowInfo, WorkspaceInfo};
use crate::traits::WindowManager;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Hyprland-backed window manager.
///
/// All communication happens over Hyprland's IPC socket
/// (`$XDG_RUNTIME_DIR/hypr/<instance>/.socket.sock`).  No child processes
/// are spawned.
pub struct HyprlandWm;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandWmError(String);

impl Default for HyprlandWm {
    fn default() -> Self {
        Self
    }
}

impl HyprlandWm {
    /// Create a new handle.
    ///
    /// No connection is opened eagerly; each method call opens a short-lived
    /// IPC request.
    pub fn new() -> Self {
        Self
    }
}

//  Direct Hyprland IPC helpers

/// Resolve one of Hyprland's sockets by file name (`.socket.sock` for
/// requests, `.socket2.sock` for events).
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/`.
pub(crate) fn socket_path(file: &str) -> Result<PathBuf, HyprlandWmError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandWmError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandWmError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/{}",
        runtime_dir, his, file
    )))
}

/// Send a raw command to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(command: &str) -> Result<String, HyprlandWmError> {
    let path = socket_path(".socket.sock")?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandWmError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandWmError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandWmError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandWmError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and return the raw JSON string.
fn ipc_json(data_command: &str) -> Result<String, HyprlandWmError> {
    ipc_request(&format!("j/{}", data_command))
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandWmError> {
    let response = ipc_request(&format!("/dispatch {}", args))?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandWmError(format!("dispatch error: {}", response)))
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Deserialize)]
struct MonitorJson {
    id: i64,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    make: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    serial: String,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
}

/// Subset of the JSON object returned by `j/workspaces`.
#[derive(Deserialize)]
struct WorkspaceJson {
    id: i64,
    monitor: String,
}

#[derive(Deserialize)]
struct WorkspaceRef {
    id: i64,
}

/// Subset of the JSON object returned by `j/clients`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientJson {
    address: String,
    #[serde(default = "default_true")]
    mapped: bool,
    #[serde(default)]
    hidden: bool,
    at: [f64; 2],
    size: [f64; 2],
    workspace: WorkspaceRef,
    monitor: i64,
    #[serde(default)]
    class: String,
    #[serde(default)]
    initial_class: String,
    #[serde(default)]
    title: String,
}

fn default_true() -> bool {
    true
}

/// Identifier of the physical panel behind a monitor.
///
/// Prefers make/model/serial (Hyprland's `description` when present), so
/// the id follows the panel across connectors.  Falls back to the connector
/// name for panels that report nothing.
fn monitor_uuid(m: &MonitorJson) -> String {
    if !m.description.trim().is_empty() {
        return m.description.trim().to_string();
    }
    let parts: Vec<&str> = [m.make.as_str(), m.model.as_str(), m.serial.as_str()]
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        m.name.clone()
    } else {
        parts.join(" ")
    }
}

/// Parse a Hyprland window address (`"0x55d1c2a3b4c0"`).
fn parse_address(address: &str) -> Result<u64, HyprlandWmError> {
    let hex = address.trim().trim_start_matches("0x");
    u64::from_str_radix(hex, 16)
        .map_err(|e| HyprlandWmError(format!("bad window address {:?}: {}", address, e)))
}

fn parse_monitors(json: &str) -> Result<Vec<MonitorInfo>, HyprlandWmError> {
    let monitors: Vec<MonitorJson> =
        serde_json::from_str(json).map_err(|e| HyprlandWmError(format!("parse: {}", e)))?;
    Ok(monitors
        .iter()
        .map(|m| MonitorInfo {
            name: m.name.clone(),
            uuid: monitor_uuid(m),
            width: m.width,
            height: m.height,
            x: m.x,
            y: m.y,
        })
        .collect())
}

/// Workspaces sorted by id, which is the ordinal order on each monitor.
fn parse_workspaces(json: &str) -> Result<Vec<WorkspaceInfo>, HyprlandWmError> {
    let mut workspaces: Vec<WorkspaceJson> =
        serde_json::from_str(json).map_err(|e| HyprlandWmError(format!("parse: {}", e)))?;
    // Special (scratchpad) workspaces have negative ids.
    workspaces.retain(|w| w.id > 0);
    workspaces.sort_by_key(|w| w.id);
    Ok(workspaces
        .into_iter()
        .map(|w| WorkspaceInfo {
            id: w.id,
            monitor: w.monitor,
        })
        .collect())
}

/// Parse `j/clients`, resolving monitor ids against `j/monitors`.
fn parse_clients(clients_json: &str, monitors_json: &str) -> Result<Vec<WindowInfo>, HyprlandWmError> {
    let clients: Vec<ClientJson> = serde_json::from_str(clients_json)
        .map_err(|e| HyprlandWmError(format!("parse: {}", e)))?;
    let monitors: Vec<MonitorJson> = serde_json::from_str(monitors_json)
        .map_err(|e| HyprlandWmError(format!("parse: {}", e)))?;

    clients
        .into_iter()
        .map(|c| {
            let monitor = monitors
                .iter()
                .find(|m| m.id == c.monitor)
                .map(|m| m.name.clone())
                .unwrap_or_default();
            let app = if c.class.is_empty() {
                c.initial_class
            } else {
                c.class
            };
            Ok(WindowInfo {
                id: parse_address(&c.address)?,
                app,
                title: c.title,
                frame: Frame::new(c.at[0], c.at[1], c.size[0], c.size[1]),
                monitor,
                workspaces: vec![c.workspace.id],
                standard: c.mapped && !c.hidden && c.workspace.id > 0,
            })
        })
        .collect()
}

//  WindowManager implementation

impl WindowManager for HyprlandWm {
    type Error = HyprlandWmError;

    fn monitors(&self) -> Result<Vec<MonitorInfo>, Self::Error> {
        parse_monitors(&ipc_json("monitors")?)
    }

    fn workspaces(&self) -> Result<Vec<WorkspaceInfo>, Self::Error> {
        parse_workspaces(&ipc_json("workspaces")?)
    }

    fn windows(&self) -> Result<Vec<WindowInfo>, Self::Error> {
        let monitors = ipc_json("monitors")?;
        let clients = ipc_json("clients")?;
        parse_clients(&clients, &monitors)
    }

    fn session_id(&self) -> Option<String> {
        std::env::var("HYPRLAND_INSTANCE_SIGNATURE").ok()
    }

    fn move_window_to_workspace(&self, window: u64, workspace_id: i64) -> Result<(), Self::Error> {
        ipc_dispatch(&format!(
            "movetoworkspacesilent {},address:{:#x}",
            workspace_id, window
        ))
    }

    fn move_resize_window(&self, window: u64, frame: Frame) -> Result<(), Self::Error> {
        // Hyprland only honours exact geometry for floating windows; tiled
        // ones keep their slot.
        ipc_dispatch(&format!(
            "movewindowpixel exact {} {},address:{:#x}",
            frame.x.round() as i64,
            frame.y.round() as i64,
            window
        ))?;
        ipc_dispatch(&format!(
            "resizewindowpixel exact {} {},address:{:#x}",
            frame.w.round() as i64,
            frame.h.round() as i64,
            window
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITORS: &str = r#"[
        {"id": 0, "name": "DP-1", "description": "Dell Inc. DELL U2720Q 8XYZ",
         "make": "Dell Inc.", "model": "DELL U2720Q", "serial": "8XYZ",
         "width": 3840, "height": 2160, "x": 0, "y": 0, "scale": 1.5},
        {"id": 1, "name": "HDMI-A-1", "make": "LG", "model": "27GL850", "serial": "",
         "width": 2560, "height": 1440, "x": 2560, "y": 0},
        {"id": 2, "name": "eDP-1", "width": 1920, "height": 1200, "x": 0, "y": 1440}
    ]"#;

    #[test]
    fn monitor_ids_prefer_panel_identity() {
        let monitors = parse_monitors(MONITORS).unwrap();
        assert_eq!(monitors[0].uuid, "Dell Inc. DELL U2720Q 8XYZ");
        assert_eq!(monitors[1].uuid, "LG 27GL850");
        assert_eq!(monitors[2].uuid, "eDP-1");
        assert_eq!(monitors[1].x, 2560);
    }

    #[test]
    fn workspaces_sorted_without_special() {
        let json = r#"[
            {"id": 3, "name": "3", "monitor": "HDMI-A-1", "windows": 1},
            {"id": -98, "name": "special:scratch", "monitor": "DP-1"},
            {"id": 1, "name": "1", "monitor": "DP-1"}
        ]"#;
        let ws = parse_workspaces(json).unwrap();
        assert_eq!(
            ws,
            vec![
                WorkspaceInfo { id: 1, monitor: "DP-1".into() },
                WorkspaceInfo { id: 3, monitor: "HDMI-A-1".into() },
            ]
        );
    }

    #[test]
    fn clients_become_windows() {
        let clients = r#"[
            {"address": "0x55d1c2a3b4c0", "mapped": true, "hidden": false,
             "at": [2600, 40], "size": [1200, 800], "workspace": {"id": 3, "name": "3"},
             "floating": true, "monitor": 1, "class": "firefox", "initialClass": "firefox",
             "title": "Inbox - Mozilla Firefox", "pid": 4242},
            {"address": "0x1f", "mapped": true, "hidden": false,
             "at": [0, 0], "size": [600, 400], "workspace": {"id": -98, "name": "special:scratch"},
             "monitor": 0, "class": "", "initialClass": "kitty", "title": "scratch"}
        ]"#;
        let windows = parse_clients(clients, MONITORS).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].id, 0x55d1c2a3b4c0);
        assert_eq!(windows[0].monitor, "HDMI-A-1");
        assert_eq!(windows[0].frame, Frame::new(2600.0, 40.0, 1200.0, 800.0));
        assert_eq!(windows[0].workspaces, vec![3]);
        assert!(windows[0].standard);
        assert_eq!(windows[1].app, "kitty");
        assert!(!windows[1].standard);
    }

    #[test]
    fn bad_address_is_an_error() {
        assert!(parse_address("0xzz").is_err());
        assert_eq!(parse_address("0x10").unwrap(), 16);
    }
}
