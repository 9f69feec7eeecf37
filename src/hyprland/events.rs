//! [`CommandSource`] that watches Hyprland's event socket for display
//! changes.
//!
//! Hyprland broadcasts events on
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket2.sock`, one
//! per line, as `EVENT>>DATA`.  Monitor hot-plug events are turned into
//! [`Command::DisplaysChanged`]; everything else is ignored.

use crate::command::Command;
use crate::hyprland::wm::{socket_path, HyprlandWmError};
use crate::traits::CommandSource;
use log::{debug, info};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;
use std::sync::mpsc;

/// Listens for `monitoradded` / `monitorremoved` events.
#[derive(Debug, Default)]
pub struct MonitorEventSource;

/// Errors produced by the event source.
#[derive(Debug, thiserror::Error)]
pub enum MonitorEventError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Socket(#[from] HyprlandWmError),
}

impl MonitorEventSource {
    pub fn new() -> Self {
        Self
    }
}

/// Whether an event line signals a change in the attached displays.
pub fn is_display_change(line: &str) -> bool {
    let event = line.split_once(">>").map_or(line, |(name, _)| name);
    matches!(
        event,
        "monitoradded" | "monitoraddedv2" | "monitorremoved" | "monitorremovedv2"
    )
}

impl CommandSource for MonitorEventSource {
    type Error = MonitorEventError;

    /// Connect to the event socket and forward display changes.
    ///
    /// Returns when Hyprland closes the socket or the sink is dropped.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        let path = socket_path(".socket2.sock")?;
        let stream = UnixStream::connect(&path)?;
        info!("watching display changes on {}", path.display());

        for line in BufReader::new(stream).lines() {
            let line = line?;
            if !is_display_change(&line) {
                continue;
            }
            debug!("display event: {}", line);
            if sink.send(Command::DisplaysChanged).is_err() {
                info!("sink closed, shutting down");
                return Ok(());
            }
        }
        info!("event socket closed");
        Ok(())
    }
}
