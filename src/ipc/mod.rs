//! IPC listener that accepts commands over a Unix socket.
//!
//! External tools (scripts, key-bind helpers, etc.) can connect to the
//! socket and send newline-delimited JSON commands.

pub mod listener;

use crate::command::Command;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// Default socket path for the command listener.
pub fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(format!("{}/hyprlayouts.sock", runtime))
}

/// Send one command to a running daemon.
pub fn send(path: &Path, cmd: &Command) -> Result<(), listener::UnixSocketError> {
    let mut stream = UnixStream::connect(path)?;
    let line = serde_json::to_string(cmd).map_err(std::io::Error::from)?;
    writeln!(stream, "{}", line)?;
    Ok(())
}
