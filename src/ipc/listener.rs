//! Unix-socket [`CommandSource`] implementation.
//!
//! Clients connect, write one JSON [`Command`] per line and disconnect.
//! Connections are served one after another; a command is handled by the
//! daemon in arrival order.
//!
//! ```json
//! {"Capture":{"profile":"work"}}
//! {"Restore":{"profile":null}}
//! {"SelectProfile":"work"}
//! "DisplaysChanged"
//! ```

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, info, warn};
use std::io::BufRead;
use std::io::BufReader;
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Accepts commands on a Unix stream socket.
pub struct UnixSocketListener {
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether the daemon side of the channel is still there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Open,
    Closed,
}

impl UnixSocketListener {
    /// The socket file is created by [`run`](CommandSource::run), not here.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Forward every well-formed command line of one client into `sink`.
///
/// Blank lines are skipped and malformed ones are logged and dropped; a
/// read error ends the connection but not the listener.
fn forward_commands<R: BufRead>(reader: R, sink: &mpsc::Sender<Command>) -> Sink {
    for line in reader.lines() {
        let text = match line {
            Ok(text) => text,
            Err(e) => {
                warn!("dropping client after read error: {}", e);
                break;
            }
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match serde_json::from_str::<Command>(text) {
            Ok(cmd) => {
                debug!("socket command {:?}", cmd);
                if sink.send(cmd).is_err() {
                    return Sink::Closed;
                }
            }
            Err(e) => warn!("ignoring malformed command {:?}: {}", text, e),
        }
    }
    Sink::Open
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket (replacing a stale one) and serve clients until the
    /// sink is dropped.  Blocks; run it on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        if self.path.exists() {
            debug!("removing stale socket {}", self.path.display());
            std::fs::remove_file(&self.path)?;
        }
        let listener = UnixListener::bind(&self.path)?;
        info!("accepting commands on {}", self.path.display());

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    warn!("accept failed: {}", e);
                    continue;
                }
            };
            if forward_commands(BufReader::new(stream), &sink) == Sink::Closed {
                info!("command channel closed, stopping socket listener");
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::tmp_path;
    use std::io::{Cursor, Write};
    use std::os::unix::net::UnixStream;
    use std::time::Duration;

    fn forwarded(input: &str) -> (Sink, Vec<Command>) {
        let (tx, rx) = mpsc::channel();
        let state = forward_commands(Cursor::new(input.to_string()), &tx);
        (state, rx.try_iter().collect())
    }

    #[test]
    fn every_command_shape_is_forwarded() {
        let (state, cmds) = forwarded(concat!(
            r#"{"Capture":{"profile":"work"}}"#,
            "\n\n",
            r#"  {"Restore":{"profile":null}}  "#,
            "\n",
            r#""DisplaysChanged""#,
            "\n"
        ));
        assert_eq!(state, Sink::Open);
        assert_eq!(
            cmds,
            vec![
                Command::Capture {
                    profile: Some("work".into())
                },
                Command::Restore { profile: None },
                Command::DisplaysChanged,
            ]
        );
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let (_, cmds) = forwarded("not json at all\n{\"Nope\":1}\n{\"SelectProfile\":\"home\"}");
        assert_eq!(cmds, vec![Command::SelectProfile("home".into())]);
    }

    #[test]
    fn closed_sink_is_reported() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let state = forward_commands(Cursor::new("\"DisplaysChanged\"\n"), &tx);
        assert_eq!(state, Sink::Closed);
    }

    #[test]
    fn path_is_kept_until_run() {
        let path = tmp_path("unbound").with_extension("sock");
        let listener = UnixSocketListener::new(&path);
        assert_eq!(listener.path(), path.as_path());
        assert!(!path.exists());
    }

    #[test]
    fn serves_consecutive_clients() {
        let path = tmp_path("listener").with_extension("sock");
        std::fs::write(&path, "stale").unwrap();
        let (tx, rx) = mpsc::channel();
        let listen_path = path.clone();
        let _handle = std::thread::spawn(move || {
            let _ = UnixSocketListener::new(&listen_path).run(tx);
        });
        std::thread::sleep(Duration::from_millis(150));

        for profile in ["a", "b"] {
            let mut stream = UnixStream::connect(&path).expect("connect");
            writeln!(stream, r#"{{"SelectProfile":"{}"}}"#, profile).unwrap();
        }

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, Command::SelectProfile("a".into()));
        assert_eq!(second, Command::SelectProfile("b".into()));
        let _ = std::fs::remove_file(&path);
    }
}
