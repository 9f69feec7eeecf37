//! **hyprlayouts** — save and restore window layouts per display set.
//!
//! A *profile* is a named snapshot of where every standard window sits
//! (screen, workspace ordinal, geometry).  Profiles are grouped by the set
//! of attached displays, so a docked and an undocked laptop keep separate
//! layouts.  Restoring reconciles the snapshot with whatever windows are
//! open now; window ids and titles are allowed to drift.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowManager`] — abstracts desktop enumeration and window
//!   movement so capture and restore are not coupled to any compositor.
//! * [`traits::CommandSource`] — abstracts the transport that delivers
//!   user-intent (a Unix socket, compositor events, …) so the main loop
//!   is not coupled to any specific IPC mechanism.
//!
//! Capture lives in [`capture`], matching in [`matcher`], restore in
//! [`restore`] and persistence in [`store`].  Concrete implementations of
//! the traits live in [`hyprland`] (Hyprland IPC) and [`ipc`] (Unix-socket
//! command listener).

pub mod capture;
pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod hyprland;
pub mod ipc;
pub mod manager;
pub mod matcher;
pub mod restore;
pub mod spaces;
pub mod store;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
