//! Hyprland backend.
//!
//! [`wm::HyprlandWm`] answers desktop queries and moves windows through the
//! request socket; [`events::MonitorEventSource`] turns monitor hot-plug
//! events from the event socket into commands.  Everything else in the
//! crate talks to these through [`crate::traits`] only.

pub mod events;
pub mod wm;
