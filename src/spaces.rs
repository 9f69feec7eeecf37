//! Ordinal workspace index.
//!
//! Raw workspace ids are not guaranteed to survive a compositor restart, so
//! profiles remember *the n-th workspace of a screen* instead.  A
//! [`SpaceIndex`] translates both ways and is rebuilt from the live desktop
//! on every capture and restore; it is never persisted.

use crate::command::{MonitorInfo, WorkspaceInfo};
use log::debug;
use std::collections::HashMap;

/// Bidirectional map between workspace ids and per-screen ordinals.
#[derive(Debug, Clone, Default)]
pub struct SpaceIndex {
    /// `workspace_id -> ordinal on its screen`
    ordinals: HashMap<i64, usize>,
    /// `screen_uuid -> workspace ids in ordinal order`
    by_screen: HashMap<String, Vec<i64>>,
}

impl SpaceIndex {
    /// Build the index from the live monitors and workspaces.
    ///
    /// Workspaces keep the order they are reported in.  Workspaces on a
    /// monitor that is not in `monitors` are skipped.
    pub fn build(monitors: &[MonitorInfo], workspaces: &[WorkspaceInfo]) -> Self {
        let mut index = Self::default();
        for ws in workspaces {
            let Some(monitor) = monitors.iter().find(|m| m.name == ws.monitor) else {
                debug!("workspace {} on unknown monitor {}", ws.id, ws.monitor);
                continue;
            };
            if index.ordinals.contains_key(&ws.id) {
                continue;
            }
            let list = index.by_screen.entry(monitor.uuid.clone()).or_default();
            index.ordinals.insert(ws.id, list.len());
            list.push(ws.id);
        }
        index
    }

    /// Ordinal of `workspace_id` on its screen.
    pub fn ordinal_of(&self, workspace_id: i64) -> Option<usize> {
        self.ordinals.get(&workspace_id).copied()
    }

    /// Live workspace id at `ordinal` on the screen `screen_uuid`.
    pub fn workspace_at(&self, screen_uuid: &str, ordinal: usize) -> Option<i64> {
        self.by_screen.get(screen_uuid)?.get(ordinal).copied()
    }

    /// Workspace ids on `screen_uuid` in ordinal order.
    pub fn workspaces_on(&self, screen_uuid: &str) -> &[i64] {
        self.by_screen
            .get(screen_uuid)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ordinal of a window's primary workspace.
    ///
    /// A window reported on several workspaces only counts the first one.
    pub fn primary_ordinal(&self, membership: &[i64]) -> Option<usize> {
        self.ordinal_of(*membership.first()?)
    }
}
