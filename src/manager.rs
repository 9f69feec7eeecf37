//! The orchestrator that ties the profile store, window manager and command
//! sources together.
//!
//! [`LayoutManager`] reacts to [`Command`]s by running capture, restore or
//! profile selection against its [`WindowManager`].  Commands are handled
//! one at a time on the caller's thread; the daemon funnels every source
//! into a single channel so no locking is needed.

use crate::capture::{capture_layout, select_profile, CaptureReport};
use crate::command::Command;
use crate::config::{AutoRestore, Config};
use crate::display::{config_id, ConfigId};
use crate::error::LayoutError;
use crate::restore::{restore_layout, RestoreReport};
use crate::store::ProfileStore;
use crate::traits::WindowManager;
use chrono::{SecondsFormat, Utc};
use log::{debug, info};

/// What a handled command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Captured(CaptureReport),
    Restored(RestoreReport),
    Selected { config_id: ConfigId, profile: String },
    /// Nothing to do (e.g. a display change with auto-restore off, or a
    /// display set identical to the previous one).
    Skipped,
}

/// Runs capture and restore against a window manager.
///
/// The manager is generic over any [`WindowManager`] implementation, making
/// it completely independent of Hyprland or any other concrete backend.
pub struct LayoutManager<W: WindowManager> {
    wm: W,
    store: ProfileStore,
    config: Config,
    /// Display configuration seen at the last display-change event.
    last_config_id: Option<ConfigId>,
}

impl<W: WindowManager> LayoutManager<W> {
    pub fn new(wm: W, store: ProfileStore, config: Config) -> Self {
        Self {
            wm,
            store,
            config,
            last_config_id: None,
        }
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn window_manager(&self) -> &W {
        &self.wm
    }

    /// Key of the currently attached displays.
    pub fn current_config_id(&self) -> Result<ConfigId, LayoutError> {
        let monitors = self
            .wm
            .monitors()
            .map_err(|e| LayoutError::WindowManager(e.to_string()))?;
        Ok(config_id(&monitors))
    }

    /// Process a single [`Command`].
    pub fn handle(&mut self, cmd: Command) -> Result<Outcome, LayoutError> {
        match cmd {
            Command::Capture { profile } => {
                info!("capture {:?}", profile);
                let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
                capture_layout(&self.wm, &self.store, profile.as_deref(), &now)
                    .map(Outcome::Captured)
            }

            Command::Restore { profile } => {
                info!("restore {:?}", profile);
                restore_layout(&self.wm, &self.store, &self.config, profile.as_deref())
                    .map(Outcome::Restored)
            }

            Command::SelectProfile(profile) => {
                info!("select profile {:?}", profile);
                let config_id = select_profile(&self.wm, &self.store, &profile)?;
                Ok(Outcome::Selected { config_id, profile })
            }

            Command::DisplaysChanged => self.displays_changed(),
        }
    }

    fn displays_changed(&mut self) -> Result<Outcome, LayoutError> {
        let id = self.current_config_id()?;
        if self.last_config_id.as_ref() == Some(&id) {
            debug!("display set unchanged ({})", id);
            return Ok(Outcome::Skipped);
        }
        info!("display configuration is now {}", id);
        self.last_config_id = Some(id);
        match self.config.auto_restore {
            AutoRestore::Off => Ok(Outcome::Skipped),
            AutoRestore::OnDisplayChange => {
                restore_layout(&self.wm, &self.store, &self.config, None).map(Outcome::Restored)
            }
        }
    }
}
