//! Errors reported by capture and restore.
//!
//! None of these are fatal to the daemon: the
//! [`LayoutManager`](crate::manager::LayoutManager) logs them and carries on.
//! A descriptor that finds no live window is not an error at all; it is
//! counted in [`RestoreReport::missed`](crate::restore::RestoreReport).

/// Possible errors from capture, restore and profile selection.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// No profiles were ever saved for the current display configuration.
    #[error("no saved layouts for display configuration {config_id:?}")]
    MissingProfile { config_id: String },

    /// The requested profile does not exist in the current configuration.
    #[error("no profile named {profile:?}")]
    UnknownProfile { profile: String },

    /// The profile exists but holds no windows.
    #[error("profile {profile:?} has no saved windows")]
    EmptyLayout { profile: String },

    /// The window manager returned an error.
    #[error("window manager error: {0}")]
    WindowManager(String),

    /// The profile document could not be written.
    #[error("profile store error: {0}")]
    Persistence(String),
}
