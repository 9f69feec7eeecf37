//! Display configuration keys.
//!
//! Profiles are stored per physical display set.  The [`ConfigId`] of a set
//! is its sorted monitor identifiers joined with [`DELIMITER`], so the key
//! does not depend on the order the window manager enumerates monitors in,
//! and plugging in, removing or swapping any panel selects a different
//! collection of profiles.

use crate::command::MonitorInfo;
use std::fmt;

/// Separator between monitor identifiers in a [`ConfigId`].
pub const DELIMITER: &str = "|";

/// Key identifying one set of attached displays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigId(String);

impl ConfigId {
    /// Build the key from raw display identifiers.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        ids.sort();
        Self(ids.join(DELIMITER))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConfigId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The key for the currently attached `monitors`.
pub fn config_id(monitors: &[MonitorInfo]) -> ConfigId {
    ConfigId::from_ids(monitors.iter().map(|m| m.uuid.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::monitor;

    #[test]
    fn sorted_and_joined() {
        let id = ConfigId::from_ids(["b", "c", "a"]);
        assert_eq!(id.as_str(), "a|b|c");
    }

    #[test]
    fn invariant_under_permutation() {
        let a = monitor("DP-1", "Dell U2720Q 1", 0, 0);
        let b = monitor("DP-2", "LG 27GL850 2", 1920, 0);
        let c = monitor("HDMI-A-1", "BenQ 3", 3840, 0);
        let forward = config_id(&[a.clone(), b.clone(), c.clone()]);
        assert_eq!(forward, config_id(&[c.clone(), a.clone(), b.clone()]));
        assert_eq!(forward, config_id(&[b, c, a]));
    }

    #[test]
    fn changes_on_add_remove_or_substitute() {
        let a = monitor("DP-1", "panel-a", 0, 0);
        let b = monitor("DP-2", "panel-b", 1920, 0);
        let base = config_id(&[a.clone(), b.clone()]);

        let added = config_id(&[a.clone(), b.clone(), monitor("DP-3", "panel-c", 3840, 0)]);
        assert_ne!(base, added);

        let removed = config_id(&[a.clone()]);
        assert_ne!(base, removed);

        let swapped = config_id(&[a, monitor("DP-2", "panel-z", 1920, 0)]);
        assert_ne!(base, swapped);
    }

    #[test]
    fn connector_names_do_not_matter() {
        let one = config_id(&[monitor("DP-1", "panel-a", 0, 0)]);
        let other = config_id(&[monitor("HDMI-A-1", "panel-a", 0, 0)]);
        assert_eq!(one, other);
    }

    #[test]
    fn empty_set_yields_empty_key() {
        assert_eq!(config_id(&[]).as_str(), "");
    }
}
