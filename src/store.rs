//! Profile persistence.
//!
//! All saved layouts live in one JSON document keyed by
//! [`ConfigId`](crate::display::ConfigId):
//!
//! ```json
//! {
//!   "panel-a|panel-b": {
//!     "active": "Default",
//!     "layouts": {
//!       "Default": {
//!         "timestamp": "2024-05-01T09:30:00Z",
//!         "display_count": 2,
//!         "windows": [
//!           { "app": "firefox", "title": "Inbox", "frame": {"x":0,"y":0,"w":960,"h":1080},
//!             "screen": "DP-1", "screen_uuid": "panel-a", "space_index": 0,
//!             "id": 94251437563904, "isStandard": true }
//!         ]
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Older documents stored a single layout directly under the key
//! (`windows` / `timestamp` / `display_count`, no `layouts`).  Such a
//! collection is moved to `layouts.Default` before anything is written to
//! it.  The move happens on the raw JSON tree, so fields this version does
//! not know about survive untouched.
//!
//! The store reads and writes the whole document each time; the last writer
//! wins.

use crate::command::Frame;
use crate::display::ConfigId;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Profile used when nothing else is selected.
pub const DEFAULT_PROFILE: &str = "Default";

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

fn default_true() -> bool {
    true
}

/// Persisted record of one window at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDescriptor {
    pub app: String,
    #[serde(default)]
    pub title: String,
    /// Geometry relative to the origin of `screen`.
    pub frame: Frame,
    #[serde(default)]
    pub screen: String,
    #[serde(default)]
    pub screen_uuid: String,
    /// Ordinal of the window's workspace on its screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_index: Option<usize>,
    /// Window id at capture time.  Only meaningful within the same session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "isStandard", default = "default_true")]
    pub is_standard: bool,
}

/// One captured, timestamped set of windows.  Window order is capture order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub display_count: usize,
    /// Compositor session that produced the window ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default)]
    pub windows: Vec<WindowDescriptor>,
}

/// All profiles saved for one display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCollection {
    #[serde(default = "default_profile")]
    pub active: String,
    /// A `null` entry is a profile that exists but has no snapshot.
    #[serde(default)]
    pub layouts: BTreeMap<String, Option<LayoutSnapshot>>,
}

/// Whether `collection` still has the single-layout shape.
pub fn is_legacy(collection: &Value) -> bool {
    match collection.as_object() {
        Some(obj) => {
            !obj.contains_key("layouts")
                && (obj.contains_key("windows") || obj.contains_key("timestamp"))
        }
        None => false,
    }
}

/// Move a single-layout collection to `layouts.Default`.
///
/// Returns `true` if anything changed.  Running it again is a no-op.
pub fn migrate_legacy(collection: &mut Value) -> bool {
    if !is_legacy(collection) {
        return false;
    }
    let old = std::mem::take(collection);
    let mut layouts = Map::new();
    layouts.insert(DEFAULT_PROFILE.to_string(), old);
    let mut migrated = Map::new();
    migrated.insert("active".to_string(), Value::String(default_profile()));
    migrated.insert("layouts".to_string(), Value::Object(layouts));
    *collection = Value::Object(migrated);
    true
}

/// The in-memory profile document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDocument {
    root: Map<String, Value>,
}

impl ProfileDocument {
    /// Parse a document.  The top level must be a JSON object.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(root) => Ok(Self { root }),
            other => Err(StoreError::Shape(format!(
                "expected an object at the top level, got {}",
                type_name(&other)
            ))),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Raw JSON of one collection, as stored.
    pub fn raw(&self, id: &ConfigId) -> Option<&Value> {
        self.root.get(id.as_str())
    }

    /// Migrate the collection under `id` if it is in the legacy shape.
    pub fn migrate(&mut self, id: &ConfigId) -> bool {
        match self.root.get_mut(id.as_str()) {
            Some(collection) => {
                let changed = migrate_legacy(collection);
                if changed {
                    info!("migrated legacy layout for {} to profile {:?}", id, DEFAULT_PROFILE);
                }
                changed
            }
            None => false,
        }
    }

    /// Typed view of the collection under `id`.
    ///
    /// A legacy collection is presented as if it were migrated; the
    /// document itself is not modified.  An unreadable collection is
    /// treated as absent.
    pub fn collection(&self, id: &ConfigId) -> Option<ProfileCollection> {
        let mut raw = self.root.get(id.as_str())?.clone();
        migrate_legacy(&mut raw);
        match serde_json::from_value(raw) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("ignoring unreadable profiles for {}: {}", id, e);
                None
            }
        }
    }

    /// Names of the profiles saved for `id`, sorted.
    pub fn profile_names(&self, id: &ConfigId) -> Vec<String> {
        self.collection(id)
            .map(|c| c.layouts.into_keys().collect())
            .unwrap_or_default()
    }

    /// Write `snapshot` as profile `profile` of `id` and make it active.
    ///
    /// Migrates a legacy collection first.  Other profiles are left as
    /// they are on disk.
    pub fn put_snapshot(
        &mut self,
        id: &ConfigId,
        profile: &str,
        snapshot: &LayoutSnapshot,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(snapshot)?;
        self.migrate(id);
        let collection = self.collection_object_mut(id);
        let layouts = collection
            .entry("layouts")
            .or_insert_with(|| Value::Object(Map::new()));
        if !layouts.is_object() {
            *layouts = Value::Object(Map::new());
        }
        if let Value::Object(layouts) = layouts {
            layouts.insert(profile.to_string(), value);
        }
        collection.insert("active".to_string(), Value::String(profile.to_string()));
        Ok(())
    }

    /// Mark `profile` as active for `id`.
    ///
    /// Only profiles that exist can be selected.
    pub fn set_active(&mut self, id: &ConfigId, profile: &str) -> Result<(), StoreError> {
        let known = self
            .collection(id)
            .is_some_and(|c| c.layouts.contains_key(profile));
        if !known {
            return Err(StoreError::UnknownProfile(profile.to_string()));
        }
        self.migrate(id);
        self.collection_object_mut(id)
            .insert("active".to_string(), Value::String(profile.to_string()));
        Ok(())
    }

    /// The collection under `id` as a JSON object, created if missing and
    /// replaced if it is not an object.
    fn collection_object_mut(&mut self, id: &ConfigId) -> &mut Map<String, Value> {
        let entry = self
            .root
            .entry(id.as_str().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            warn!("replacing malformed profile collection for {}", id);
            *entry = Value::Object(Map::new());
        }
        match entry {
            Value::Object(obj) => obj,
            _ => unreachable!("collection was just made an object"),
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Errors from reading or writing the profile document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed profile document: {0}")]
    Shape(String),
    #[error("no profile named {0:?}")]
    UnknownProfile(String),
}

/// File-backed profile document.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document.
    ///
    /// A missing, unreadable or malformed file yields an empty document.
    pub fn load(&self) -> ProfileDocument {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no profile document at {}", self.path.display());
                return ProfileDocument::default();
            }
            Err(e) => {
                warn!("failed to read {}: {}", self.path.display(), e);
                return ProfileDocument::default();
            }
        };
        ProfileDocument::from_json(&contents).unwrap_or_else(|e| {
            warn!("failed to parse {}: {}", self.path.display(), e);
            ProfileDocument::default()
        })
    }

    /// Write the whole document, creating parent directories as needed.
    pub fn save(&self, doc: &ProfileDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, doc.to_json_pretty()?)?;
        debug!("wrote {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::tmp_path;
    use serde_json::json;

    fn descriptor(app: &str, title: &str) -> WindowDescriptor {
        WindowDescriptor {
            app: app.into(),
            title: title.into(),
            frame: Frame::new(0.0, 0.0, 800.0, 600.0),
            screen: "DP-1".into(),
            screen_uuid: "panel-1".into(),
            space_index: Some(0),
            id: Some(42),
            is_standard: true,
        }
    }

    fn snapshot(windows: Vec<WindowDescriptor>) -> LayoutSnapshot {
        LayoutSnapshot {
            timestamp: "2024-05-01T09:30:00Z".into(),
            display_count: 1,
            session: None,
            windows,
        }
    }

    #[test]
    fn descriptor_wire_names() {
        let v = serde_json::to_value(descriptor("kitty", "zsh")).unwrap();
        assert_eq!(v["app"], "kitty");
        assert_eq!(v["screen_uuid"], "panel-1");
        assert_eq!(v["space_index"], 0);
        assert_eq!(v["id"], 42);
        assert_eq!(v["isStandard"], true);
        assert_eq!(v["frame"], json!({"x": 0.0, "y": 0.0, "w": 800.0, "h": 600.0}));
    }

    #[test]
    fn descriptor_tolerates_missing_fields() {
        let d: WindowDescriptor =
            serde_json::from_value(json!({"app": "kitty", "frame": {"x":1,"y":2,"w":3,"h":4}}))
                .unwrap();
        assert_eq!(d.title, "");
        assert_eq!(d.id, None);
        assert_eq!(d.space_index, None);
        assert!(d.is_standard);
        assert_eq!(d.frame, Frame::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn active_defaults_to_default_profile() {
        let c: ProfileCollection = serde_json::from_value(json!({"layouts": {}})).unwrap();
        assert_eq!(c.active, DEFAULT_PROFILE);
    }

    #[test]
    fn null_layout_is_a_profile_without_snapshot() {
        let c: ProfileCollection =
            serde_json::from_value(json!({"active": "x", "layouts": {"x": null}})).unwrap();
        assert_eq!(c.layouts.get("x"), Some(&None));
    }

    #[test]
    fn migrate_legacy_shape() {
        let windows = json!([{"app": "Editor", "title": "a.txt", "extra": [1, 2, 3],
                              "frame": {"x": 1.5, "y": 2, "w": 3, "h": 4}}]);
        let mut c = json!({"windows": windows.clone(), "timestamp": "t"});
        assert!(is_legacy(&c));
        assert!(migrate_legacy(&mut c));
        assert_eq!(
            c,
            json!({"active": "Default", "layouts": {"Default": {"windows": windows, "timestamp": "t"}}})
        );
    }

    #[test]
    fn migration_is_idempotent() {
        let mut c = json!({"windows": [], "timestamp": "t", "display_count": 2});
        assert!(migrate_legacy(&mut c));
        let once = c.clone();
        assert!(!migrate_legacy(&mut c));
        assert_eq!(c, once);
    }

    #[test]
    fn current_shape_is_not_legacy() {
        let mut c = json!({"active": "work", "layouts": {"work": {"windows": []}}});
        let before = c.clone();
        assert!(!is_legacy(&c));
        assert!(!migrate_legacy(&mut c));
        assert_eq!(c, before);
        assert!(!is_legacy(&json!({})));
        assert!(!is_legacy(&json!("nonsense")));
    }

    #[test]
    fn legacy_collection_reads_as_default_profile() {
        let doc = ProfileDocument::from_json(
            r#"{"B": {"windows": [], "timestamp": "t", "display_count": 1}}"#,
        )
        .unwrap();
        let id = ConfigId::from("B");
        let c = doc.collection(&id).unwrap();
        assert_eq!(c.active, DEFAULT_PROFILE);
        assert_eq!(c.layouts[DEFAULT_PROFILE].as_ref().unwrap().timestamp, "t");
        // Reading does not rewrite the document.
        assert!(is_legacy(doc.raw(&id).unwrap()));
    }

    #[test]
    fn put_snapshot_migrates_and_preserves_legacy_bytes() {
        let legacy = json!({"windows": [{"app": "Editor", "title": "x", "id": 7, "odd": null,
                                          "frame": {"x": 0.25, "y": 0, "w": 1, "h": 1}}],
                            "timestamp": "t"});
        let mut doc = ProfileDocument::from_json(&json!({"B": legacy.clone()}).to_string()).unwrap();
        let id = ConfigId::from("B");

        doc.put_snapshot(&id, "work", &snapshot(vec![descriptor("kitty", "zsh")]))
            .unwrap();

        let raw = doc.raw(&id).unwrap();
        assert_eq!(raw["active"], "work");
        assert_eq!(raw["layouts"]["Default"], legacy);
        assert_eq!(raw["layouts"]["work"]["windows"][0]["app"], "kitty");
        assert!(raw.get("windows").is_none());
    }

    #[test]
    fn put_snapshot_keeps_unknown_fields_of_other_profiles() {
        let mut doc = ProfileDocument::from_json(
            r#"{"A": {"active": "old", "layouts": {"old": {"windows": [], "timestamp": "t", "note": "keep me"}}}}"#,
        )
        .unwrap();
        let id = ConfigId::from("A");
        doc.put_snapshot(&id, "new", &snapshot(vec![])).unwrap();
        let raw = doc.raw(&id).unwrap();
        assert_eq!(raw["layouts"]["old"]["note"], "keep me");
        assert_eq!(raw["active"], "new");
        assert_eq!(doc.profile_names(&id), vec!["new".to_string(), "old".to_string()]);
    }

    #[test]
    fn put_snapshot_creates_collection() {
        let mut doc = ProfileDocument::default();
        let id = ConfigId::from("A");
        doc.put_snapshot(&id, DEFAULT_PROFILE, &snapshot(vec![descriptor("a", "b")]))
            .unwrap();
        let c = doc.collection(&id).unwrap();
        assert_eq!(c.active, DEFAULT_PROFILE);
        assert_eq!(c.layouts[DEFAULT_PROFILE].as_ref().unwrap().windows.len(), 1);
    }

    #[test]
    fn set_active_requires_existing_profile() {
        let mut doc = ProfileDocument::default();
        let id = ConfigId::from("A");
        doc.put_snapshot(&id, "one", &snapshot(vec![])).unwrap();
        doc.put_snapshot(&id, "two", &snapshot(vec![])).unwrap();
        doc.set_active(&id, "one").unwrap();
        assert_eq!(doc.collection(&id).unwrap().active, "one");
        assert!(matches!(
            doc.set_active(&id, "three"),
            Err(StoreError::UnknownProfile(_))
        ));
        assert!(doc.set_active(&ConfigId::from("nope"), "one").is_err());
    }

    #[test]
    fn top_level_must_be_object() {
        assert!(matches!(
            ProfileDocument::from_json("[1, 2]"),
            Err(StoreError::Shape(_))
        ));
        assert!(matches!(
            ProfileDocument::from_json("{not json"),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let path = tmp_path("store");
        let store = ProfileStore::new(&path);
        let mut doc = store.load();
        assert_eq!(doc, ProfileDocument::default());

        let id = ConfigId::from("A|B");
        doc.put_snapshot(&id, "work", &snapshot(vec![descriptor("kitty", "zsh")]))
            .unwrap();
        store.save(&doc).unwrap();

        let reloaded = store.load();
        assert_eq!(reloaded, doc);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unreadable_document_degrades_to_empty() {
        let path = tmp_path("corrupt");
        std::fs::write(&path, "this is not json").unwrap();
        let doc = ProfileStore::new(&path).load();
        assert_eq!(doc, ProfileDocument::default());
        let _ = std::fs::remove_file(&path);
    }
}
