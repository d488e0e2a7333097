//! Learning profile store.
//!
//! Profiles record topics a student has struggled with so answers can slow
//! down on them. Storage is one JSON file per user; a missing or unreadable
//! profile is simply "no profile", never an error.

use std::fs;
use std::path::PathBuf;
use tracing::warn;
use tutor_common::LearningProfile;

pub trait ProfileStore: Send + Sync {
    fn learning_profile(&self, user_id: &str) -> Option<LearningProfile>;
}

/// File-backed store: `{dir}/{user_id}.json`.
pub struct JsonProfileStore {
    dir: PathBuf,
}

impl JsonProfileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Default location under the platform data directory.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("/var/lib"))
            .join("tutord")
            .join("profiles")
    }
}

impl ProfileStore for JsonProfileStore {
    fn learning_profile(&self, user_id: &str) -> Option<LearningProfile> {
        // User ids come off the wire; never let one traverse out of the dir.
        if user_id.is_empty() || user_id.contains('/') || user_id.contains('\\') || user_id.contains("..") {
            warn!("[-]  Rejecting suspicious user id {:?}", user_id);
            return None;
        }

        let path = self.dir.join(format!("{}.json", user_id));
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return None,
        };

        match serde_json::from_str::<LearningProfile>(&contents) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("[-]  Unparseable profile {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Store with no profiles. Used in tests and when profiles are disabled.
pub struct NoProfiles;

impl ProfileStore for NoProfiles {
    fn learning_profile(&self, _user_id: &str) -> Option<LearningProfile> {
        None
    }
}
