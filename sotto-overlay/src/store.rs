// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locations of the engine's store files.
//!
//! The engine reads and writes these files in its own format; the overlay
//! only guarantees they exist before the engine touches them for the first
//! time.
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

pub const PRIVATE_KEY_FILE: &str = "sotto.private_key";
pub const FINGERPRINTS_FILE: &str = "sotto.fingerprints";
pub const INSTANCE_TAGS_FILE: &str = "sotto.instance_tags";

/// Paths of the private-key, fingerprint and instance-tag stores inside the
/// host profile directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyStores {
    pub private_keys: PathBuf,
    pub fingerprints: PathBuf,
    pub instance_tags: PathBuf,
}

impl KeyStores {
    pub fn new(profile_dir: &Path) -> Self {
        Self {
            private_keys: profile_dir.join(PRIVATE_KEY_FILE),
            fingerprints: profile_dir.join(FINGERPRINTS_FILE),
            instance_tags: profile_dir.join(INSTANCE_TAGS_FILE),
        }
    }

    /// Creates any store file that does not exist yet, leaving existing
    /// files untouched.
    pub fn ensure_exist(&self) -> io::Result<()> {
        for path in [&self.private_keys, &self.fingerprints, &self.instance_tags] {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
        }
        Ok(())
    }
}
