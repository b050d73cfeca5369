//! Content fingerprints for static assets.
//!
//! The index is computed once at startup by walking the whole asset tree and
//! is read-only afterwards, so request handlers share it without locking.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    path::Path,
};

use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use crate::{
    asset::{AssetError, AssetSource, asset_key},
    storage::FilesystemAssets,
};

/// Digest of an asset's bytes, used as its entity tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of `bytes`.
    ///
    /// Every call hashes with its own hasher, so no state carries over
    /// between files.
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(hex::encode(&digest[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The quoted form sent in the `ETag` header.
    pub fn etag(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprints of every file in the asset tree, keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct FingerprintIndex {
    by_path: BTreeMap<String, Fingerprint>,
    /// Base name -> path, or `None` once a second path claims the same name.
    by_name: HashMap<String, Option<String>>,
}

impl FingerprintIndex {
    /// Walks `source` and fingerprints every file in it.
    pub fn build(source: &impl AssetSource) -> Result<Self, AssetError> {
        let mut index = Self::default();
        source.for_each_file(&mut |path: &Path, bytes: &[u8]| {
            index.insert(path, Fingerprint::of(bytes))
        })?;
        info!("Fingerprinted {} assets", index.len());
        Ok(index)
    }

    /// Builds the index for the directory at `root`.
    pub fn build_from_dir(root: &Path) -> Result<Self, AssetError> {
        Self::build(&FilesystemAssets::new(root))
    }

    fn insert(&mut self, path: &Path, fingerprint: Fingerprint) {
        let key = asset_key(path);
        debug!("{} -> {}", key, fingerprint);

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            self.by_name
                .entry(name.to_string())
                .and_modify(|entry| {
                    if let Some(previous) = entry.as_ref().filter(|p| **p != key) {
                        warn!(
                            "Asset name \"{}\" is used by both {} and {}; name lookups for it are disabled",
                            name, previous, key
                        );
                        *entry = None;
                    }
                })
                .or_insert_with(|| Some(key.clone()));
        }

        self.by_path.insert(key, fingerprint);
    }

    /// Looks up the fingerprint of the file at `path`, relative to the asset root.
    pub fn get(&self, path: &Path) -> Option<&Fingerprint> {
        self.by_path.get(&asset_key(path))
    }

    /// Looks up a fingerprint by base name alone.
    ///
    /// Returns `None` for names shared by more than one path.
    pub fn get_by_name(&self, name: &str) -> Option<&Fingerprint> {
        let path = self.by_name.get(name)?.as_ref()?;
        self.by_path.get(path)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Iterates `(relative path, fingerprint)` in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fingerprint)> {
        self.by_path.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/* -------------------------------------------------------------------------- */
/*                                    Tests                                   */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::storage::MemoryAssets;

    use super::{Fingerprint, FingerprintIndex};

    #[test]
    fn fingerprint_is_deterministic() {
        let a = Fingerprint::of(b"meow");
        let b = Fingerprint::of(b"meow");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert_ne!(a, Fingerprint::of(b"mrrp"));
        assert_eq!(a.etag(), format!("\"{}\"", a));
    }

    /// Each file gets the digest of its own bytes, regardless of what was hashed before it.
    #[test]
    fn index_matches_recomputed_digests() {
        let assets = MemoryAssets::new()
            .with_asset("a.css", "body{}")
            .with_asset("icons/b.svg", "<svg/>")
            .with_asset("icons/c.svg", "<svg/>");
        let index = FingerprintIndex::build(&assets).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(
            index.get(Path::new("a.css")),
            Some(&Fingerprint::of(b"body{}"))
        );
        assert_eq!(
            index.get(Path::new("icons/b.svg")),
            Some(&Fingerprint::of(b"<svg/>"))
        );
        assert_eq!(index.get(Path::new("icons/b.svg")), index.get(Path::new("icons/c.svg")));
        assert!(index.get(Path::new("missing.css")).is_none());
    }

    #[test]
    fn shared_base_names_do_not_shadow_each_other() {
        let assets = MemoryAssets::new()
            .with_asset("en/logo.png", "one")
            .with_asset("fi/logo.png", "two")
            .with_asset("unique.png", "three");
        let index = FingerprintIndex::build(&assets).unwrap();

        assert_eq!(index.get(Path::new("en/logo.png")), Some(&Fingerprint::of(b"one")));
        assert_eq!(index.get(Path::new("fi/logo.png")), Some(&Fingerprint::of(b"two")));
        assert!(index.get_by_name("logo.png").is_none());
        assert_eq!(index.get_by_name("unique.png"), Some(&Fingerprint::of(b"three")));
    }

    #[test]
    fn builds_from_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("icons/brands")).unwrap();
        std::fs::write(dir.path().join("icons/brands/a.png"), "png").unwrap();
        std::fs::write(dir.path().join("style.css"), "css").unwrap();

        let index = FingerprintIndex::build_from_dir(dir.path()).unwrap();
        let paths: Vec<&str> = index.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["icons/brands/a.png", "style.css"]);
    }
}
