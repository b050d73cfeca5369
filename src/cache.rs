//! Conditional delivery of static assets.
//!
//! The gate sits in front of an [`AssetSource`]. It answers `If-None-Match`
//! requests from the fingerprint index and only reads an asset when the client
//! does not already hold the current version.

use std::path::PathBuf;

use log::{debug, info};

use crate::{
    asset::{Asset, AssetError, AssetKind, AssetSource, sanitize_path},
    conf::ServerConfigAssets,
    fingerprint::{Fingerprint, FingerprintIndex},
};

/// What to send back for an asset request.
#[derive(Debug)]
pub enum GateResponse {
    /// The client's copy is current. No body.
    NotModified { etag: Fingerprint },
    /// Deliver the asset.
    Asset { etag: Fingerprint, asset: Asset },
    /// Nothing to serve: missing file, directory without an index document,
    /// or a path outside the asset root.
    NotFound,
}

pub struct CacheGate<S: AssetSource> {
    source: S,
    index: FingerprintIndex,
    max_age: u32,
    index_file: String,
}

impl<S: AssetSource> CacheGate<S> {
    /// Fingerprints everything in `source` and wraps it.
    pub fn new(source: S, config: &ServerConfigAssets) -> Result<Self, AssetError> {
        let index = FingerprintIndex::build(&source)?;
        Ok(Self::with_index(source, index, config))
    }

    pub fn with_index(source: S, index: FingerprintIndex, config: &ServerConfigAssets) -> Self {
        Self {
            source,
            index,
            max_age: config.max_age,
            index_file: config.index_file.clone(),
        }
    }

    pub fn index(&self) -> &FingerprintIndex {
        &self.index
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Value of the `Cache-Control` header for delivered assets.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.max_age)
    }

    /// Decides the response for `raw_path` (relative to the asset root).
    ///
    /// # Arguments
    ///
    /// - `raw_path` - Path as requested, below the asset URL prefix.
    /// - `if_none_match` - Raw `If-None-Match` header value, if any.
    pub async fn handle(
        &self,
        raw_path: &str,
        if_none_match: Option<&str>,
    ) -> Result<GateResponse, AssetError> {
        let path = match sanitize_path(raw_path) {
            Ok(v) => v,
            Err(e) => {
                info!("Rejecting asset request: {}", e);
                return Ok(GateResponse::NotFound);
            }
        };

        let Some(path) = self.locate(path).await? else {
            return Ok(GateResponse::NotFound);
        };

        if let (Some(etag), Some(header)) = (self.index.get(&path), if_none_match) {
            if etag_matches(header, etag) {
                debug!("{:?} not modified", path);
                return Ok(GateResponse::NotModified { etag: etag.clone() });
            }
        }

        let asset = match self.source.get_asset(&path).await {
            Ok(v) => v,
            Err(AssetError::NotFound) => {
                info!("Asset {:?} vanished before it could be read", path);
                return Ok(GateResponse::NotFound);
            }
            Err(e) => return Err(e),
        };

        let etag = match self.index.get(&path) {
            Some(v) => v.clone(),
            None => {
                debug!("{:?} is not indexed, fingerprinting it now", path);
                let etag = Fingerprint::of(asset.bytes());
                if if_none_match.is_some_and(|h| etag_matches(h, &etag)) {
                    return Ok(GateResponse::NotModified { etag });
                }
                etag
            }
        };

        Ok(GateResponse::Asset { etag, asset })
    }

    /// Finds the file to serve for `path`: the file itself, or the index
    /// document of a directory.
    async fn locate(&self, path: PathBuf) -> Result<Option<PathBuf>, AssetError> {
        match self.source.kind(&path).await? {
            AssetKind::File => Ok(Some(path)),
            AssetKind::Missing => Ok(None),
            AssetKind::Directory => {
                let index = path.join(&self.index_file);
                match self.source.kind(&index).await? {
                    AssetKind::File => Ok(Some(index)),
                    _ => {
                        debug!("Directory {:?} has no {}", path, self.index_file);
                        Ok(None)
                    }
                }
            }
        }
    }
}

/// Checks an `If-None-Match` value against the current fingerprint.
///
/// Accepts `*`, strong and weak tags, quoted or bare, in a comma separated list.
pub fn etag_matches(header: &str, current: &Fingerprint) -> bool {
    header.split(',').map(str::trim).any(|tag| {
        tag == "*" || tag.trim_start_matches("W/").trim_matches('"') == current.as_str()
    })
}

/* -------------------------------------------------------------------------- */
/*                                    Tests                                   */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use crate::{conf::ServerConfigAssets, fingerprint::Fingerprint, storage::MemoryAssets};

    use super::{CacheGate, GateResponse, etag_matches};

    fn gate() -> CacheGate<MemoryAssets> {
        let assets = MemoryAssets::new()
            .with_asset("style.css", "body{}")
            .with_asset("docs/index.html", "<h1>docs</h1>")
            .with_asset("empty/readme.txt", "nothing");
        CacheGate::new(assets, &ServerConfigAssets::default()).unwrap()
    }

    #[test]
    fn matches_tag_forms() {
        let fp = Fingerprint::of(b"meow");
        assert!(etag_matches(&fp.etag(), &fp));
        assert!(etag_matches(fp.as_str(), &fp));
        assert!(etag_matches(&format!("W/{}", fp.etag()), &fp));
        assert!(etag_matches(&format!("\"other\", {}", fp.etag()), &fp));
        assert!(etag_matches("*", &fp));
        assert!(!etag_matches("\"other\"", &fp));
        assert!(!etag_matches("", &fp));
    }

    #[tokio::test]
    async fn delivers_with_current_tag() {
        let gate = gate();
        match gate.handle("style.css", None).await.unwrap() {
            GateResponse::Asset { etag, asset } => {
                assert_eq!(etag, Fingerprint::of(b"body{}"));
                assert_eq!(asset.bytes(), b"body{}");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn matching_tag_is_not_modified() {
        let gate = gate();
        let etag = Fingerprint::of(b"body{}").etag();
        assert!(matches!(
            gate.handle("/style.css", Some(&etag)).await.unwrap(),
            GateResponse::NotModified { .. }
        ));
    }

    #[tokio::test]
    async fn stale_tag_is_delivered() {
        let gate = gate();
        assert!(matches!(
            gate.handle("style.css", Some("\"stale\"")).await.unwrap(),
            GateResponse::Asset { .. }
        ));
    }

    #[tokio::test]
    async fn directories_need_an_index_document() {
        let gate = gate();
        assert!(matches!(
            gate.handle("docs", None).await.unwrap(),
            GateResponse::Asset { .. }
        ));
        assert!(matches!(
            gate.handle("empty/", None).await.unwrap(),
            GateResponse::NotFound
        ));
        assert!(matches!(
            gate.handle("", None).await.unwrap(),
            GateResponse::NotFound
        ));
    }

    #[tokio::test]
    async fn traversal_is_not_found() {
        let gate = gate();
        assert!(matches!(
            gate.handle("../Cargo.toml", None).await.unwrap(),
            GateResponse::NotFound
        ));
    }

    #[tokio::test]
    async fn unindexed_assets_are_fingerprinted_on_demand() {
        let assets = MemoryAssets::new().with_asset("late.js", "let a;");
        let index = crate::fingerprint::FingerprintIndex::default();
        let gate = CacheGate::with_index(assets, index, &ServerConfigAssets::default());

        let fp = Fingerprint::of(b"let a;");
        assert!(matches!(
            gate.handle("late.js", None).await.unwrap(),
            GateResponse::Asset { ref etag, .. } if *etag == fp
        ));
        assert!(matches!(
            gate.handle("late.js", Some(&fp.etag())).await.unwrap(),
            GateResponse::NotModified { .. }
        ));
    }

    #[test]
    fn cache_control_uses_max_age() {
        let mut config = ServerConfigAssets::default();
        config.max_age = 604800;
        let gate = CacheGate::with_index(MemoryAssets::new(), Default::default(), &config);
        assert_eq!(gate.cache_control(), "public, max-age=604800");
    }
}
