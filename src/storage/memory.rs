/// In-memory asset storage.
///
/// Keeps a flat map of relative paths to contents. Directories exist
/// implicitly whenever some file lives below them. Useful for mocking.
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use log::debug;

use crate::asset::{Asset, AssetError, AssetKind, AssetSource, asset_key};

#[derive(Clone, Debug, Default)]
pub struct MemoryAssets {
    data: BTreeMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.set_asset(Path::new(path), contents);
        self
    }

    pub fn set_asset(&mut self, path: &Path, contents: impl Into<Vec<u8>>) {
        self.data.insert(asset_key(path), contents.into());
    }

    pub fn delete_asset(&mut self, path: &Path) -> Result<(), AssetError> {
        match self.data.remove(&asset_key(path)) {
            Some(_) => Ok(()),
            None => Err(AssetError::NotFound),
        }
    }
}

impl AssetSource for MemoryAssets {
    async fn kind(&self, path: &Path) -> Result<AssetKind, AssetError> {
        let key = asset_key(path);
        if self.data.contains_key(&key) {
            return Ok(AssetKind::File);
        }
        let prefix = if key.is_empty() { key } else { format!("{}/", key) };
        match self.data.keys().any(|k| k.starts_with(&prefix)) {
            true => Ok(AssetKind::Directory),
            false => Ok(AssetKind::Missing),
        }
    }

    async fn get_asset(&self, path: &Path) -> Result<Asset, AssetError> {
        debug!("Getting memory asset {:?}...", path);
        match self.data.get(&asset_key(path)) {
            Some(v) => Ok(Asset::new(path, v.clone())),
            None => Err(AssetError::NotFound),
        }
    }

    fn for_each_file(&self, visit: &mut dyn FnMut(&Path, &[u8])) -> Result<(), AssetError> {
        for (key, contents) in &self.data {
            visit(&PathBuf::from(key), contents);
        }
        Ok(())
    }
}
