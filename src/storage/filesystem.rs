use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::debug;
use walkdir::WalkDir;

use crate::asset::{Asset, AssetError, AssetKind, AssetSource};

/// Serves assets from a directory on disk.
///
/// Layout is used as-is: `<root>/icons/languages/fi.svg` is addressed as
/// `icons/languages/fi.svg`.
#[derive(Clone, Debug)]
pub struct FilesystemAssets {
    root: PathBuf,
}

impl FilesystemAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl AssetSource for FilesystemAssets {
    async fn kind(&self, path: &Path) -> Result<AssetKind, AssetError> {
        let full = self.resolve(path);
        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_dir() => {
                debug!("Asset {:?} is a directory", path);
                Ok(AssetKind::Directory)
            }
            Ok(meta) if meta.is_file() => {
                debug!("Asset {:?} is a file", path);
                Ok(AssetKind::File)
            }
            Ok(_) => Ok(AssetKind::Missing),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Asset {:?} does not exist", path);
                Ok(AssetKind::Missing)
            }
            Err(e) => Err(AssetError::Io(full, e)),
        }
    }

    async fn get_asset(&self, path: &Path) -> Result<Asset, AssetError> {
        let full = self.resolve(path);
        match tokio::fs::read(&full).await {
            Ok(contents) => Ok(Asset::new(path, contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AssetError::NotFound),
            Err(e) => Err(AssetError::Io(full, e)),
        }
    }

    fn for_each_file(&self, visit: &mut dyn FnMut(&Path, &[u8])) -> Result<(), AssetError> {
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                AssetError::Io(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let contents = std::fs::read(entry.path())
                .map_err(|e| AssetError::Io(entry.path().to_path_buf(), e))?;
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            visit(relative, &contents);
        }
        Ok(())
    }
}
