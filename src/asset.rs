use std::{
    fmt::Display,
    path::{Component, Path, PathBuf},
};

/* -------------------------------- Utilities ------------------------------- */

#[derive(Debug)]
pub enum AssetError {
    /// Nothing exists at the requested path.
    NotFound,
    /// The path tried to leave the asset root or was otherwise unusable.
    InvalidPath(String),
    /// The underlying storage failed.
    Io(PathBuf, std::io::Error),
}

impl Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("Not found"),
            Self::InvalidPath(p) => write!(f, "Invalid asset path \"{}\"", p),
            Self::Io(p, e) => write!(f, "I/O error at {}: {}", p.display(), e),
        }
    }
}

impl std::error::Error for AssetError {}

/// What is stored at a path of an asset source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Missing,
    File,
    Directory,
}

/* -------------------------------------------------------------------------- */
/*                                   Assets                                   */
/* -------------------------------------------------------------------------- */

/// A file of the static bundle, read in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    path: PathBuf,
    contents: Vec<u8>,
}

impl Asset {
    pub fn new(path: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }

    /// Path relative to the asset root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the file, e.g. `fi.svg` for `icons/languages/fi.svg`.
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.contents
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.contents
    }

    /// Guesses the MIME type from the file extension.
    pub fn mime_type(&self) -> mime_guess::Mime {
        mime_guess::from_path(&self.path).first_or_octet_stream()
    }
}

/// A read-only tree of assets, addressed by relative path.
pub trait AssetSource {
    /// Reports whether `path` is a file, a directory or nothing at all.
    #[allow(async_fn_in_trait)]
    async fn kind(&self, path: &Path) -> Result<AssetKind, AssetError>;

    /// Reads the file at `path`.
    #[allow(async_fn_in_trait)]
    async fn get_asset(&self, path: &Path) -> Result<Asset, AssetError>;

    /// Visits every file of the tree, depth first, with its relative path and contents.
    ///
    /// Only meant for startup: implementations may block.
    fn for_each_file(&self, visit: &mut dyn FnMut(&Path, &[u8])) -> Result<(), AssetError>;
}

/* -------------------------------------------------------------------------- */
/*                                Path Handling                               */
/* -------------------------------------------------------------------------- */

/// Turns a request path into a path relative to the asset root.
///
/// Leading slashes and `.` are dropped. Anything that could escape the root
/// (`..`, drive prefixes) is rejected.
pub fn sanitize_path(raw: &str) -> Result<PathBuf, AssetError> {
    let mut out = PathBuf::new();
    for component in Path::new(raw.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(AssetError::InvalidPath(raw.to_string()));
            }
        }
    }
    Ok(out)
}

/// Stable key for a relative path: components joined with `/`.
pub fn asset_key(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/* -------------------------------------------------------------------------- */
/*                                    Tests                                   */
/* -------------------------------------------------------------------------- */
