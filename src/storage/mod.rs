//! Asset sources backed by the filesystem or by memory.
mod filesystem;
mod memory;

pub use filesystem::FilesystemAssets;
pub use memory::MemoryAssets;
