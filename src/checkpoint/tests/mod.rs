//! Unit tests for checkpoints.

mod store_tests;

use camino::Utf8PathBuf;
use tempfile::TempDir;

/// Creates a temporary directory and returns it with its UTF-8 path.
fn temp_workspace() -> eyre::Result<(TempDir, Utf8PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .map_err(|path| eyre::eyre!("non UTF-8 temp dir: {}", path.display()))?;
    Ok((dir, path))
}
