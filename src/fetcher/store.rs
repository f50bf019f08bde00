use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Where downloaded photos live.
///
/// Bodies are first staged, then either committed under their final name
/// or discarded, so a reader never sees a half-written photo.
pub trait PhotoStore: Send + Sync {
    /// Size of the committed photo, if there is one.
    fn existing_size(&self, filename: &str) -> Option<u64>;

    /// Write `body` to the staging slot for `filename`, returning the byte count.
    fn stage(&self, filename: &str, body: &mut dyn Read) -> io::Result<u64>;

    /// Move the staged body onto its final name.
    fn commit(&self, filename: &str) -> io::Result<()>;

    /// Drop whatever is staged for `filename`.
    fn discard(&self, filename: &str);

    /// Delete the committed photo for `filename`, if any.
    fn remove(&self, filename: &str) -> io::Result<()>;
}

/// Photos stored as plain files in one directory.
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the photo directory exists
    pub fn ensure_dir(&self) -> io::Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    fn staging_path(&self, filename: &str) -> PathBuf {
        self.root.join(format!("{}.part", filename))
    }
}

impl PhotoStore for DiskStore {
    fn existing_size(&self, filename: &str) -> Option<u64> {
        fs::metadata(self.path_for(filename))
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len())
    }

    fn stage(&self, filename: &str, body: &mut dyn Read) -> io::Result<u64> {
        self.ensure_dir()?;

        let file = File::create(self.staging_path(filename))?;
        let mut writer = BufWriter::new(file);
        let written = io::copy(body, &mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;

        Ok(written)
    }

    fn commit(&self, filename: &str) -> io::Result<()> {
        fs::rename(self.staging_path(filename), self.path_for(filename))
    }

    fn discard(&self, filename: &str) {
        let _ = fs::remove_file(self.staging_path(filename));
    }

    fn remove(&self, filename: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(filename)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
