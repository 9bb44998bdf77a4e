use crate::model::Pet;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("{0:?} can't be used as a pet name")]
    InvalidName(String),

    #[error("could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a pet save: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) type StorageResult<T> = Result<T, StorageError>;

/// Pet names double as file stems.
pub(crate) fn validate_name(name: &str) -> StorageResult<&str> {
    let name = name.trim();
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// A directory of `<name>.json` pet saves.
#[derive(Clone, Debug)]
pub(crate) struct SaveDir {
    dir: PathBuf,
}

impl SaveDir {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub(crate) fn path_for(&self, name: &str) -> StorageResult<PathBuf> {
        let name = validate_name(name)?;
        Ok(self.dir.join(format!("{name}.json")))
    }

    /// `Ok(None)` means no pet by that name has been saved yet.
    pub(crate) fn load(&self, name: &str) -> StorageResult<Option<Pet>> {
        let path = self.path_for(name)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no save found");
                return Ok(None);
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        let mut pet: Pet = match serde_json::from_str(&text) {
            Ok(pet) => pet,
            Err(source) => return Err(StorageError::Corrupt { path, source }),
        };
        // The file name is the key, whatever the record says.
        pet.name = validate_name(name)?.to_string();
        info!(path = %path.display(), "loaded pet");
        Ok(Some(pet))
    }

    pub(crate) fn save(&self, pet: &Pet) -> StorageResult<()> {
        let path = self.path_for(&pet.name)?;
        let io_err = |source: io::Error| StorageError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let data = serde_json::to_vec_pretty(pet).map_err(|source| StorageError::Corrupt {
            path: path.clone(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(io_err)?;
        if let Err(e) = atomic_rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(e));
        }
        info!(path = %path.display(), "saved pet");
        Ok(())
    }
}

fn atomic_rename(from: &Path, to: &Path) -> io::Result<()> {
    // rename() replaces the target atomically on the same filesystem.
    fs::rename(from, to)
}
