use std::{
    collections::BTreeMap,
    fmt, io,
    path::{Path, PathBuf},
};

/// A path-like handle to an on-disk storage location.
///
/// Creation is deferred: registering a folder records its path, and
/// [`create`](Folder::create) materializes the directory on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder(PathBuf);

impl Folder {
    /// Creates a handle for `path` without touching the filesystem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Creates the directory (and any missing parents).
    ///
    /// Idempotent: an already-existing directory is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.0)
    }

    /// The folder's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for Folder {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A registry mapping logical names to storage [`Folder`]s.
///
/// The reduction lifecycle registers one folder per persisted artifact
/// (training set, testing set, ...) and looks them up by name when the
/// artifact is read or written.
///
/// # Examples
///
/// ```
/// use rombus_sampling::Folders;
///
/// let mut folders = Folders::new();
/// folders.insert("training_set", "rom_data/training_set");
///
/// assert!(folders.contains("training_set"));
/// assert_eq!(folders.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Folders {
    entries: BTreeMap<String, Folder>,
}

impl Folders {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registers `path` under `name`, replacing any prior registration.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.insert(name.into(), Folder::new(path));
    }

    /// Returns the folder registered under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Folder> {
        self.entries.get(name)
    }

    /// Returns `true` if a folder is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of registered folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no folders are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
