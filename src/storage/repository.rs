//! A filesystem backed forum store
//!
//! The [`Repository`] binds a [`ForumStore`] to a JSON snapshot on disk.
//! Mutations go through [`Repository::store_mut`] and never touch the disk;
//! [`Repository::flush`] writes the snapshot when something changed.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::{
    domain::{Config, ForumStore, NewForum, Rating, RatingError},
    storage::snapshot::{self, SnapshotError},
};

/// Directory (under the root) holding configuration.
pub const CONFIG_DIR: &str = ".forum";

/// A forum store persisted to a JSON file.
///
/// Concurrent writers are not coordinated: the last flush wins.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    config: Config,
    store: ForumStore,
    saved_revision: u64,
}

impl Repository {
    /// Opens the store rooted at the given directory.
    ///
    /// Configuration is read from `.forum/config.toml`, falling back to the
    /// defaults if it is missing or invalid. A missing snapshot yields an
    /// empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read or decoded.
    pub fn open(root: PathBuf) -> Result<Self, LoadError> {
        let config = load_config(&root);
        let path = root.join(config.storage_file());

        let store = match fs::read_to_string(&path) {
            Ok(content) => {
                snapshot::from_json(&content).map_err(|source| LoadError::Snapshot {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No snapshot at {}, starting empty", path.display());
                ForumStore::new()
            }
            Err(source) => return Err(LoadError::Io { path, source }),
        };

        tracing::debug!(
            "Loaded {} forums from {}",
            store.forums().len(),
            path.display()
        );

        let saved_revision = store.revision();
        Ok(Self {
            root,
            config,
            store,
            saved_revision,
        })
    }

    /// The root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Where the snapshot is written.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.root.join(self.config.storage_file())
    }

    /// The in-memory store.
    #[must_use]
    pub const fn store(&self) -> &ForumStore {
        &self.store
    }

    /// Mutable access to the in-memory store.
    ///
    /// Changes are only persisted by [`Repository::flush`].
    pub const fn store_mut(&mut self) -> &mut ForumStore {
        &mut self.store
    }

    /// Whether the store changed since it was loaded or last flushed.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.store.revision() != self.saved_revision
    }

    /// Writes the snapshot if the store has unsaved changes.
    ///
    /// The snapshot is written to a temporary file next to the target and
    /// renamed into place. Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialised or written.
    pub fn flush(&mut self) -> Result<bool, FlushError> {
        if !self.is_dirty() {
            tracing::debug!("Nothing to flush");
            return Ok(false);
        }

        self.write()?;
        Ok(true)
    }

    /// Writes the snapshot whether or not anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialised or written.
    pub fn write(&mut self) -> Result<(), FlushError> {
        let path = self.path();
        let json = snapshot::to_json(&self.store, self.config.pretty)?;
        write_atomically(&path, json.as_bytes()).map_err(|source| FlushError::Io {
            path: path.clone(),
            source,
        })?;

        self.saved_revision = self.store.revision();
        tracing::debug!("Wrote snapshot to {}", path.display());
        Ok(())
    }

    /// Adds the starter forums to an empty store.
    ///
    /// Returns `false`, changing nothing, if the store already has forums.
    ///
    /// # Errors
    ///
    /// Returns an error if a starter rating is out of range.
    pub fn seed_defaults(&mut self) -> Result<bool, RatingError> {
        if !self.store.is_empty() {
            return Ok(false);
        }

        let seeds = DEFAULT_FORUMS
            .iter()
            .map(|(name, description, tags, rating)| {
                let new = NewForum {
                    name: (*name).to_string(),
                    description: (*description).to_string(),
                    tags: tags.iter().map(ToString::to_string).collect(),
                };
                Ok((new, Rating::new(*rating)?))
            })
            .collect::<Result<Vec<_>, RatingError>>()?;

        for (new, rating) in seeds {
            self.store.add_rated_forum(new, rating);
        }

        tracing::info!("Seeded {} starter forums", DEFAULT_FORUMS.len());
        Ok(true)
    }
}

const DEFAULT_FORUMS: &[(&str, &str, &[&str], f64)] = &[
    (
        "Web Development",
        "Discuss modern web development practices and technologies",
        &["React", "NextJS", "Frontend"],
        4.5,
    ),
    (
        "Machine Learning",
        "Share ML/AI knowledge and resources",
        &["AI", "Python", "Data Science"],
        4.8,
    ),
];

/// Location of the configuration file for the given root.
#[must_use]
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join("config.toml")
}

fn load_config(root: &Path) -> Config {
    let path = config_path(root);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Errors raised while opening a [`Repository`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The snapshot file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The snapshot path.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// The snapshot file could not be decoded.
    #[error("failed to load {}: {source}", path.display())]
    Snapshot {
        /// The snapshot path.
        path: PathBuf,
        /// Why decoding failed.
        source: SnapshotError,
    },
}

/// Errors raised while writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    /// The store could not be serialised.
    #[error("failed to serialise snapshot: {0}")]
    Json(#[from] serde_json::Error),
    /// The snapshot could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// The snapshot path.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{Id, NewDiscussion, NewNote, NewReply};

    fn setup_temp_repository() -> (TempDir, Repository) {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let path = tmp.path().to_path_buf();
        (tmp, Repository::open(path).unwrap())
    }

    fn new_forum() -> NewForum {
        NewForum {
            name: "X".to_string(),
            description: "Y".to_string(),
            tags: vec!["a".to_string()],
        }
    }

    #[test]
    fn missing_snapshot_opens_empty() {
        let (_tmp, repo) = setup_temp_repository();
        assert!(repo.store().is_empty());
        assert!(!repo.is_dirty());
        assert!(repo.path().ends_with("forum-storage.json"));
    }

    #[test]
    fn mutations_do_not_touch_disk_until_flush() {
        let (_tmp, mut repo) = setup_temp_repository();
        repo.store_mut().add_forum(new_forum());

        assert!(repo.is_dirty());
        assert!(!repo.path().exists());

        assert!(repo.flush().unwrap());
        assert!(repo.path().exists());
        assert!(!repo.is_dirty());
        assert!(!repo.flush().unwrap());
    }

    #[test]
    fn flush_then_reopen_round_trips() {
        let (tmp, mut repo) = setup_temp_repository();
        let store = repo.store_mut();
        let forum = store.add_forum(new_forum());
        let note = store
            .add_note(
                &forum,
                NewNote {
                    title: "T".to_string(),
                    content: "C".to_string(),
                    author: "Ann".to_string(),
                    author_id: "u1".to_string(),
                    attachments: Vec::new(),
                },
            )
            .unwrap();
        store
            .add_reply_to_note(
                &forum,
                &note,
                NewReply {
                    content: "R".to_string(),
                    author: "Bea".to_string(),
                    author_id: "u2".to_string(),
                    attachments: Vec::new(),
                },
            )
            .unwrap();
        store
            .add_discussion(&forum, NewDiscussion::default())
            .unwrap();
        repo.flush().unwrap();

        let reopened = Repository::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(reopened.store().forums(), repo.store().forums());
        assert_eq!(
            reopened.store().notifications(),
            repo.store().notifications()
        );
        assert_eq!(reopened.store().next_seq(), repo.store().next_seq());
    }

    #[test]
    fn write_creates_snapshot_for_clean_store() {
        let (_tmp, mut repo) = setup_temp_repository();
        repo.write().unwrap();

        let reopened = Repository::open(repo.root().to_path_buf()).unwrap();
        assert!(reopened.store().is_empty());
        assert!(repo.path().exists());
    }

    #[test]
    fn concurrent_flushes_leave_a_loadable_snapshot() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();

        let writers: Vec<_> = (0..4)
            .map(|_| {
                let root = root.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let mut repo = Repository::open(root.clone()).unwrap();
                        for _ in 0..20 {
                            repo.store_mut().add_forum(new_forum());
                        }
                        repo.flush().unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let repo = Repository::open(root).unwrap();
        assert!(!repo.store().is_empty());
        assert_eq!(repo.store().forums().len() % 20, 0);

        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name != "forum-storage.json")
            .collect();
        assert!(leftovers.is_empty(), "stray files: {leftovers:?}");
    }

    #[test]
    fn independent_repositories_coexist() {
        let (_a, mut first) = setup_temp_repository();
        let (_b, second) = setup_temp_repository();

        first.store_mut().add_forum(new_forum());

        assert_eq!(first.store().forums().len(), 1);
        assert!(second.store().is_empty());
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("forum-storage.json"), "{oops").unwrap();

        let error = Repository::open(tmp.path().to_path_buf()).unwrap_err();
        assert!(matches!(error, LoadError::Snapshot { .. }));
    }

    #[test]
    fn config_controls_storage_file() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.set_storage_file("community.json".to_string());
        config.pretty = false;
        fs::create_dir_all(tmp.path().join(CONFIG_DIR)).unwrap();
        config.save(&config_path(tmp.path())).unwrap();

        let mut repo = Repository::open(tmp.path().to_path_buf()).unwrap();
        repo.store_mut().add_forum(new_forum());
        repo.flush().unwrap();

        let written = fs::read_to_string(tmp.path().join("community.json")).unwrap();
        assert!(!written.contains('\n'));
        assert!(!tmp.path().join("forum-storage.json").exists());
    }

    #[test]
    fn seed_defaults_only_fills_empty_store() {
        let (_tmp, mut repo) = setup_temp_repository();
        assert!(repo.seed_defaults().unwrap());

        let forums = repo.store().forums();
        assert_eq!(forums.len(), 2);
        assert_eq!(forums[0].name, "Web Development");
        assert!((forums[1].rating.get() - 4.8).abs() < f64::EPSILON);

        assert!(!repo.seed_defaults().unwrap());
        assert_eq!(repo.store().forums().len(), 2);
    }

    #[test]
    fn unknown_forum_is_reported_not_ignored() {
        let (_tmp, mut repo) = setup_temp_repository();
        let result = repo
            .store_mut()
            .add_note(&Id::from("missing"), NewNote::default());

        assert!(result.is_err());
        assert!(!repo.is_dirty());
    }
}
