//! MessagePack storage for built trees.
//!
//! Trees are filed by the order of magnitude of their simulation count:
//! a tree built with 20 000 simulations lives in `tree_1e4.msgpack`.

use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use ucb_core::GameState;
use ucb_mcts::{SearchError, Tree};

/// Errors from reading or writing stored trees.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode tree: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Failed to decode tree: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("Corrupt tree in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: SearchError,
    },
}

/// `floor(log10(simulations))`, with 0 for fewer than 10 simulations.
pub fn magnitude(simulations: usize) -> u32 {
    simulations.checked_ilog10().unwrap_or(0)
}

/// File name for a tree built with `simulations` simulations.
pub fn file_name(simulations: usize) -> String {
    format!("tree_1e{}.msgpack", magnitude(simulations))
}

/// Directory of trees keyed by simulation magnitude.
#[derive(Debug, Clone)]
pub struct TreeStore {
    dir: PathBuf,
}

impl TreeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a tree of `simulations` simulations is stored.
    pub fn path_for(&self, simulations: usize) -> PathBuf {
        self.dir.join(file_name(simulations))
    }

    /// Write `tree`, replacing any tree of the same magnitude.
    pub fn save<S>(&self, tree: &Tree<S>, simulations: usize) -> Result<PathBuf, StoreError>
    where
        S: GameState + Serialize,
        S::Move: Serialize,
    {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let path = self.path_for(simulations);
        let file = File::create(&path).map_err(io_err(&path))?;
        let mut writer = BufWriter::new(file);
        // Named fields so the file stays readable by other MessagePack tools
        rmp_serde::encode::write_named(&mut writer, tree)?;
        writer.flush().map_err(io_err(&path))?;

        info!(path = %path.display(), nodes = tree.len(), "tree saved");
        Ok(path)
    }

    /// Read the tree stored for the magnitude of `simulations`.
    ///
    /// The arena links are checked before the tree is returned.
    pub fn load<S>(&self, simulations: usize) -> Result<Tree<S>, StoreError>
    where
        S: GameState + DeserializeOwned,
        S::Move: DeserializeOwned,
    {
        let path = self.path_for(simulations);
        let file = File::open(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let tree: Tree<S> = rmp_serde::from_read(BufReader::new(file))?;
        tree.validate().map_err(|source| StoreError::Corrupt {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), nodes = tree.len(), "tree loaded");
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use ucb_mcts::{games::TicTacToe, MctsConfig, RandomPolicy, SearchEngine};

    fn build(simulations: usize) -> Tree<TicTacToe> {
        let policy = RandomPolicy::new(ChaCha8Rng::seed_from_u64(42));
        let mut engine = SearchEngine::new(MctsConfig::with_simulations(simulations), policy);
        engine.build_tree(TicTacToe::new(), simulations).unwrap();
        engine.take_tree().unwrap()
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(magnitude(0), 0);
        assert_eq!(magnitude(1), 0);
        assert_eq!(magnitude(9), 0);
        assert_eq!(magnitude(10), 1);
        assert_eq!(magnitude(999), 2);
        assert_eq!(magnitude(1_000), 3);
        assert_eq!(magnitude(100_000), 5);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(1_000), "tree_1e3.msgpack");
        assert_eq!(file_name(25_000), "tree_1e4.msgpack");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TreeStore::new(dir.path().join("trees"));
        let tree = build(500);

        let path = store.save(&tree, 500).unwrap();
        assert_eq!(path, dir.path().join("trees").join("tree_1e2.msgpack"));

        let restored: Tree<TicTacToe> = store.load(500).unwrap();
        assert_eq!(restored.len(), tree.len());
        for ((_, a), (_, b)) in tree.iter().zip(restored.iter()) {
            assert_eq!(a.stats(), b.stats());
            assert_eq!(a.children(), b.children());
        }
        assert_eq!(restored.dump(), tree.dump());
    }

    #[test]
    fn test_same_magnitude_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = TreeStore::new(dir.path());

        store.save(&build(100), 100).unwrap();
        store.save(&build(300), 300).unwrap();

        let restored: Tree<TicTacToe> = store.load(150).unwrap();
        assert_eq!(restored.root().visits(), 300);
    }

    #[test]
    fn test_load_missing_tree() {
        let dir = tempfile::tempdir().unwrap();
        let store = TreeStore::new(dir.path());

        let result = store.load::<TicTacToe>(1_000);
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_load_corrupt_tree() {
        let dir = tempfile::tempdir().unwrap();
        let store = TreeStore::new(dir.path());
        fs::write(store.path_for(10), b"not a tree").unwrap();

        let result = store.load::<TicTacToe>(10);
        assert!(matches!(result, Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_load_rejects_inconsistent_tree() {
        #[derive(serde::Serialize)]
        struct Arena<N> {
            nodes: Vec<N>,
        }

        let dir = tempfile::tempdir().unwrap();
        let store = TreeStore::new(dir.path());
        let empty: Arena<u8> = Arena { nodes: Vec::new() };
        fs::write(store.path_for(10), rmp_serde::to_vec_named(&empty).unwrap()).unwrap();

        let result = store.load::<TicTacToe>(10);
        assert!(matches!(
            result,
            Err(StoreError::Corrupt {
                source: SearchError::CorruptTree(_),
                ..
            })
        ));
    }
}
