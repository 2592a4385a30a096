use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Mutex;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::entity::Entity;
use data_error::{DataError, Result};

/// CRUD persistence for one entity type against one backing file.
///
/// The file holds a JSON array of records and is the sole source of truth:
/// every operation reopens and re-reads it, nothing is cached across calls.
/// Mutations are serialized by an instance-owned lock and persist as an
/// atomic full-file replacement, so concurrent readers observe either the
/// pre- or post-mutation contents, never a torn file.
///
/// Two provider instances bound to the same path are not supported; nothing
/// orders their mutations relative to each other.
pub struct DataProvider<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _entity: PhantomData<T>,
}

impl<T> DataProvider<T>
where
    T: Entity + Serialize + DeserializeOwned,
{
    /// Bind a provider to an existing backing file.
    ///
    /// The caller guarantees existence; a missing or empty path is an
    /// invalid argument, not a trigger for file creation.
    pub fn new(path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(DataError::InvalidArgument(
                "Backing file path is empty".to_owned(),
            ));
        }
        if !path.exists() {
            return Err(DataError::InvalidArgument(format!(
                "Backing file does not exist: {}",
                path.display()
            )));
        }

        Ok(Self {
            path: PathBuf::from(path),
            write_lock: Mutex::new(()),
            _entity: PhantomData,
        })
    }

    /// Read and deserialize the full backing file.
    ///
    /// A file with no content yields an empty vec; content that is present
    /// but not a valid array of the bound entity type is a format error.
    pub fn get_all(&self) -> Result<Vec<T>> {
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|err| {
            DataError::Format(format!("{}: {}", self.path.display(), err))
        })
    }

    /// Insert `item`, assigning it the next identifier.
    ///
    /// Any id the caller set on `item` is overwritten. Returns the
    /// assigned id.
    pub fn insert(&self, mut item: T) -> Result<i64> {
        let _guard = self.lock_writes();

        let mut items = self.get_all()?;
        let id = Self::next_id(&items);
        item.set_id(id);
        items.push(item);
        self.persist(&items)?;

        Ok(id)
    }

    /// Replace the entity with identifier `id` by `item`.
    ///
    /// `item` keeps the located entity's id regardless of what it carried
    /// in. When no entity matches, this is a silent no-op: idempotent
    /// convenience over strict validation, same as delete.
    pub fn update(&self, id: i64, mut item: T) -> Result<()> {
        let _guard = self.lock_writes();

        let mut items = self.get_all()?;
        let pos = match items.iter().position(|e| e.id() == id) {
            Some(pos) => pos,
            None => return Ok(()),
        };

        let existing = items.remove(pos);
        item.set_id(existing.id());
        items.push(item);
        self.persist(&items)
    }

    /// Remove every entity with identifier `id`.
    ///
    /// Uniqueness should make that at most one; removing all matches keeps
    /// the store consistent even if it does not. Silently succeeds when
    /// nothing matched.
    pub fn delete(&self, id: i64) -> Result<()> {
        let _guard = self.lock_writes();

        let mut items = self.get_all()?;
        items.retain(|e| e.id() != id);
        self.persist(&items)
    }

    /// Next identifier: one past the highest currently stored.
    ///
    /// Deletion never reclaims ids, so this only decreases if the current
    /// maximum is deleted first.
    fn next_id(items: &[T]) -> i64 {
        items.iter().map(|e| e.id()).max().unwrap_or(0) + 1
    }

    /// Write the full entity set back, replacing prior file contents.
    fn persist(&self, items: &[T]) -> Result<()> {
        let data = serde_json::to_vec_pretty(items)?;
        fs_atomic_light::temp_and_move(&data, &self.path)?;

        log::info!(
            "{} entities have been written to {}",
            items.len(),
            self.path.display()
        );
        Ok(())
    }

    fn lock_writes(&self) -> std::sync::MutexGuard<'_, ()> {
        // A poisoned lock means a writer panicked; the file itself is
        // still the source of truth, so the guard stays usable.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> DataProvider<T> {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tempdir::TempDir;

    use super::*;
    use crate::models::Post;

    fn empty_store(temp_dir: &TempDir) -> DataProvider<Post> {
        let path = temp_dir.path().join("posts.json");
        std::fs::write(&path, "[]").expect("Failed to create backing file");
        DataProvider::new(&path).expect("Failed to bind provider")
    }

    fn post(title: &str) -> Post {
        Post {
            id: 0,
            user_id: 1,
            title: title.to_string(),
            body: "body".to_string(),
        }
    }

    #[test]
    fn test_new_rejects_missing_file() {
        let temp_dir =
            TempDir::new("tmp").expect("Failed to create temporary directory");
        let missing = temp_dir.path().join("absent.json");

        let result = DataProvider::<Post>::new(&missing);
        assert!(matches!(result, Err(DataError::InvalidArgument(_))));

        let result = DataProvider::<Post>::new(Path::new(""));
        assert!(matches!(result, Err(DataError::InvalidArgument(_))));
    }

    #[test]
    fn test_insert_roundtrip() {
        let temp_dir =
            TempDir::new("tmp").expect("Failed to create temporary directory");
        let provider = empty_store(&temp_dir);

        let item = post("first");
        let id = provider.insert(item.clone()).unwrap();
        assert_eq!(id, 1);

        let all = provider.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].title, item.title);
        assert_eq!(all[0].body, item.body);
    }

    #[test]
    fn test_insert_overwrites_caller_id() {
        let temp_dir =
            TempDir::new("tmp").expect("Failed to create temporary directory");
        let provider = empty_store(&temp_dir);

        let mut item = post("sneaky");
        item.id = 999;
        let id = provider.insert(item).unwrap();

        assert_eq!(id, 1);
        assert_eq!(provider.get_all().unwrap()[0].id, 1);
    }

    #[test]
    fn test_ids_increment_from_max() {
        let temp_dir =
            TempDir::new("tmp").expect("Failed to create temporary directory");
        let provider = empty_store(&temp_dir);

        assert_eq!(provider.insert(post("a")).unwrap(), 1);
        assert_eq!(provider.insert(post("b")).unwrap(), 2);
        assert_eq!(provider.insert(post("c")).unwrap(), 3);

        // Deleting below the max does not renumber or reclaim
        provider.delete(2).unwrap();
        assert_eq!(provider.insert(post("d")).unwrap(), 4);

        let ids: Vec<i64> =
            provider.get_all().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_update_preserves_identity() {
        let temp_dir =
            TempDir::new("tmp").expect("Failed to create temporary directory");
        let provider = empty_store(&temp_dir);

        let id = provider.insert(post("original")).unwrap();

        let mut replacement = post("updated");
        replacement.id = 555;
        provider.update(id, replacement).unwrap();

        let all = provider.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].title, "updated");
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let temp_dir =
            TempDir::new("tmp").expect("Failed to create temporary directory");
        let provider = empty_store(&temp_dir);

        provider.insert(post("keep me")).unwrap();
        let before = provider.get_all().unwrap();

        provider
            .update(42, post("never stored"))
            .expect("Missing id must not be an error");

        assert_eq!(provider.get_all().unwrap(), before);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp_dir =
            TempDir::new("tmp").expect("Failed to create temporary directory");
        let provider = empty_store(&temp_dir);

        provider.insert(post("a")).unwrap();
        provider.insert(post("b")).unwrap();

        provider.delete(1).unwrap();
        let after_first = provider.get_all().unwrap();
        provider.delete(1).unwrap();
        let after_second = provider.get_all().unwrap();

        assert_eq!(after_first, after_second);
        assert_eq!(after_second.len(), 1);
        assert_eq!(after_second[0].id, 2);
    }

    #[test]
    fn test_get_all_empty_file() {
        let temp_dir =
            TempDir::new("tmp").expect("Failed to create temporary directory");
        let path = temp_dir.path().join("posts.json");
        std::fs::write(&path, "").unwrap();

        let provider: DataProvider<Post> = DataProvider::new(&path).unwrap();
        assert!(provider.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_get_all_malformed_content() {
        let temp_dir =
            TempDir::new("tmp").expect("Failed to create temporary directory");
        let path = temp_dir.path().join("posts.json");
        std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();

        let provider: DataProvider<Post> = DataProvider::new(&path).unwrap();
        assert!(matches!(
            provider.get_all(),
            Err(DataError::Format(_))
        ));
    }

    #[test_log::test]
    fn test_concurrent_inserts_no_duplicates_no_gaps() {
        let temp_dir =
            TempDir::new("tmp").expect("Failed to create temporary directory");
        let provider = Arc::new(empty_store(&temp_dir));

        const N: usize = 16;
        let mut handles = Vec::with_capacity(N);
        for i in 0..N {
            let provider = Arc::clone(&provider);
            handles.push(std::thread::spawn(move || {
                provider
                    .insert(post(&format!("post {}", i)))
                    .expect("Insert failed")
            }));
        }

        let mut assigned: Vec<i64> = handles
            .into_iter()
            .map(|h| h.join().expect("Insert thread panicked"))
            .collect();
        assigned.sort_unstable();
        assert_eq!(assigned, (1..=N as i64).collect::<Vec<_>>());

        let mut stored: Vec<i64> =
            provider.get_all().unwrap().iter().map(|p| p.id).collect();
        stored.sort_unstable();
        assert_eq!(stored, (1..=N as i64).collect::<Vec<_>>());
    }

    #[quickcheck_macros::quickcheck]
    fn prop_sequential_inserts_assign_dense_ids(titles: Vec<String>) -> bool {
        let temp_dir =
            TempDir::new("tmp").expect("Failed to create temporary directory");
        let provider = empty_store(&temp_dir);

        let assigned: Vec<i64> = titles
            .iter()
            .map(|t| provider.insert(post(t)).unwrap())
            .collect();

        assigned == (1..=titles.len() as i64).collect::<Vec<_>>()
    }
}
