use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::TypeId;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::entity::Entity;
use crate::models::{Post, User};
use crate::provider::DataProvider;
use crate::{POSTS_FILE, USERS_FILE};
use data_error::{DataError, Result};

/// Packaged seed data, declared statically and resolved against a target
/// file by suffix match on the resource name.
const SEED_RESOURCES: &[(&str, &str)] = &[
    ("seeds/posts.json", include_str!("../seeds/posts.json")),
    ("seeds/users.json", include_str!("../seeds/users.json")),
];

/// Resolves an entity type to its backing file and hands back a bound
/// [`DataProvider`], seeding the file from packaged sample data on first
/// use. A fresh environment self-populates with deterministic records, so
/// the samples run without any setup step.
pub struct ProviderRepository {
    base_dir: PathBuf,
}

impl ProviderRepository {
    /// A repository storing backing files in the platform temp directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::temp_dir(),
        }
    }

    /// A repository storing backing files under `base_dir`.
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Construct a provider for `T`, creating its backing file from seed
    /// data when it does not exist yet.
    pub fn data_provider<T>(&self) -> Result<DataProvider<T>>
    where
        T: Entity + Serialize + DeserializeOwned + 'static,
    {
        let file_name = backing_file_name::<T>()?;
        let path = self.base_dir.join(file_name);

        if !path.exists() {
            self.seed(file_name, &path)?;
        }

        DataProvider::new(&path)
    }

    /// Copy the packaged seed resource matching `file_name` into `path`.
    ///
    /// When no resource matches, the file is left absent and provider
    /// construction fails downstream.
    fn seed(&self, file_name: &str, path: &Path) -> Result<()> {
        let seed = SEED_RESOURCES
            .iter()
            .find(|(name, _)| name.ends_with(file_name));

        if let Some((name, content)) = seed {
            fs::create_dir_all(&self.base_dir)?;
            fs_atomic_light::temp_and_move(content.as_bytes(), path)?;
            log::info!("Seeded {} from resource {}", path.display(), name);
        }

        Ok(())
    }
}

impl Default for ProviderRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed, closed mapping from entity type to backing-file name.
///
/// Deliberately not open for extension: an unknown type fails fast here
/// instead of producing an unseedable store.
fn backing_file_name<T: 'static>() -> Result<&'static str> {
    let type_id = TypeId::of::<T>();
    if type_id == TypeId::of::<Post>() {
        Ok(POSTS_FILE)
    } else if type_id == TypeId::of::<User>() {
        Ok(USERS_FILE)
    } else {
        Err(DataError::UnsupportedType(std::any::type_name::<T>()))
    }
}
