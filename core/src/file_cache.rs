// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::{Item, LocalStore, StoreError};

const EXTENSION: &str = "json";

/// A [`LocalStore`] keeping one `<id>.json` file per item in a named list
/// directory under a cache root.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
    dir: PathBuf,
}

impl FileCache {
    /// Creates a cache for the list `name` under `root`. Nothing is touched on disk yet.
    pub fn new(root: impl Into<PathBuf>, name: &str) -> Result<Self, StoreError> {
        check_name(name)?;
        let root = root.into();
        let dir = root.join(name);
        Ok(Self { root, dir })
    }

    /// The list directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether an item with `id` is stored.
    pub async fn contains(&self, id: &str) -> Result<bool, StoreError> {
        Ok(fs::try_exists(self.path(id)?).await?)
    }

    /// Removes the whole list directory.
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_dir_all(&self.dir).await {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            result => Ok(result?),
        }
    }

    /// Names of every list directory under the cache root.
    pub async fn list_names(&self) -> Result<Vec<String>, StoreError> {
        let mut reader = match fs::read_dir(&self.root).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            if entry.file_type().await?.is_dir()
                && let Some(name) = entry.file_name().to_str()
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn path(&self, id: &str) -> Result<PathBuf, StoreError> {
        check_name(id)?;
        Ok(self.dir.join(format!("{id}.{EXTENSION}")))
    }

    async fn read(path: &Path) -> Result<Item, StoreError> {
        let bytes = fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Writes to a hidden sibling first, then renames it over the target.
    async fn write(&self, item: &Item) -> Result<(), StoreError> {
        let path = self.path(item.id())?;
        let tmp = self.dir.join(format!(".{}.{EXTENSION}.tmp", item.id()));
        let bytes = serde_json::to_vec_pretty(item)?;

        fs::create_dir_all(&self.dir).await?;
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl LocalStore for FileCache {
    #[tracing::instrument(skip(self, item), fields(id = item.id()))]
    async fn insert(&self, item: &Item) -> Result<(), StoreError> {
        if self.contains(item.id()).await? {
            return Err(StoreError::AlreadyExists(item.id().to_string()));
        }
        self.write(item).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<Item, StoreError> {
        let path = self.path(id)?;
        let item = match Self::read(&path).await {
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            // `load_all` never yields such an item, so nobody else can remove it
            Err(StoreError::Serde(err)) => {
                tracing::warn!(id, %err, "removing unreadable item file");
                fs::remove_file(&path).await?;
                return Err(StoreError::NotFound(id.to_string()));
            }
            result => result?,
        };
        fs::remove_file(&path).await?;
        Ok(item)
    }

    #[tracing::instrument(skip(self, item))]
    async fn update(&self, id: &str, item: &Item) -> Result<(), StoreError> {
        if !self.contains(id).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }
        if item.id() != id && self.contains(item.id()).await? {
            return Err(StoreError::AlreadyExists(item.id().to_string()));
        }

        self.write(item).await?;
        if item.id() != id {
            tracing::warn!(id, new_id = item.id(), "item id changed on update");
            fs::remove_file(self.path(id)?).await?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn load_all(&self) -> Result<Vec<Item>, StoreError> {
        let mut reader = match fs::read_dir(&self.dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut items = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let path = entry.path();
            let is_record = path.extension().is_some_and(|ext| ext == EXTENSION)
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_record {
                continue;
            }

            match Self::read(&path).await {
                Ok(item) => items.push(item),
                Err(err) => tracing::warn!(path = %path.display(), %err, "skipping invalid item file"),
            }
        }

        items.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        tracing::debug!(count = items.len(), "items loaded");
        Ok(items)
    }
}

fn check_name(name: &str) -> Result<(), StoreError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::Invalid(format!("unusable name: {name:?}")));
    }
    Ok(())
}
