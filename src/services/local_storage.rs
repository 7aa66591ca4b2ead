//! src/services/local_storage.rs
//!
//! LocalStorage: the filesystem backend. Objects live at `{root}/{key}` where
//! the root is chosen by visibility; there is no metadata store, so the root
//! that holds a file *is* the object's visibility. Writes stream into a
//! temporary file next to the destination and are renamed into place, so
//! readers never observe a partially written object.

use crate::{
    models::{BaseUrl, InvalidKey, ObjectKey, Visibility},
    services::{
        key_locks::KeyLocks,
        storage::{
            ByteStream, SignedUrlBuilder, SignerError, Storage, StorageError, StorageResult,
        },
    },
};
use async_trait::async_trait;
use futures::StreamExt;
use std::{
    collections::HashMap,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

/// Filesystem backend over one root directory per visibility class.
#[derive(Clone)]
pub struct LocalStorage {
    /// Canonical root directory for each visibility.
    roots: Arc<HashMap<Visibility, PathBuf>>,

    /// Prefix for permanent URLs of public objects.
    public_base_url: BaseUrl,

    /// Issues expiring links for private objects; supplied by the HTTP layer.
    url_builder: Arc<dyn SignedUrlBuilder>,

    /// Serializes the rename-and-cleanup steps of writers on the same key.
    locks: Arc<KeyLocks>,
}

impl LocalStorage {
    /// Create both roots if needed and build the backend.
    ///
    /// Roots are canonicalized up front so that containment checks compare
    /// against absolute, symlink-free paths.
    pub async fn new(
        public_root: impl AsRef<Path>,
        private_root: impl AsRef<Path>,
        public_base_url: BaseUrl,
        url_builder: Arc<dyn SignedUrlBuilder>,
    ) -> io::Result<Self> {
        let mut roots = HashMap::new();
        for (visibility, root) in [
            (Visibility::PublicRead, public_root.as_ref()),
            (Visibility::Private, private_root.as_ref()),
        ] {
            fs::create_dir_all(root).await?;
            roots.insert(visibility, fs::canonicalize(root).await?);
        }

        Ok(Self {
            roots: Arc::new(roots),
            public_base_url,
            url_builder,
            locks: Arc::new(KeyLocks::default()),
        })
    }

    /// Root directory for a visibility class.
    pub fn root(&self, visibility: Visibility) -> &Path {
        // Every variant is inserted by `new`.
        &self.roots[&visibility]
    }

    /// Where `key` would live under `visibility`. The file may not exist.
    pub fn object_path(&self, key: &ObjectKey, visibility: Visibility) -> PathBuf {
        self.root(visibility).join(key.to_relative_path())
    }

    fn public_url(&self, key: &ObjectKey) -> String {
        self.public_base_url.join_key(key).into()
    }

    /// Resolve an existing object file under one root.
    ///
    /// Returns `None` when nothing (or only a directory) is there, and
    /// `InvalidKey` when a symlink makes the key resolve outside the root.
    async fn locate_in(
        &self,
        key: &ObjectKey,
        visibility: Visibility,
    ) -> StorageResult<Option<PathBuf>> {
        let path = self.object_path(key, visibility);
        let resolved = match fs::canonicalize(&path).await {
            Ok(resolved) => resolved,
            Err(err) if is_missing(&err) => return Ok(None),
            Err(err) => return Err(StorageError::Read(err)),
        };
        if !resolved.starts_with(self.root(visibility)) {
            return Err(InvalidKey::EscapesRoot.into());
        }
        match fs::metadata(&resolved).await {
            Ok(meta) if meta.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(err) if is_missing(&err) => Ok(None),
            Err(err) => Err(StorageError::Read(err)),
        }
    }

    /// Find which root holds `key`.
    async fn locate(&self, key: &ObjectKey) -> StorageResult<Option<(Visibility, PathBuf)>> {
        for visibility in Visibility::ALL {
            if let Some(path) = self.locate_in(key, visibility).await? {
                return Ok(Some((visibility, path)));
            }
        }
        Ok(None)
    }

    async fn require(&self, key: &ObjectKey) -> StorageResult<(Visibility, PathBuf)> {
        self.locate(key)
            .await?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    /// Create the parent directory of `key` under `visibility` and return it
    /// with the destination path.
    ///
    /// The deepest ancestor that already exists is resolved and must lie
    /// inside the root before any directory is created, so a symlinked
    /// segment cannot make a write land elsewhere.
    async fn prepare_destination(
        &self,
        key: &ObjectKey,
        visibility: Visibility,
    ) -> StorageResult<(PathBuf, PathBuf)> {
        let root = self.root(visibility);
        let file_path = self.object_path(key, visibility);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StorageError::Write(io::Error::other("object path missing parent directory"))
        })?;

        let mut existing = parent.as_path();
        let resolved = loop {
            match fs::canonicalize(existing).await {
                Ok(resolved) => break resolved,
                Err(err) if is_missing(&err) && existing != root => {
                    existing = existing.parent().unwrap_or(root);
                }
                Err(err) => return Err(StorageError::Write(err)),
            }
        };
        if !resolved.starts_with(root) {
            return Err(InvalidKey::EscapesRoot.into());
        }

        if existing != parent {
            fs::create_dir_all(&parent)
                .await
                .map_err(StorageError::Write)?;
        }
        Ok((parent, file_path))
    }

    /// Create a temp file beside the destination. A concurrent delete may
    /// prune the parent between preparing and creating, so that is retried
    /// once.
    async fn create_temp(
        &self,
        key: &ObjectKey,
        visibility: Visibility,
    ) -> StorageResult<(File, PathBuf, PathBuf)> {
        let (parent, file_path) = self.prepare_destination(key, visibility).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let file = match File::create(&tmp_path).await {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("{} vanished, recreating", parent.display());
                self.prepare_destination(key, visibility).await?;
                File::create(&tmp_path)
                    .await
                    .map_err(StorageError::Write)?
            }
            Err(err) => return Err(StorageError::Write(err)),
        };
        Ok((file, tmp_path, file_path))
    }

    /// Remove a file and prune the directories it leaves empty.
    async fn remove_object_file(&self, path: &Path, visibility: Visibility) -> StorageResult<()> {
        match fs::remove_file(path).await {
            Ok(_) => debug!("removed physical file {}", path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("file {} already missing", path.display());
            }
            Err(err) => return Err(StorageError::Write(err)),
        }
        if let Some(parent) = path.parent() {
            self.prune_empty_dirs(parent, self.root(visibility)).await;
        }
        Ok(())
    }

    /// Recursively remove empty directories up to (not including) the root.
    ///
    /// Stops when:
    /// - directory not empty
    /// - directory not found
    /// - reached root
    /// - encountered unexpected I/O errors
    async fn prune_empty_dirs(&self, start: &Path, stop: &Path) {
        let mut current = start.to_path_buf();
        while current.starts_with(stop) && current != stop {
            match fs::remove_dir(&current).await {
                Ok(_) => {
                    if let Some(parent) = current.parent() {
                        current = parent.to_path_buf();
                    } else {
                        break;
                    }
                }
                Err(err) if err.kind() == ErrorKind::NotFound => break,
                Err(err) if err.kind() == ErrorKind::DirectoryNotEmpty => break,
                Err(err) => {
                    debug!("failed to prune directory {}: {}", current.display(), err);
                    break;
                }
            }
        }
    }

    /// Drop copies of `key` held by roots other than `keep`.
    async fn remove_other_copies(&self, key: &ObjectKey, keep: Visibility) -> StorageResult<()> {
        for visibility in Visibility::ALL.into_iter().filter(|v| *v != keep) {
            if let Some(stale) = self.locate_in(key, visibility).await? {
                debug!("dropping {} copy of {}", visibility, key);
                self.remove_object_file(&stale, visibility).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    /// Stream-upload an object to disk.
    ///
    /// - Writes bytes incrementally to a temporary file.
    /// - Flushes and fsyncs before the rename.
    /// - Under the key lock, atomically renames into the final location and
    ///   drops the copy in the other root (last writer wins).
    ///
    /// Temp files are removed on every error path.
    async fn put(
        &self,
        key: &ObjectKey,
        data: ByteStream,
        visibility: Visibility,
    ) -> StorageResult<()> {
        let (file, tmp_path, file_path) = self.create_temp(key, visibility).await?;

        if let Err(err) = write_stream(file, data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Write(err));
        }

        let _guard = self.locks.lock(key).await;
        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path)
                    .await
                    .map_err(StorageError::Write)?;
                fs::rename(&tmp_path, &file_path)
                    .await
                    .map_err(StorageError::Write)?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StorageError::Write(err));
            }
        }
        debug!("stored {} object {}", visibility, key);

        self.remove_other_copies(key, visibility).await
    }

    async fn get(&self, key: &ObjectKey) -> StorageResult<ByteStream> {
        let (_, path) = self.require(key).await?;
        let file = File::open(&path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::Read(err)
            }
        })?;
        Ok(ReaderStream::new(file).boxed())
    }

    async fn delete(&self, key: &ObjectKey) -> StorageResult<()> {
        let _guard = self.locks.lock(key).await;
        let (visibility, path) = self.require(key).await?;
        self.remove_object_file(&path, visibility).await
    }

    async fn visibility(&self, key: &ObjectKey) -> StorageResult<Visibility> {
        self.require(key).await.map(|(visibility, _)| visibility)
    }

    /// Move the file between roots. A plain rename when both roots share a
    /// filesystem, otherwise copy into a temp file beside the destination and
    /// rename that.
    async fn set_visibility(
        &self,
        key: &ObjectKey,
        visibility: Visibility,
    ) -> StorageResult<()> {
        let _guard = self.locks.lock(key).await;
        let (current, source) = self.require(key).await?;
        if current == visibility {
            return Ok(());
        }
        let (parent, destination) = self.prepare_destination(key, visibility).await?;

        if let Err(err) = fs::rename(&source, &destination).await {
            debug!(
                "rename {} -> {} failed ({}), copying instead",
                source.display(),
                destination.display(),
                err
            );
            let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
            let copied = async {
                fs::copy(&source, &tmp_path).await?;
                fs::rename(&tmp_path, &destination).await
            }
            .await;
            if let Err(err) = copied {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StorageError::Write(err));
            }
        }
        debug!("moved {} from {} to {}", key, current, visibility);

        // After a rename the source is already gone and this only prunes.
        self.remove_object_file(&source, current).await
    }

    async fn url(&self, key: &ObjectKey) -> StorageResult<String> {
        match self.require(key).await? {
            (Visibility::PublicRead, _) => Ok(self.public_url(key)),
            (visibility, _) => Err(StorageError::NotApplicable {
                key: key.to_string(),
                visibility,
            }),
        }
    }

    async fn temporary_url(&self, key: &ObjectKey, ttl: Duration) -> StorageResult<String> {
        if ttl.is_zero() {
            return Err(StorageError::InvalidArgument(
                "ttl must be a positive duration".into(),
            ));
        }
        match self.require(key).await? {
            (Visibility::Private, path) => {
                self.url_builder
                    .build(&path, key, ttl)
                    .map_err(|err| match err {
                        SignerError::TtlOutOfRange => {
                            StorageError::InvalidArgument(err.to_string())
                        }
                        other => other.into(),
                    })
            }
            (visibility, _) => Err(StorageError::NotApplicable {
                key: key.to_string(),
                visibility,
            }),
        }
    }
}

async fn write_stream(mut file: File, mut data: ByteStream) -> io::Result<()> {
    while let Some(chunk) = data.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    file.sync_all().await
}

fn is_missing(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        signature::{SignatureVerifier, SigningKey, VerifyError},
        url_signer::UrlSigner,
    };
    use bytes::Bytes;
    use chrono::Utc;
    use futures::stream;
    use tempfile::TempDir;

    const BASE_URL: &str = "http://localhost:3000/public/";
    const SIGNED_BASE: &str = "http://localhost:3000/private";

    fn signing_key() -> SigningKey {
        SigningKey::new("local-storage-test-secret").unwrap()
    }

    async fn storage(dir: &TempDir) -> LocalStorage {
        let signer = UrlSigner::new(signing_key(), BaseUrl::parse(SIGNED_BASE).unwrap());
        LocalStorage::new(
            dir.path().join("public"),
            dir.path().join("private"),
            BaseUrl::parse(BASE_URL).unwrap(),
            Arc::new(signer),
        )
        .await
        .unwrap()
    }

    fn body(content: &'static str) -> ByteStream {
        stream::iter(vec![Ok(Bytes::from_static(content.as_bytes()))]).boxed()
    }

    async fn read_all(mut data: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = data.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    fn key(raw: &str) -> ObjectKey {
        ObjectKey::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let key = key("user-files/sample.txt");

        storage
            .put(&key, body("Hello, this is content"), Visibility::PublicRead)
            .await
            .unwrap();

        let content = read_all(storage.get(&key).await.unwrap()).await;
        assert_eq!(content, b"Hello, this is content");
        assert!(dir.path().join("public/user-files/sample.txt").is_file());
    }

    #[tokio::test]
    async fn chunked_streams_are_concatenated() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let key = key("chunks.bin");
        let chunks = stream::iter(vec![
            Ok(Bytes::from_static(b"ab")),
            Ok(Bytes::from_static(b"")),
            Ok(Bytes::from_static(b"cd")),
        ])
        .boxed();

        storage.put(&key, chunks, Visibility::Private).await.unwrap();
        assert_eq!(read_all(storage.get(&key).await.unwrap()).await, b"abcd");
    }

    #[tokio::test]
    async fn get_before_put_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;

        assert!(matches!(
            storage.get(&key("missing.txt")).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.url(&key("missing.txt")).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn second_put_overwrites() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let key = key("notes/today.md");

        storage.put(&key, body("first"), Visibility::PublicRead).await.unwrap();
        storage.put(&key, body("second"), Visibility::PublicRead).await.unwrap();

        assert_eq!(read_all(storage.get(&key).await.unwrap()).await, b"second");
    }

    #[tokio::test]
    async fn failed_stream_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let key = key("broken/upload.bin");
        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(ErrorKind::ConnectionReset, "client went away")),
        ])
        .boxed();

        let result = storage.put(&key, failing, Visibility::PublicRead).await;
        assert!(matches!(result, Err(StorageError::Write(_))));
        assert!(matches!(
            storage.get(&key).await,
            Err(StorageError::NotFound(_))
        ));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("public/broken"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn public_url_is_joined_once_and_stable() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let key = key("user-files/sample.txt");
        storage
            .put(&key, body("Hello, this is content"), Visibility::PublicRead)
            .await
            .unwrap();

        let first = storage.url(&key).await.unwrap();
        let second = storage.url(&key).await.unwrap();
        assert_eq!(first, "http://localhost:3000/public/user-files/sample.txt");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn private_objects_have_no_permanent_url() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let key = key("secret.txt");
        storage.put(&key, body("shh"), Visibility::Private).await.unwrap();

        assert!(matches!(
            storage.url(&key).await,
            Err(StorageError::NotApplicable {
                visibility: Visibility::Private,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn temporary_url_verifies_until_expiry() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let key = key("user-files/sample.txt");
        storage
            .put(&key, body("Hello, this is content"), Visibility::Private)
            .await
            .unwrap();

        let before = Utc::now().timestamp() as u64;
        let url = storage
            .temporary_url(&key, Duration::from_secs(60))
            .await
            .unwrap();
        let after = Utc::now().timestamp() as u64;

        let rest = url.strip_prefix("http://localhost:3000").unwrap();
        let (path, query) = rest.split_once('?').unwrap();
        assert_eq!(path, "/private/user-files/sample.txt");

        let expire_at: u64 = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("expireAt="))
            .unwrap()
            .parse()
            .unwrap();
        assert!((before + 60..=after + 60).contains(&expire_at));

        let verifier = SignatureVerifier::new(signing_key(), Duration::ZERO);
        assert_eq!(verifier.verify_at(path, Some(query), after), Ok(()));
        assert_eq!(
            verifier.verify_at(path, Some(query), expire_at + 1),
            Err(VerifyError::Expired)
        );
    }

    #[tokio::test]
    async fn temporary_url_argument_checks() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let public = key("open.txt");
        let private = key("closed.txt");
        storage.put(&public, body("o"), Visibility::PublicRead).await.unwrap();
        storage.put(&private, body("c"), Visibility::Private).await.unwrap();

        assert!(matches!(
            storage.temporary_url(&private, Duration::ZERO).await,
            Err(StorageError::InvalidArgument(_))
        ));
        assert!(matches!(
            storage.temporary_url(&public, Duration::from_secs(5)).await,
            Err(StorageError::NotApplicable { .. })
        ));
        assert!(matches!(
            storage.temporary_url(&key("nope"), Duration::from_secs(5)).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.temporary_url(&private, Duration::MAX).await,
            Err(StorageError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn put_with_new_visibility_moves_the_object() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let key = key("docs/report.pdf");

        storage.put(&key, body("v1"), Visibility::PublicRead).await.unwrap();
        storage.put(&key, body("v2"), Visibility::Private).await.unwrap();

        assert_eq!(storage.visibility(&key).await.unwrap(), Visibility::Private);
        assert!(!dir.path().join("public/docs").exists());
        assert_eq!(read_all(storage.get(&key).await.unwrap()).await, b"v2");
    }

    #[tokio::test]
    async fn set_visibility_moves_between_roots() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let key = key("a/b/c.txt");
        storage.put(&key, body("data"), Visibility::Private).await.unwrap();

        storage
            .set_visibility(&key, Visibility::PublicRead)
            .await
            .unwrap();

        assert_eq!(
            storage.visibility(&key).await.unwrap(),
            Visibility::PublicRead
        );
        assert!(dir.path().join("public/a/b/c.txt").is_file());
        assert!(!dir.path().join("private/a").exists());
        assert!(storage.url(&key).await.is_ok());

        storage
            .set_visibility(&key, Visibility::PublicRead)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_removes_file_and_empty_parents() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let target = key("deep/nested/file.txt");
        let sibling = key("deep/keep.txt");
        storage.put(&target, body("x"), Visibility::PublicRead).await.unwrap();
        storage.put(&sibling, body("y"), Visibility::PublicRead).await.unwrap();

        storage.delete(&target).await.unwrap();

        assert!(!dir.path().join("public/deep/nested").exists());
        assert!(dir.path().join("public/deep/keep.txt").is_file());
        assert!(dir.path().join("public").is_dir());
        assert!(matches!(
            storage.delete(&target).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn directories_are_not_objects() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        storage
            .put(&key("folder/file.txt"), body("x"), Visibility::PublicRead)
            .await
            .unwrap();

        assert!(matches!(
            storage.get(&key("folder")).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.get(&key("folder/file.txt/child")).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_out_of_the_root_are_rejected() {
        let dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("passwd"), b"root:x:0:0").unwrap();
        let storage = storage(&dir).await;
        std::os::unix::fs::symlink(outside.path(), dir.path().join("public/escape")).unwrap();

        assert!(matches!(
            storage.get(&key("escape/passwd")).await,
            Err(StorageError::InvalidKey(InvalidKey::EscapesRoot))
        ));
        assert!(matches!(
            storage
                .put(&key("escape/new.txt"), body("x"), Visibility::PublicRead)
                .await,
            Err(StorageError::InvalidKey(InvalidKey::EscapesRoot))
        ));
        assert!(!outside.path().join("new.txt").exists());

        // nested keys must not create directories behind the link either
        assert!(matches!(
            storage
                .put(
                    &key("escape/made/by/put/x.txt"),
                    body("x"),
                    Visibility::PublicRead
                )
                .await,
            Err(StorageError::InvalidKey(InvalidKey::EscapesRoot))
        ));
        assert!(!outside.path().join("made").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_across_roots_keep_one_copy() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir).await;
        let key = key("race/object.txt");

        for _ in 0..100 {
            let public = {
                let (storage, key) = (storage.clone(), key.clone());
                tokio::spawn(async move {
                    storage.put(&key, body("pub"), Visibility::PublicRead).await
                })
            };
            let private = {
                let (storage, key) = (storage.clone(), key.clone());
                tokio::spawn(async move {
                    storage.put(&key, body("priv"), Visibility::Private).await
                })
            };
            public.await.unwrap().unwrap();
            private.await.unwrap().unwrap();

            let visibility = storage.visibility(&key).await.unwrap();
            let content = read_all(storage.get(&key).await.unwrap()).await;
            let expected: &[u8] = match visibility {
                Visibility::PublicRead => b"pub",
                Visibility::Private => b"priv",
            };
            assert_eq!(content, expected);
            let other = match visibility {
                Visibility::PublicRead => Visibility::Private,
                Visibility::Private => Visibility::PublicRead,
            };
            assert!(!storage.object_path(&key, other).exists());
        }
    }
}
