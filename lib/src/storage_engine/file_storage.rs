// lib/src/storage_engine/file_storage.rs

//! Disk storage for uploaded attachments.
//!
//! Uploads are written into a per-request staging directory first. Once the
//! owning request has been validated the batch is committed, which renames
//! every staged file into the public upload directory. A batch that is
//! discarded (or dropped without committing) leaves nothing behind.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use chrono::Utc;
use futures::{Stream, StreamExt};
use log::{debug, warn};
use rand::Rng;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use models::errors::{StaffError, StaffResult};
use models::StoredUploads;

/// Per-file size limit.
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// URL prefix under which committed uploads are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// The two attachment slots of a staff registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    ProfilePic,
    Certificates,
}

impl UploadField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "profilePic" => Some(UploadField::ProfilePic),
            "certificates" | "certificates[]" => Some(UploadField::Certificates),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadField::ProfilePic => "profilePic",
            UploadField::Certificates => "certificates",
        }
    }

    pub fn max_count(&self) -> usize {
        match self {
            UploadField::ProfilePic => 1,
            UploadField::Certificates => 10,
        }
    }
}

impl fmt::Display for UploadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `image/*` and `application/pdf`, ignoring parameters and case.
pub fn is_allowed_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("image", subtype)) => !subtype.is_empty(),
        _ => essence == "application/pdf",
    }
}

/// Lower-cased extension of `original_name` including the dot, or empty
/// when it has none or it is not plain alphanumeric.
fn extension_of(original_name: Option<&str>) -> String {
    original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// `<field>-<unix millis>-<9 random digits><.ext>`
fn generate_file_name(field: UploadField, original_name: Option<&str>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!(
        "{}-{}-{:09}{}",
        field.as_str(),
        Utc::now().timestamp_millis(),
        suffix,
        extension_of(original_name)
    )
}

/// Removes a file, treating "already absent" as success.
async fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path).await {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Root of the attachment storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    upload_dir: PathBuf,
    staging_dir: PathBuf,
    max_file_bytes: u64,
}

impl FileStorage {
    /// Creates both directories if they do not exist yet.
    pub async fn new(upload_dir: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>, max_file_bytes: u64) -> StaffResult<Self> {
        let upload_dir = upload_dir.into();
        let staging_dir = staging_dir.into();
        for dir in [&upload_dir, &staging_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                StaffError::storage(format!("Failed to create upload directory at {:?}: {}", dir, e))
            })?;
        }
        Ok(Self { upload_dir, staging_dir, max_file_bytes })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Starts a staging batch for one request.
    pub fn begin_batch(&self) -> UploadBatch {
        UploadBatch {
            staging_dir: self.staging_dir.join(Uuid::new_v4().to_string()),
            upload_dir: self.upload_dir.clone(),
            max_file_bytes: self.max_file_bytes,
            staged: Vec::new(),
            created: false,
            finished: false,
        }
    }

    /// Maps a stored public path (`/uploads/<name>`) onto the disk location.
    /// Anything that is not a single plain file name under the prefix is refused.
    pub fn resolve(&self, stored_path: &str) -> StaffResult<PathBuf> {
        let name = stored_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StaffError::validation(format!("Not an upload path: {}", stored_path)))?;
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => Ok(self.upload_dir.join(file)),
            _ => Err(StaffError::validation(format!("Not an upload path: {}", stored_path))),
        }
    }

    /// Deletes a previously stored file. A file that is already gone is not an error.
    pub async fn delete(&self, stored_path: &str) -> StaffResult<()> {
        let path = self.resolve(stored_path)?;
        remove_if_present(&path).await?;
        debug!("Deleted upload {:?}", path);
        Ok(())
    }

    /// Deletes every file in `uploads`, logging failures instead of returning them.
    pub async fn delete_all(&self, uploads: &StoredUploads) {
        for stored_path in uploads.paths() {
            if let Err(e) = self.delete(stored_path).await {
                warn!("Failed to delete upload {}: {}", stored_path, e);
            }
        }
    }
}

#[derive(Debug)]
struct StagedFile {
    field: UploadField,
    file_name: String,
}

/// Attachments staged by a single request.
#[derive(Debug)]
pub struct UploadBatch {
    staging_dir: PathBuf,
    upload_dir: PathBuf,
    max_file_bytes: u64,
    staged: Vec<StagedFile>,
    created: bool,
    finished: bool,
}

impl UploadBatch {
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Streams one attachment into the staging area.
    ///
    /// The content type is checked before anything is written. The size limit
    /// is checked per chunk, and a file that crosses it is removed again.
    pub async fn stage<S, E>(
        &mut self,
        field: UploadField,
        original_name: Option<&str>,
        content_type: Option<&str>,
        stream: S,
    ) -> StaffResult<()>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: fmt::Display,
    {
        let already = self.staged.iter().filter(|f| f.field == field).count();
        if already >= field.max_count() {
            return Err(StaffError::validation(format!(
                "Too many files for '{}' (at most {})",
                field,
                field.max_count()
            )));
        }
        if !content_type.is_some_and(is_allowed_content_type) {
            return Err(StaffError::validation("Only images and PDF files are allowed"));
        }

        if !self.created {
            fs::create_dir_all(&self.staging_dir).await?;
            self.created = true;
        }

        let file_name = generate_file_name(field, original_name);
        let path = self.staging_dir.join(&file_name);
        match self.write_limited(&path, stream).await {
            Ok(written) => {
                debug!("Staged {} ({} bytes) as {:?}", field, written, path);
                self.staged.push(StagedFile { field, file_name });
                Ok(())
            }
            Err(e) => {
                if let Err(cleanup) = remove_if_present(&path).await {
                    warn!("Failed to remove partial upload {:?}: {}", path, cleanup);
                }
                Err(e)
            }
        }
    }

    async fn write_limited<S, E>(&self, path: &Path, stream: S) -> StaffResult<u64>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: fmt::Display,
    {
        let mut stream = std::pin::pin!(stream);
        let mut file = fs::File::create(path).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| StaffError::validation(format!("Failed to read upload: {}", e)))?;
            written += chunk.len() as u64;
            if written > self.max_file_bytes {
                return Err(StaffError::validation(format!(
                    "File too large (limit is {} bytes)",
                    self.max_file_bytes
                )));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(written)
    }

    /// Moves every staged file into the upload directory and returns the
    /// public paths. If any move fails, the files already moved are removed
    /// and the rest of the batch is discarded.
    pub async fn commit(mut self) -> StaffResult<StoredUploads> {
        let mut uploads = StoredUploads::default();
        let mut moved: Vec<PathBuf> = Vec::new();
        let staged = std::mem::take(&mut self.staged);

        for file in &staged {
            let from = self.staging_dir.join(&file.file_name);
            let to = self.upload_dir.join(&file.file_name);
            if let Err(e) = move_file(&from, &to).await {
                for path in &moved {
                    if let Err(cleanup) = remove_if_present(path).await {
                        warn!("Failed to roll back committed upload {:?}: {}", path, cleanup);
                    }
                }
                self.discard().await;
                return Err(StaffError::storage(format!("Failed to commit upload {:?}: {}", to, e)));
            }
            moved.push(to);

            let public = format!("{}/{}", PUBLIC_PREFIX, file.file_name);
            match file.field {
                UploadField::ProfilePic => uploads.profile_pic = Some(public),
                UploadField::Certificates => uploads.certificates.push(public),
            }
        }

        self.remove_staging_dir().await;
        self.finished = true;
        Ok(uploads)
    }

    /// Removes everything staged by this batch.
    pub async fn discard(mut self) {
        if !self.staged.is_empty() {
            debug!("Discarding {} staged upload(s) in {:?}", self.staged.len(), self.staging_dir);
        }
        self.staged.clear();
        self.remove_staging_dir().await;
        self.finished = true;
    }

    async fn remove_staging_dir(&self) {
        if !self.created {
            return;
        }
        match fs::remove_dir_all(&self.staging_dir).await {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                warn!("Failed to remove staging directory {:?}: {}", self.staging_dir, e);
            }
            _ => {}
        }
    }
}

impl Drop for UploadBatch {
    fn drop(&mut self) {
        if !self.finished && self.created {
            if let Err(e) = std::fs::remove_dir_all(&self.staging_dir) {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove abandoned staging directory {:?}: {}", self.staging_dir, e);
                }
            }
        }
    }
}

/// Renames `from` to `to`, falling back to copy-and-delete across filesystems.
async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            fs::copy(from, to).await?;
            fs::remove_file(from).await
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::convert::Infallible;

    fn chunks(data: Vec<u8>) -> impl Stream<Item = Result<Bytes, Infallible>> {
        stream::iter(data.chunks(1024).map(|c| Ok(Bytes::copy_from_slice(c))).collect::<Vec<_>>())
    }

    async fn storage(root: &Path) -> FileStorage {
        FileStorage::new(root.join("uploads"), root.join("staging"), MAX_FILE_BYTES).await.unwrap()
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[test]
    fn should_accept_images_and_pdf_only() {
        assert!(is_allowed_content_type("image/png"));
        assert!(is_allowed_content_type("IMAGE/JPEG"));
        assert!(is_allowed_content_type("application/pdf; charset=binary"));
        assert!(!is_allowed_content_type("application/zip"));
        assert!(!is_allowed_content_type("text/plain"));
        assert!(!is_allowed_content_type("image/"));
    }

    #[test]
    fn should_generate_collision_resistant_names() {
        let name = generate_file_name(UploadField::ProfilePic, Some("Me.JPG"));
        assert!(name.starts_with("profilePic-"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(extension_of(Some("../../etc/passwd")), "");
        assert_eq!(extension_of(Some("weird.p$f")), "");
    }

    #[tokio::test]
    async fn should_commit_staged_files_into_upload_dir() {
        let root = tempfile::tempdir().unwrap();
        let files = storage(root.path()).await;
        let mut batch = files.begin_batch();
        batch.stage(UploadField::ProfilePic, Some("me.png"), Some("image/png"), chunks(vec![1; 10])).await.unwrap();
        batch.stage(UploadField::Certificates, Some("c.pdf"), Some("application/pdf"), chunks(vec![2; 10])).await.unwrap();

        let uploads = batch.commit().await.unwrap();
        let pic = uploads.profile_pic.clone().unwrap();
        assert!(pic.starts_with("/uploads/profilePic-"));
        assert_eq!(uploads.certificates.len(), 1);
        assert!(files.resolve(&pic).unwrap().exists());
        assert_eq!(entries(&root.path().join("uploads")), 2);
        assert_eq!(entries(&root.path().join("staging")), 0);
    }

    #[tokio::test]
    async fn should_reject_disallowed_type_without_writing() {
        let root = tempfile::tempdir().unwrap();
        let files = storage(root.path()).await;
        let mut batch = files.begin_batch();
        let err = batch
            .stage(UploadField::Certificates, Some("x.zip"), Some("application/zip"), chunks(vec![0; 10]))
            .await
            .unwrap_err();
        assert!(matches!(err, StaffError::Validation(_)));
        batch.discard().await;
        assert_eq!(entries(&root.path().join("staging")), 0);
    }

    #[tokio::test]
    async fn should_reject_oversized_file_and_remove_partial() {
        let root = tempfile::tempdir().unwrap();
        let files = FileStorage::new(root.path().join("uploads"), root.path().join("staging"), 2048).await.unwrap();
        let mut batch = files.begin_batch();
        let err = batch
            .stage(UploadField::ProfilePic, Some("big.png"), Some("image/png"), chunks(vec![0; 4096]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(batch.is_empty());
        batch.discard().await;
        assert_eq!(entries(&root.path().join("staging")), 0);
        assert_eq!(entries(&root.path().join("uploads")), 0);
    }

    #[tokio::test]
    async fn should_limit_profile_pictures_to_one() {
        let root = tempfile::tempdir().unwrap();
        let files = storage(root.path()).await;
        let mut batch = files.begin_batch();
        batch.stage(UploadField::ProfilePic, Some("a.png"), Some("image/png"), chunks(vec![1])).await.unwrap();
        let err = batch.stage(UploadField::ProfilePic, Some("b.png"), Some("image/png"), chunks(vec![1])).await;
        assert!(err.is_err());
        assert_eq!(batch.len(), 1);
    }

    #[tokio::test]
    async fn should_clean_up_abandoned_batch_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let files = storage(root.path()).await;
        {
            let mut batch = files.begin_batch();
            batch.stage(UploadField::ProfilePic, Some("a.png"), Some("image/png"), chunks(vec![1])).await.unwrap();
        }
        assert_eq!(entries(&root.path().join("staging")), 0);
    }

    #[tokio::test]
    async fn should_tolerate_deleting_absent_file() {
        let root = tempfile::tempdir().unwrap();
        let files = storage(root.path()).await;
        files.delete("/uploads/profilePic-1-000000001.png").await.unwrap();
        assert!(files.delete("/etc/passwd").await.is_err());
        assert!(files.delete("/uploads/../secret").await.is_err());
    }
}
