//! Per-identifier detail fetcher over the document tree.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;

use bazaar_core::{AppRecord, Category, DeveloperRecord, EntityId, FetchError, UserRecord};
use bazaar_roster::DetailFetcher;

use crate::layout::category_dir;

/// Fetches one record per call by reading `<dir>/<id>.json`.
///
/// Idempotent and concurrency-safe: every call is an independent read. A
/// missing document is `Ok(None)`, an unreadable one is a backend error and
/// an unparsable one a decode error; the reconciler retries both on later
/// passes.
pub struct DocumentFetcher<E> {
    dir: PathBuf,
    _record: PhantomData<fn() -> E>,
}

impl<E> DocumentFetcher<E> {
    pub fn new(root: &Path, category: Category) -> Self {
        Self {
            dir: category_dir(root, category),
            _record: PhantomData,
        }
    }
}

impl DocumentFetcher<UserRecord> {
    pub fn users(root: &Path) -> Self {
        Self::new(root, Category::Users)
    }
}

impl DocumentFetcher<DeveloperRecord> {
    pub fn developers(root: &Path) -> Self {
        Self::new(root, Category::Developers)
    }
}

impl DocumentFetcher<AppRecord> {
    pub fn apps(root: &Path) -> Self {
        Self::new(root, Category::Apps(Default::default()))
    }
}

impl<E> DetailFetcher<E> for DocumentFetcher<E>
where
    E: DeserializeOwned + Send + Sync,
{
    fn fetch<'a>(&'a self, id: &'a EntityId) -> BoxFuture<'a, Result<Option<E>, FetchError>> {
        async move {
            let path = self.dir.join(format!("{id}.json"));
            match tokio::fs::read_to_string(&path).await {
                Ok(raw) => match serde_json::from_str(&raw) {
                    Ok(record) => Ok(Some(record)),
                    Err(err) => Err(FetchError::Decode {
                        id: id.clone(),
                        message: err.to_string(),
                    }),
                },
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(FetchError::Backend {
                    id: id.clone(),
                    message: err.to_string(),
                }),
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::Utc;
    use tempfile::TempDir;

    use crate::layout::{document_path, ensure_layout};

    use super::*;

    fn write_user(root: &Path, id: &str) {
        let user = UserRecord {
            id: EntityId::from(id),
            name: id.to_uppercase(),
            handle: id.to_string(),
            email: None,
            review_count: 3,
            joined_at: Utc::now(),
        };
        let path = document_path(root, Category::Users, &user.id);
        fs::write(path, serde_json::to_string_pretty(&user).expect("encode")).expect("write");
    }

    #[tokio::test]
    async fn fetch_returns_hydrated_record() {
        let root = TempDir::new().expect("root");
        ensure_layout(root.path()).expect("layout");
        write_user(root.path(), "u-1");

        let fetcher = DocumentFetcher::users(root.path());
        let record = fetcher
            .fetch(&EntityId::from("u-1"))
            .await
            .expect("fetch")
            .expect("record");
        assert_eq!(record.handle, "u-1");
        assert_eq!(record.review_count, 3);
    }

    #[tokio::test]
    async fn missing_document_is_none_not_an_error() {
        let root = TempDir::new().expect("root");
        ensure_layout(root.path()).expect("layout");

        let fetcher = DocumentFetcher::users(root.path());
        let record = fetcher.fetch(&EntityId::from("ghost")).await.expect("fetch");
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn malformed_document_is_a_decode_error() {
        let root = TempDir::new().expect("root");
        ensure_layout(root.path()).expect("layout");
        let path = document_path(root.path(), Category::Users, &EntityId::from("u-bad"));
        fs::write(path, "{ not json").expect("write");

        let fetcher = DocumentFetcher::<UserRecord>::users(root.path());
        let err = fetcher
            .fetch(&EntityId::from("u-bad"))
            .await
            .expect_err("decode failure");
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}
