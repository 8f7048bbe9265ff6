//! Label type persistence backends.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracing::debug;

use super::LabelTypeDef;
use crate::error::{EtiketError, Result};

/// Where label types live between sessions.
///
/// Implementations replace whole records; there is no field-level merge.
#[async_trait]
pub trait LabelTypeStore: Send + Sync {
    /// All stored types, built-ins excluded.
    async fn list(&self) -> Result<Vec<LabelTypeDef>>;

    /// Insert or replace the record with `def.id`.
    async fn save(&self, def: &LabelTypeDef) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

// ============================================================================
// JSON FILE
// ============================================================================

/// A JSON array of records in one file. A missing file is an empty store.
///
/// Saves and deletes are read-modify-write cycles serialised by `write_lock`,
/// so concurrent saves of different records all survive.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<LabelTypeDef>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                EtiketError::Registry(format!("{} is not valid: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(EtiketError::Registry(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Write to a uniquely named temp file next to the store, then rename it
    /// over the original.
    async fn write_all(&self, types: &[LabelTypeDef]) -> Result<()> {
        let json = serde_json::to_vec_pretty(types)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &json))
            .await
            .map_err(|e| EtiketError::Registry(format!("Label type write aborted: {}", e)))??;
        debug!(path = %self.path.display(), count = types.len(), "wrote label types");
        Ok(())
    }
}

fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_failed =
        |e: std::io::Error| EtiketError::Registry(format!("Failed to write {}: {}", path.display(), e));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(contents).map_err(write_failed)?;
    tmp.flush().map_err(write_failed)?;
    tmp.persist(path).map_err(|e| {
        EtiketError::Registry(format!("Failed to replace {}: {}", path.display(), e.error))
    })?;
    Ok(())
}

#[async_trait]
impl LabelTypeStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<LabelTypeDef>> {
        self.read_all().await
    }

    async fn save(&self, def: &LabelTypeDef) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut types = self.read_all().await?;
        match types.iter_mut().find(|t| t.id == def.id) {
            Some(existing) => *existing = def.clone(),
            None => types.push(def.clone()),
        }
        self.write_all(&types).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut types = self.read_all().await?;
        types.retain(|t| t.id.as_deref() != Some(id));
        self.write_all(&types).await
    }
}

// ============================================================================
// REST (PostgREST)
// ============================================================================

/// A PostgREST table, e.g. `https://db.example.com/rest/v1/label_types`.
///
/// Requests carry the key as both `apikey` and bearer token. Saves use
/// `Prefer: resolution=merge-duplicates` so a POST with an existing id
/// replaces that row.
pub struct RestStore {
    client: reqwest::Client,
    table_url: String,
    api_key: Option<String>,
}

impl RestStore {
    pub fn new(client: reqwest::Client, table_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            table_url: table_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            req = req.header("apikey", key).bearer_auth(key);
        }
        req
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(EtiketError::Registry(format!(
            "{} failed: HTTP {} {}",
            action,
            status.as_u16(),
            body.trim()
        )))
    }
}

fn request_failed(action: &str, e: reqwest::Error) -> EtiketError {
    EtiketError::Registry(format!("{} failed: {}", action, e))
}

#[async_trait]
impl LabelTypeStore for RestStore {
    async fn list(&self) -> Result<Vec<LabelTypeDef>> {
        let url = format!("{}?select=*&order=name", self.table_url);
        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(|e| request_failed("Listing label types", e))?;
        let response = Self::check(response, "Listing label types").await?;
        response
            .json::<Vec<LabelTypeDef>>()
            .await
            .map_err(|e| EtiketError::Registry(format!("Invalid label type list: {}", e)))
    }

    async fn save(&self, def: &LabelTypeDef) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, &self.table_url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(def)
            .send()
            .await
            .map_err(|e| request_failed("Saving label type", e))?;
        Self::check(response, "Saving label type").await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, &self.table_url)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(|e| request_failed("Deleting label type", e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EtiketError::Registry(format!("Unknown label type {:?}", id)));
        }
        Self::check(response, "Deleting label type").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FieldKey, FieldRule, FieldsConfig};
    use pretty_assertions::assert_eq;

    fn def(id: &str, name: &str) -> LabelTypeDef {
        LabelTypeDef {
            id: Some(id.into()),
            ..LabelTypeDef::new(name, FieldsConfig::default())
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("types.json"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_replace_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("types.json"));

        store.save(&def("a", "Raf")).await.unwrap();
        store.save(&def("b", "Koli")).await.unwrap();
        let mut replaced = def("a", "Raf 2");
        replaced.fields = replaced.fields.with(FieldKey::Barcode, FieldRule::HIDDEN);
        store.save(&replaced).await.unwrap();

        let types = store.list().await.unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[0], replaced);

        store.delete("a").await.unwrap();
        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Koli".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_keep_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(JsonFileStore::new(dir.path().join("types.json")));

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.save(&def(&format!("id-{}", i), &format!("Tip {}", i))).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let mut ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|t| t.id)
            .collect();
        ids.sort();
        let mut expected: Vec<String> = (0..20).map(|i| format!("id-{}", i)).collect();
        expected.sort();
        assert_eq!(ids, expected);

        // no temp files left behind
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_registry_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("types.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileStore::new(path).list().await.unwrap_err();
        assert!(matches!(err, EtiketError::Registry(_)));
    }

    #[tokio::test]
    async fn test_rest_delete_encodes_id() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\n\r\n")
                .await
                .unwrap();
            String::from_utf8_lossy(&request).lines().next().unwrap_or_default().to_string()
        });

        let store = RestStore::new(reqwest::Client::new(), format!("http://{}/label_types", addr), None);
        store.delete("a&select=x").await.unwrap();

        let request_line = server.await.unwrap();
        assert_eq!(
            request_line,
            "DELETE /label_types?id=eq.a%26select%3Dx HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_rest_store_request_failed() {
        let store = RestStore::new(reqwest::Client::new(), "http://127.0.0.1:1/label_types/", None);
        assert_eq!(store.table_url, "http://127.0.0.1:1/label_types");
        let err = store.list().await.unwrap_err();
        assert!(matches!(err, EtiketError::Registry(_)));
    }
}
