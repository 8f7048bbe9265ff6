//! Image assets referenced by a label (logo, image free items).
//!
//! `Assets` keeps the layout model a pure data structure: documents only hold
//! references, and whoever renders or prints looks the decoded images up here.
//! A reference that is not loaded is drawn as a placeholder on screen and
//! skipped in ZPL with a [`ValidationIssue::MissingImage`].
//!
//! [`ValidationIssue::MissingImage`]: crate::error::ValidationIssue::MissingImage

use std::collections::HashMap;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{GrayImage, imageops::FilterType};
use tracing::debug;

use crate::error::{EtiketError, Result};
use crate::layout::{EditMode, FreeItemKind, LabelDocument};

/// Which kinds of reference [`Assets::fetch`] resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource {
    /// URLs, `data:` URLs and paths on the local filesystem.
    Any,
    /// URLs and `data:` URLs only. Used wherever references come from
    /// remote clients.
    Remote,
}

/// Decoded grayscale images keyed by the reference used in the document.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    images: HashMap<String, GrayImage>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, image: GrayImage) {
        self.images.insert(reference.into(), image);
    }

    pub fn get(&self, reference: &str) -> Option<&GrayImage> {
        self.images.get(reference)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Decode an image file and store it under `reference`.
    pub fn load_file(&mut self, reference: impl Into<String>, path: &Path) -> Result<()> {
        let image = image::open(path)
            .map_err(|e| EtiketError::Image(format!("Failed to open {}: {}", path.display(), e)))?;
        self.insert(reference, image.to_luma8());
        Ok(())
    }

    /// Decode image bytes and store them under `reference`.
    pub fn load_bytes(&mut self, reference: impl Into<String>, bytes: &[u8]) -> Result<()> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| EtiketError::Image(format!("Failed to decode image: {}", e)))?;
        self.insert(reference, image.to_luma8());
        Ok(())
    }

    /// Load a reference: `http(s)://` URLs are downloaded, base64 `data:`
    /// URLs are decoded in place, and anything else is read as a file path
    /// when `source` allows it.
    pub async fn fetch(
        &mut self,
        client: &reqwest::Client,
        reference: &str,
        source: AssetSource,
    ) -> Result<()> {
        if self.images.contains_key(reference) {
            return Ok(());
        }
        if reference.starts_with("data:") {
            let bytes = decode_data_url(reference)?;
            return self.load_bytes(reference, &bytes);
        }
        if !is_url(reference) {
            return match source {
                AssetSource::Any => self.load_file(reference, Path::new(reference)),
                AssetSource::Remote => Err(EtiketError::Image(format!(
                    "Local file reference {:?} is not allowed here",
                    reference
                ))),
            };
        }

        debug!(url = reference, "downloading image asset");
        let response = client
            .get(reference)
            .send()
            .await
            .map_err(|e| EtiketError::Image(format!("Failed to download {}: {}", reference, e)))?;
        if !response.status().is_success() {
            return Err(EtiketError::Image(format!(
                "Failed to download {}: HTTP {}",
                reference,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| EtiketError::Image(format!("Failed to read image data: {}", e)))?;
        self.load_bytes(reference, &bytes)
    }

    /// Load every image a document references. Failures are returned per
    /// reference rather than aborting, since a missing logo should not stop
    /// the rest of the label.
    pub async fn fetch_for_document(
        &mut self,
        client: &reqwest::Client,
        doc: &LabelDocument,
        source: AssetSource,
    ) -> Vec<(String, EtiketError)> {
        let mut failures = Vec::new();
        for reference in referenced_images(doc) {
            if let Err(e) = self.fetch(client, &reference, source).await {
                failures.push((reference, e));
            }
        }
        failures
    }
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Payload of a `data:[<mime>];base64,<payload>` URL.
fn decode_data_url(reference: &str) -> Result<Vec<u8>> {
    let invalid = || EtiketError::Image("Unsupported data URL; expected base64 image data".into());
    let rest = reference.strip_prefix("data:").ok_or_else(invalid)?;
    let (meta, payload) = rest.split_once(',').ok_or_else(invalid)?;
    if !meta.ends_with(";base64") {
        return Err(invalid());
    }
    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(payload)
        .map_err(|e| EtiketError::Image(format!("Invalid base64 in data URL: {}", e)))
}

/// Image references used by the active mode of a document.
pub fn referenced_images(doc: &LabelDocument) -> Vec<String> {
    match doc.mode {
        EditMode::Standard => {
            let logo = doc.field_values.logo.trim();
            if logo.is_empty() {
                Vec::new()
            } else {
                vec![logo.to_string()]
            }
        }
        EditMode::Free => doc
            .free_items
            .iter()
            .filter(|i| i.kind == FreeItemKind::Image)
            .filter_map(|i| i.src.clone())
            .filter(|s| !s.trim().is_empty())
            .collect(),
    }
}

/// Whether a logo value names an image rather than plain title text.
///
/// URLs and anything with a common image extension count as images; a logo
/// like `"ACME"` is printed as text at the title font.
pub fn is_image_reference(value: &str) -> bool {
    let value = value.trim();
    if is_url(value) || value.starts_with("data:") {
        return true;
    }
    let lower = value.to_ascii_lowercase();
    [".png", ".jpg", ".jpeg", ".bmp", ".gif", ".webp"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Scale an image to fit inside `max_w × max_h`, keeping its aspect ratio.
pub fn fit_within(image: &GrayImage, max_w: u32, max_h: u32) -> GrayImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 || max_w == 0 || max_h == 0 {
        return GrayImage::new(max_w.max(1), max_h.max(1));
    }
    let scale = (max_w as f32 / w as f32).min(max_h as f32 / h as f32);
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);
    image::imageops::resize(image, new_w, new_h, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FreeItem;
    use image::Luma;

    #[test]
    fn test_referenced_images_by_mode() {
        let mut doc = LabelDocument::default();
        doc.field_values.logo = "logo.png".into();
        let mut img = FreeItem::new(FreeItemKind::Image, 0.0, 0.0);
        img.src = Some("stamp.png".into());
        doc.add_free_item(img);

        assert_eq!(referenced_images(&doc), vec!["logo.png".to_string()]);
        doc.mode = EditMode::Free;
        assert_eq!(referenced_images(&doc), vec!["stamp.png".to_string()]);
    }

    #[test]
    fn test_is_image_reference() {
        assert!(is_image_reference("logo.PNG"));
        assert!(is_image_reference("https://cdn.example.com/l"));
        assert!(!is_image_reference("ACME Ltd."));
        assert!(!is_image_reference(""));
    }

    #[test]
    fn test_fit_within_keeps_aspect() {
        let img = GrayImage::from_pixel(200, 100, Luma([0]));
        let fitted = fit_within(&img, 50, 50);
        assert_eq!(fitted.dimensions(), (50, 25));
    }

    #[test]
    fn test_load_file_missing() {
        let mut assets = Assets::new();
        let err = assets
            .load_file("x", Path::new("/definitely/not/here.png"))
            .unwrap_err();
        assert!(matches!(err, EtiketError::Image(_)));
        assert!(assets.is_empty());
    }

    fn png_data_url() -> String {
        let mut png = Vec::new();
        GrayImage::from_pixel(3, 2, Luma([0]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(png))
    }

    #[tokio::test]
    async fn test_fetch_data_url() {
        let reference = png_data_url();
        assert!(is_image_reference(&reference));

        let mut assets = Assets::new();
        assets
            .fetch(&reqwest::Client::new(), &reference, AssetSource::Remote)
            .await
            .unwrap();
        assert_eq!(assets.get(&reference).unwrap().dimensions(), (3, 2));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_base64_data_url() {
        let mut assets = Assets::new();
        let err = assets
            .fetch(&reqwest::Client::new(), "data:text/plain,hello.png", AssetSource::Any)
            .await
            .unwrap_err();
        assert!(matches!(err, EtiketError::Image(_)));
        assert!(assets.is_empty());
    }

    #[tokio::test]
    async fn test_remote_source_refuses_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.png");
        GrayImage::from_pixel(8, 8, Luma([0])).save(&path).unwrap();
        let reference = path.display().to_string();
        let client = reqwest::Client::new();

        let mut assets = Assets::new();
        let err = assets
            .fetch(&client, &reference, AssetSource::Remote)
            .await
            .unwrap_err();
        assert!(matches!(err, EtiketError::Image(_)));
        assert!(assets.is_empty());

        assets.fetch(&client, &reference, AssetSource::Any).await.unwrap();
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn test_load_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        GrayImage::from_pixel(4, 2, Luma([10])).save(&path).unwrap();

        let mut assets = Assets::new();
        assets.load_file("logo", &path).unwrap();
        assert_eq!(assets.get("logo").unwrap().dimensions(), (4, 2));
    }
}
