//! Cover Service - candidate cover URLs and cover uploads
//!
//! Remote candidates come from the Open Library covers service. Local files
//! are normalised (HEIC/HEIF converted to JPEG, `.jpeg` renamed to `.jpg`)
//! and handed to the asset store under `covers/{uuid}.{ext}`.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

use crate::domain::DomainError;
use crate::infrastructure::assets::AssetStore;
use crate::models::{BookFormValues, CoverUpload};
use crate::openlibrary::{OpenLibraryClient, SearchDoc, clean_isbn};
pub use crate::openlibrary::{CoverSize, id_cover_url, isbn_cover_url};

/// Search docs inspected for cover ids.
pub const MAX_COVER_DOCS: usize = 8;
/// Secondary ISBNs taken from each doc.
pub const ISBNS_PER_DOC: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum CoverError {
    #[error("cover file is empty")]
    Empty,
    #[error("cover conversion failed: {0}")]
    Conversion(String),
    #[error("cover upload failed: {0}")]
    Upload(String),
    #[error("unsupported cover format: {0}")]
    Unsupported(String),
    #[error("HEIC conversion unavailable in this build")]
    HeicUnavailable,
}

impl From<CoverError> for DomainError {
    fn from(e: CoverError) -> Self {
        match e {
            CoverError::Unsupported(_) => {
                let mut errors = crate::domain::FieldErrors::new();
                errors.add("cover", "Cover must be a JPEG, PNG, WebP, GIF or HEIC image");
                DomainError::Validation(errors)
            }
            err @ CoverError::HeicUnavailable => DomainError::UnsupportedMedia(err.to_string()),
            other => DomainError::Storage(other.to_string()),
        }
    }
}

/// Candidate URLs from the first [`MAX_COVER_DOCS`] docs: the doc's cover id
/// first, then up to [`ISBNS_PER_DOC`] of its ISBNs.
pub fn candidates_from_docs(covers_url: &str, docs: &[SearchDoc]) -> Vec<String> {
    let mut covers = Vec::new();
    for doc in docs.iter().take(MAX_COVER_DOCS) {
        if let Some(cover_id) = doc.cover_i {
            covers.push(id_cover_url(covers_url, cover_id));
        }
        if let Some(isbns) = &doc.isbn {
            for isbn in isbns.iter().take(ISBNS_PER_DOC) {
                covers.push(isbn_cover_url(covers_url, isbn, CoverSize::Large));
            }
        }
    }
    covers
}

/// Drop exact duplicates, keeping the first occurrence of each URL.
pub fn dedupe_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
}

/// Re-encodes an image as JPEG.
pub trait CoverConverter: Send + Sync {
    fn to_jpeg(&self, bytes: &[u8]) -> Result<Vec<u8>, CoverError>;
}

/// ISO-BMFF `ftyp` box with a HEIF-family brand.
pub fn looks_like_heif(bytes: &[u8]) -> bool {
    if bytes.len() < 12 || &bytes[4..8] != b"ftyp" {
        return false;
    }
    matches!(
        &bytes[8..12],
        b"heic" | b"heix" | b"heim" | b"heis" | b"hevc" | b"hevx" | b"mif1" | b"msf1"
    )
}

fn encode_jpeg(img: image::DynamicImage) -> Result<Vec<u8>, CoverError> {
    let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, image::ImageFormat::Jpeg)
        .map_err(|e| CoverError::Conversion(e.to_string()))?;
    Ok(out.into_inner())
}

/// Converter backed by the `image` crate. It cannot decode HEIF containers
/// and reports them as [`CoverError::HeicUnavailable`]; other undecodable
/// input surfaces as [`CoverError::Conversion`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateConverter;

impl CoverConverter for ImageCrateConverter {
    fn to_jpeg(&self, bytes: &[u8]) -> Result<Vec<u8>, CoverError> {
        if looks_like_heif(bytes) {
            return Err(CoverError::HeicUnavailable);
        }
        let img = image::load_from_memory(bytes).map_err(|e| CoverError::Conversion(e.to_string()))?;
        encode_jpeg(img)
    }
}

/// HEIC/HEIF decoding through libheif, re-encoded with the `image` crate.
#[cfg(feature = "heic")]
#[derive(Debug, Default, Clone, Copy)]
pub struct HeifConverter;

#[cfg(feature = "heic")]
impl CoverConverter for HeifConverter {
    fn to_jpeg(&self, bytes: &[u8]) -> Result<Vec<u8>, CoverError> {
        use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

        if !looks_like_heif(bytes) {
            return ImageCrateConverter.to_jpeg(bytes);
        }

        let conversion = |e: libheif_rs::HeifError| CoverError::Conversion(e.to_string());
        let lib_heif = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(bytes).map_err(conversion)?;
        let handle = ctx.primary_image_handle().map_err(conversion)?;
        let decoded = lib_heif
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(conversion)?;

        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| CoverError::Conversion("no interleaved RGB plane".to_string()))?;

        let (width, height) = (plane.width, plane.height);
        let row_len = width as usize * 3;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for row in plane.data.chunks(plane.stride).take(height as usize) {
            pixels.extend_from_slice(&row[..row_len]);
        }

        let img = image::RgbImage::from_raw(width, height, pixels)
            .ok_or_else(|| CoverError::Conversion("decoded HEIC has bad dimensions".to_string()))?;
        encode_jpeg(image::DynamicImage::ImageRgb8(img))
    }
}

/// The converter used when none is injected: libheif with the `heic`
/// feature, the `image` crate otherwise.
pub fn default_converter() -> Arc<dyn CoverConverter> {
    #[cfg(feature = "heic")]
    {
        Arc::new(HeifConverter)
    }
    #[cfg(not(feature = "heic"))]
    {
        Arc::new(ImageCrateConverter)
    }
}

/// An upload ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedUpload {
    pub extension: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" | "image/heif" => Some("heic"),
        _ => None,
    }
}

/// Extensions a cover is stored under. HEIC/HEIF is converted to `jpg` first.
const STORED_EXTENSIONS: [&str; 4] = ["jpg", "png", "webp", "gif"];

fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

pub fn is_heic(upload: &CoverUpload) -> bool {
    let by_mime = upload
        .content_type
        .as_deref()
        .map(|m| m.to_ascii_lowercase())
        .is_some_and(|m| m == "image/heic" || m == "image/heif");
    let by_ext = file_extension(&upload.file_name).is_some_and(|e| e == "heic" || e == "heif");
    by_mime || by_ext
}

/// Normalise a picked file for storage. Anything that is not a JPEG, PNG,
/// WebP, GIF or HEIC/HEIF image by name or MIME type is rejected.
pub fn prepare_upload(
    upload: &CoverUpload,
    converter: &dyn CoverConverter,
) -> Result<PreparedUpload, CoverError> {
    if upload.bytes.is_empty() {
        return Err(CoverError::Empty);
    }

    if is_heic(upload) {
        tracing::debug!("Converting HEIC cover {} to JPEG", upload.file_name);
        return Ok(PreparedUpload {
            extension: "jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: converter.to_jpeg(&upload.bytes)?,
        });
    }

    let mime = upload
        .content_type
        .as_deref()
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty() && m != "application/octet-stream");
    let mime_ext = match mime.as_deref() {
        Some(m) => Some(extension_for_mime(m).ok_or_else(|| CoverError::Unsupported(m.to_string()))?),
        None => None,
    };

    let extension = match file_extension(&upload.file_name) {
        Some(ext) => {
            let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };
            if !STORED_EXTENSIONS.contains(&ext.as_str()) {
                return Err(CoverError::Unsupported(ext));
            }
            ext
        }
        None => mime_ext
            .map(str::to_string)
            .ok_or_else(|| CoverError::Unsupported(upload.file_name.clone()))?,
    };

    Ok(PreparedUpload {
        content_type: mime_for_extension(&extension).to_string(),
        extension,
        bytes: upload.bytes.clone(),
    })
}

pub struct CoverService {
    lookup: Arc<OpenLibraryClient>,
    assets: Arc<dyn AssetStore>,
    converter: Arc<dyn CoverConverter>,
}

impl CoverService {
    pub fn new(
        lookup: Arc<OpenLibraryClient>,
        assets: Arc<dyn AssetStore>,
        converter: Arc<dyn CoverConverter>,
    ) -> Self {
        Self {
            lookup,
            assets,
            converter,
        }
    }

    /// Candidate cover URLs for the form's current ISBN/title/author.
    ///
    /// The ISBN cover comes first. A failed title/author search is logged and
    /// the candidates gathered so far are still returned.
    pub async fn search_covers(
        &self,
        isbn: Option<&str>,
        title: Option<&str>,
        author: Option<&str>,
    ) -> Vec<String> {
        let covers_url = self.lookup.covers_url();
        let mut covers = Vec::new();

        if let Some(isbn) = isbn.map(clean_isbn).filter(|i| !i.is_empty()) {
            covers.push(isbn_cover_url(covers_url, &isbn, CoverSize::Large));
        }

        let has_text = |s: Option<&str>| s.is_some_and(|s| !s.trim().is_empty());
        if has_text(title) || has_text(author) {
            match self.lookup.search_docs(title, author, None).await {
                Ok(docs) => covers.extend(candidates_from_docs(covers_url, &docs)),
                Err(e) => tracing::warn!("Open Library cover search failed: {}", e),
            }
        }

        dedupe_preserving_order(covers)
    }

    /// Convert, store and return the public URL of a local cover file.
    pub async fn upload_cover(&self, upload: &CoverUpload) -> Result<String, CoverError> {
        let prepared = prepare_upload(upload, self.converter.as_ref())?;
        let path = format!("covers/{}.{}", uuid::Uuid::new_v4(), prepared.extension);

        let stored = self
            .assets
            .put(&path, prepared.bytes, &prepared.content_type)
            .await
            .map_err(|e| CoverError::Upload(e.to_string()))?;

        Ok(stored.public_url)
    }

    /// The cover to attach on submission. A local file wins over a selected
    /// remote candidate; `None` means no new cover.
    pub async fn resolve_cover(&self, form: &BookFormValues) -> Result<Option<String>, CoverError> {
        if let Some(upload) = &form.cover {
            return self.upload_cover(upload).await.map(Some);
        }
        Ok(form.selected_cover_url.clone())
    }
}
