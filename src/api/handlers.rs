//! API Handlers
//!
//! HTTP request handlers for each image server endpoint.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheKey, CacheStore, SharedCache};
use crate::config::{Config, DEFAULT_MAX_DIMENSION, DEFAULT_MAX_UPLOAD};
use crate::error::{CodecError, Result, ServerError, StorageError};
use crate::geometry::Size;
use crate::imaging::{CenterSubject, JpegCodec, Renderer, DEFAULT_JPEG_QUALITY};
use crate::models::{
    CopyResponse, DeleteResponse, ImageQuery, ListQuery, StatsResponse, StoredResponse,
};
use crate::storage::{validate_name, Directory, FsDirectory};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Rendered thumbnails
    pub cache: SharedCache,
    /// Source images
    pub images: Arc<dyn Directory>,
    /// Thumbnail pipeline
    pub renderer: Renderer,
    /// JPEG quality for rendered thumbnails
    pub jpeg_quality: u8,
    /// Largest requested width or height
    pub max_dimension: u32,
    /// Upload body limit in bytes
    pub max_upload: usize,
}

impl AppState {
    /// Creates a new AppState with default quality and upload limit.
    pub fn new(cache: CacheStore, images: Arc<dyn Directory>, renderer: Renderer) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            images,
            renderer,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_upload: DEFAULT_MAX_UPLOAD,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Serves images from `config.image_dir` with centered crops.
    pub fn from_config(config: &Config) -> Self {
        let renderer = Renderer::new(Arc::new(JpegCodec::new()), Arc::new(CenterSubject));
        let mut state = Self::new(
            CacheStore::new(config.cache_size),
            Arc::new(FsDirectory::new(&config.image_dir)),
            renderer,
        );
        state.jpeg_quality = config.jpeg_quality;
        state.max_dimension = config.max_dimension;
        state.max_upload = config.max_upload;
        state
    }

    /// Drops every cached rendition of `name`, returning how many were held.
    pub async fn purge(&self, name: &str) -> usize {
        let mut cache = self.cache.write().await;
        let keys = cache.find_keys(&CacheKey::source_prefix(name));
        let purged = cache.remove(&keys).into_iter().flatten().count();
        if purged > 0 {
            debug!("Purged {} cached renditions of {}", purged, name);
        }
        purged
    }

    /// Modification time of a source, purging its renditions if it is gone.
    async fn source_token(&self, name: &str) -> Result<SystemTime> {
        match self.images.mod_time(name).await {
            Ok(token) => Ok(token),
            Err(err) => {
                if matches!(err, StorageError::NotFound(_)) {
                    self.purge(name).await;
                }
                Err(err.into())
            }
        }
    }
}

fn task_failed(err: tokio::task::JoinError) -> CodecError {
    CodecError::Task(err.to_string())
}

fn jpeg_response(data: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "image/jpeg")], data).into_response()
}

/// Handler for GET /:name
///
/// Serves the source scaled to `width`/`height`, from cache when the cached
/// rendition was made from the current version of the source. Sizes above
/// `max_dimension` are rejected before the source is touched.
pub async fn image_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Response> {
    if let Some(error_msg) = query.validate(state.max_dimension) {
        return Err(ServerError::InvalidRequest(error_msg));
    }

    let key = CacheKey::new(&name, query.width, query.height).to_string();
    let token = state.source_token(&name).await?;

    let cached = state.cache.read().await.get(&key, token);
    if let Some(data) = cached {
        debug!("Cache hit {}", key);
        return Ok(jpeg_response(data));
    }
    debug!("Cache miss {}", key);

    let source = match state.images.read(&name).await {
        Ok(source) => source,
        Err(err) => {
            if matches!(err, StorageError::NotFound(_)) {
                state.purge(&name).await;
            }
            return Err(err.into());
        }
    };

    let renderer = state.renderer.clone();
    let requested = Size::new(query.width, query.height);
    let quality = state.jpeg_quality;
    let rendered = tokio::task::spawn_blocking(move || renderer.render(&source, requested, quality))
        .await
        .map_err(task_failed)
        .and_then(|result| result)
        .map_err(|err| {
            error!("Failed to render {}: {}", key, err);
            ServerError::from(err)
        })?;

    if let Err(err) = state.cache.write().await.put(key, rendered.clone(), token) {
        warn!("{}", err);
    }

    Ok(jpeg_response(rendered))
}

/// Handler for POST /:name
///
/// Stores the request body as a new version of the source, re-encoded as
/// JPEG on a white background.
pub async fn upload_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<StoredResponse>> {
    validate_name(&name)?;

    let renderer = state.renderer.clone();
    let normalized = tokio::task::spawn_blocking(move || renderer.normalize(&body))
        .await
        .map_err(task_failed)?
        .map_err(|err| ServerError::InvalidRequest(err.to_string()))?;

    state.images.write(&name, &normalized.data).await.map_err(|err| {
        error!("Failed to store {}: {}", name, err);
        ServerError::from(err)
    })?;
    state.purge(&name).await;

    info!(
        "Stored {} ({}x{})",
        name, normalized.size.width, normalized.size.height
    );
    Ok(Json(StoredResponse::new(
        name,
        normalized.size,
        normalized.data.len(),
    )))
}

/// Handler for DELETE /:name
///
/// Deletes the source and every cached rendition of it. The renditions are
/// dropped even when the source was already gone.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state.images.delete(&name).await;
    let purged = state.purge(&name).await;
    deleted?;

    info!("Deleted {}", name);
    Ok(Json(DeleteResponse::new(name, purged)))
}

/// Handler for PUT /:src/:dst
///
/// Duplicates a source under a new name.
pub async fn copy_handler(
    State(state): State<AppState>,
    Path((src, dst)): Path<(String, String)>,
) -> Result<Json<CopyResponse>> {
    validate_name(&dst)?;
    state.images.copy(&src, &dst).await?;
    state.purge(&dst).await;

    info!("Copied {} to {}", src, dst);
    Ok(Json(CopyResponse::new(src, dst)))
}

/// Handler for PUT /
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::new(&cache.stats(), cache.capacity()))
}

/// Handler for GET /
///
/// Lists sources last modified more than `age` seconds ago.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<String>>> {
    let names = state.images.list(Duration::from_secs(query.age)).await?;
    Ok(Json(names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    use crate::imaging::Codec;

    fn test_state(capacity: u64) -> (TempDir, AppState) {
        test_state_with(Config {
            cache_size: capacity,
            ..Config::default()
        })
    }

    fn test_state_with(config: Config) -> (TempDir, AppState) {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            image_dir: tmp.path().to_path_buf(),
            ..config
        };
        (tmp, AppState::from_config(&config))
    }

    fn jpeg(width: u32, height: u32) -> Bytes {
        JpegCodec::new()
            .encode(&RgbImage::from_pixel(width, height, Rgb([10, 200, 30])), 90)
            .unwrap()
    }

    fn query(width: u32, height: u32) -> Query<ImageQuery> {
        Query(ImageQuery { width, height })
    }

    #[tokio::test]
    async fn test_upload_then_render() {
        let (_tmp, state) = test_state(1 << 20);

        let stored = upload_handler(State(state.clone()), Path("a.jpg".into()), jpeg(40, 20))
            .await
            .unwrap();
        assert_eq!(stored.width, 40);
        assert_eq!(stored.height, 20);

        image_handler(State(state.clone()), Path("a.jpg".into()), query(10, 0))
            .await
            .unwrap();
        image_handler(State(state.clone()), Path("a.jpg".into()), query(10, 0))
            .await
            .unwrap();

        let stats = state.cache.read().await.stats();
        assert_eq!(stats.gets, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.puts, 1);
        assert_eq!(stats.items, 1);
    }

    #[tokio::test]
    async fn test_dimension_limit() {
        let (_tmp, state) = test_state_with(Config {
            max_dimension: 64,
            ..Config::default()
        });
        upload_handler(State(state.clone()), Path("a.jpg".into()), jpeg(8, 8))
            .await
            .unwrap();

        // Letterboxed onto the largest allowed canvas
        let response = image_handler(State(state.clone()), Path("a.jpg".into()), query(64, 64))
            .await
            .unwrap();
        let data = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            JpegCodec::new().decode(&data).unwrap().dimensions(),
            (64, 64)
        );

        let wide = image_handler(State(state.clone()), Path("a.jpg".into()), query(65, 64)).await;
        assert!(matches!(wide, Err(ServerError::InvalidRequest(_))));

        let huge = image_handler(
            State(state.clone()),
            Path("a.jpg".into()),
            query(u32::MAX, u32::MAX),
        )
        .await;
        assert!(matches!(huge, Err(ServerError::InvalidRequest(_))));

        // Rejected before a lookup is counted
        assert_eq!(state.cache.read().await.stats().gets, 1);
    }

    #[tokio::test]
    async fn test_missing_source_purges_cache() {
        let (_tmp, state) = test_state(1 << 20);
        state
            .cache
            .write()
            .await
            .put("gone.jpg/5x5", Bytes::from_static(b"x"), SystemTime::now())
            .unwrap();

        let result = image_handler(State(state.clone()), Path("gone.jpg".into()), query(5, 5)).await;
        assert!(matches!(result, Err(ServerError::NotFound(_))));
        assert!(state.cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_garbage() {
        let (_tmp, state) = test_state(1 << 20);
        let result = upload_handler(
            State(state),
            Path("bad.jpg".into()),
            Bytes::from_static(b"not an image"),
        )
        .await;
        assert!(matches!(result, Err(ServerError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_upload_rejects_hidden_name() {
        let (_tmp, state) = test_state(1 << 20);
        let result = upload_handler(State(state), Path(".hidden".into()), jpeg(4, 4)).await;
        assert!(matches!(result, Err(ServerError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_reupload_invalidates_renditions() {
        let (_tmp, state) = test_state(1 << 20);
        upload_handler(State(state.clone()), Path("a.jpg".into()), jpeg(40, 20))
            .await
            .unwrap();
        image_handler(State(state.clone()), Path("a.jpg".into()), query(8, 8))
            .await
            .unwrap();
        assert_eq!(state.cache.read().await.len(), 1);

        upload_handler(State(state.clone()), Path("a.jpg".into()), jpeg(20, 40))
            .await
            .unwrap();
        assert!(state.cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let (_tmp, state) = test_state(1 << 20);
        upload_handler(State(state.clone()), Path("a.jpg".into()), jpeg(8, 8))
            .await
            .unwrap();
        image_handler(State(state.clone()), Path("a.jpg".into()), query(4, 4))
            .await
            .unwrap();

        let response = delete_handler(State(state.clone()), Path("a.jpg".into()))
            .await
            .unwrap();
        assert_eq!(response.purged, 1);
        assert!(state.cache.read().await.is_empty());

        let again = delete_handler(State(state), Path("a.jpg".into())).await;
        assert!(matches!(again, Err(ServerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_oversized_render_is_served_but_not_cached() {
        let (_tmp, state) = test_state(1);
        upload_handler(State(state.clone()), Path("a.jpg".into()), jpeg(16, 16))
            .await
            .unwrap();

        image_handler(State(state.clone()), Path("a.jpg".into()), query(0, 0))
            .await
            .unwrap();
        assert!(state.cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_copy_handler() {
        let (_tmp, state) = test_state(1 << 20);
        upload_handler(State(state.clone()), Path("a.jpg".into()), jpeg(8, 8))
            .await
            .unwrap();

        copy_handler(
            State(state.clone()),
            Path(("a.jpg".to_string(), "b.jpg".to_string())),
        )
        .await
        .unwrap();
        assert!(state.images.mod_time("b.jpg").await.is_ok());

        let missing = copy_handler(
            State(state),
            Path(("nope.jpg".to_string(), "c.jpg".to_string())),
        )
        .await;
        assert!(matches!(missing, Err(ServerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let (_tmp, state) = test_state(4096);
        let response = stats_handler(State(state)).await;
        assert_eq!(response.gets, 0);
        assert_eq!(response.capacity, 4096);
    }

    #[tokio::test]
    async fn test_list_handler() {
        let (_tmp, state) = test_state(1 << 20);
        upload_handler(State(state.clone()), Path("b.jpg".into()), jpeg(4, 4))
            .await
            .unwrap();
        upload_handler(State(state.clone()), Path("a.jpg".into()), jpeg(4, 4))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let all = list_handler(State(state.clone()), Query(ListQuery { age: 0 }))
            .await
            .unwrap();
        assert_eq!(all.0, vec!["a.jpg".to_string(), "b.jpg".to_string()]);

        let old = list_handler(State(state), Query(ListQuery { age: 3600 }))
            .await
            .unwrap();
        assert!(old.0.is_empty());
    }
}
