//! Configuration Module
//!
//! Handles loading server configuration from command-line flags, with
//! environment variable fallbacks.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::imaging::DEFAULT_JPEG_QUALITY;

/// Default upload body limit in bytes (64 MiB)
pub const DEFAULT_MAX_UPLOAD: usize = 64 * 1024 * 1024;

/// Default limit on requested width and height in pixels
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// Default stale sweep interval in seconds
pub const DEFAULT_SWEEP_INTERVAL: u64 = 60;

/// Server configuration parameters.
///
/// Every flag can also be set through its `IMGSERVER_*` environment variable.
#[derive(Parser, Debug, Clone)]
#[command(name = "imgserver")]
#[command(about = "HTTP server that renders and caches image thumbnails")]
#[command(version)]
pub struct Config {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1", env = "IMGSERVER_HOST")]
    pub host: String,

    /// HTTP server port
    #[arg(short, long, default_value_t = 3000, env = "IMGSERVER_PORT")]
    pub port: u16,

    /// Directory holding the source images
    #[arg(long, env = "IMGSERVER_IMAGE_DIR")]
    pub image_dir: PathBuf,

    /// Maximum bytes of rendered thumbnails kept in memory
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY, env = "IMGSERVER_CACHE_SIZE")]
    pub cache_size: u64,

    /// JPEG quality for rendered thumbnails (1-100)
    #[arg(
        long,
        default_value_t = DEFAULT_JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100),
        env = "IMGSERVER_JPEG_QUALITY"
    )]
    pub jpeg_quality: u8,

    /// Largest width or height a client may request, in pixels
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_DIMENSION,
        value_parser = clap::value_parser!(u32).range(1..),
        env = "IMGSERVER_MAX_DIMENSION"
    )]
    pub max_dimension: u32,

    /// Largest accepted upload body in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD, env = "IMGSERVER_MAX_UPLOAD")]
    pub max_upload: usize,

    /// Seconds between stale cache sweeps, 0 disables the sweep
    #[arg(long, default_value_t = DEFAULT_SWEEP_INTERVAL, env = "IMGSERVER_SWEEP_INTERVAL")]
    pub sweep_interval: u64,
}

impl Config {
    /// Parses the socket address to bind to.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            image_dir: PathBuf::from("."),
            cache_size: DEFAULT_CACHE_CAPACITY,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_upload: DEFAULT_MAX_UPLOAD,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}
