//! Static asset serving from `[server] static_dir`.
//!
//! The page itself is rendered at `/`; this only serves supporting files
//! (stylesheets, images, the resume PDF). Missing files are a plain 404.

use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

#[derive(Debug)]
pub struct StaticAssets {
    /// Resolved static directory, `None` if not configured or missing.
    root: Option<PathBuf>,
}

impl StaticAssets {
    pub fn new(static_dir: Option<PathBuf>) -> Self {
        let root = static_dir.filter(|p| p.is_dir());
        match &root {
            Some(dir) => info!(dir = %dir.display(), "serving static files from disk"),
            None => info!("no static directory configured"),
        }
        Self { root }
    }

    /// Look up `path` (as requested, with leading `/`). `None` means 404.
    pub fn serve(&self, path: &str) -> Option<Asset> {
        // Reject paths that try to escape the static root.
        if path.split('/').any(|seg| seg == "..") || path.contains('\\') {
            return Some(Asset {
                status: StatusCode::BAD_REQUEST,
                content_type: "text/plain; charset=utf-8",
                body: b"bad request\n".to_vec(),
            });
        }
        let root = self.root.as_ref()?;
        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            return None;
        }
        let file_path = root.join(relative);
        if !file_path.is_file() {
            debug!(path, "static asset not found");
            return None;
        }
        Some(read_static_file(&file_path))
    }
}

/// Read a file from disk with the MIME type inferred from its extension.
fn read_static_file(path: &Path) -> Asset {
    match std::fs::read(path) {
        Ok(body) => Asset { status: StatusCode::OK, content_type: mime_from_extension(path), body },
        Err(e) => {
            warn!(path = %path.display(), "failed to read static file: {e}");
            Asset {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                content_type: "text/plain; charset=utf-8",
                body: b"internal error\n".to_vec(),
            }
        }
    }
}

/// Map a file extension to a MIME content-type string.
fn mime_from_extension(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn assets() -> (TempDir, StaticAssets) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("site.css"), "body{}").unwrap();
        std::fs::create_dir(dir.path().join("img")).unwrap();
        std::fs::write(dir.path().join("img/me.png"), [0x89, b'P', b'N', b'G']).unwrap();
        let a = StaticAssets::new(Some(dir.path().to_path_buf()));
        (dir, a)
    }

    #[test]
    fn serves_files_with_mime() {
        let (_d, a) = assets();
        let css = a.serve("/site.css").unwrap();
        assert_eq!(css.status, StatusCode::OK);
        assert_eq!(css.content_type, "text/css; charset=utf-8");
        assert_eq!(a.serve("/img/me.png").unwrap().content_type, "image/png");
    }

    #[test]
    fn missing_file_is_none() {
        let (_d, a) = assets();
        assert!(a.serve("/nope.js").is_none());
        assert!(a.serve("/img").is_none());
    }

    #[test]
    fn traversal_is_rejected() {
        let (_d, a) = assets();
        assert_eq!(a.serve("/../etc/passwd").unwrap().status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn without_root_everything_is_404() {
        let a = StaticAssets::new(None);
        assert!(a.serve("/site.css").is_none());
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        assert_eq!(mime_from_extension(Path::new("x.bin")), "application/octet-stream");
    }
}
