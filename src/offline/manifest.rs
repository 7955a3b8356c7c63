pub const DEFAULT_CACHE_NAME: &str = "8d-player-cache-v1";

const ASSETS: [&str; 7] = [
    "/",
    "/index.html",
    "/css/style.css",
    "/js/script.js",
    "/assets/background/nebula.3840x2160.mp4",
    "/assets/icons/icon-192.png",
    "/assets/icons/icon-512.png",
];

/// Cache name plus the URLs stored under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheManifest {
    pub name: String,
    pub urls: Vec<String>,
}

impl Default for CacheManifest {
    fn default() -> Self {
        Self {
            name: DEFAULT_CACHE_NAME.to_string(),
            urls: ASSETS.iter().map(|u| u.to_string()).collect(),
        }
    }
}

impl CacheManifest {
    /// Same assets under a different version name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
