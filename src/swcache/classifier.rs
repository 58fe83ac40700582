//! Resource classification — decides which caching strategy applies.
//!
//! First match wins: static asset → API → navigation → pass-through.

use crate::swcache::FetchRequest;

/// Classification of one intercepted fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    /// Cache-first.
    StaticAsset,
    /// Network-first with API sub-policies.
    Api,
    /// Network-first with offline fallback chain.
    Navigation,
    /// Straight to the network, no caching.
    PassThrough,
}

/// File extensions served cache-first.
const STATIC_EXTENSIONS: [&str; 13] = [
    ".html", ".css", ".js", ".json", ".ico", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".woff",
    ".woff2", ".ttf",
];

/// Font/CDN hosts whose assets are treated as static.
const TRUSTED_ASSET_HOSTS: [&str; 3] = [
    "fonts.googleapis.com",
    "fonts.gstatic.com",
    "cdnjs.cloudflare.com",
];

/// Classify a fetch. Non-read methods and non-network protocols pass
/// straight through.
pub fn classify(request: &FetchRequest) -> ResourceClass {
    if request.method != "GET" {
        return ResourceClass::PassThrough;
    }
    if !matches!(request.url.scheme(), "http" | "https") {
        return ResourceClass::PassThrough;
    }

    let path = request.url.path();

    if is_static_resource(request, path) {
        ResourceClass::StaticAsset
    } else if is_api_path(path) {
        ResourceClass::Api
    } else if is_navigation(request) {
        ResourceClass::Navigation
    } else {
        ResourceClass::PassThrough
    }
}

fn is_static_resource(request: &FetchRequest, path: &str) -> bool {
    if path == "/" {
        return true;
    }
    if STATIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return true;
    }
    request
        .url
        .host_str()
        .is_some_and(|host| TRUSTED_ASSET_HOSTS.contains(&host))
}

fn is_api_path(path: &str) -> bool {
    path.starts_with("/ai/") || path.starts_with("/api/") || path == "/health"
}

fn is_navigation(request: &FetchRequest) -> bool {
    request
        .accept
        .as_deref()
        .is_some_and(|accept| accept.contains("text/html"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> FetchRequest {
        FetchRequest::get(url).unwrap()
    }

    #[test]
    fn stylesheets_and_scripts_are_static() {
        assert_eq!(
            classify(&get("https://site.example/css/style.css")),
            ResourceClass::StaticAsset
        );
        assert_eq!(
            classify(&get("https://site.example/js/app.js")),
            ResourceClass::StaticAsset
        );
        assert_eq!(
            classify(&get("https://site.example/")),
            ResourceClass::StaticAsset
        );
    }

    #[test]
    fn trusted_font_host_is_static() {
        assert_eq!(
            classify(&get("https://fonts.gstatic.com/s/roboto/v30/KFOm.woff2")),
            ResourceClass::StaticAsset
        );
    }

    #[test]
    fn ai_and_api_paths_are_api() {
        assert_eq!(
            classify(&get("https://site.example/ai/paraphrase")),
            ResourceClass::Api
        );
        assert_eq!(
            classify(&get("https://site.example/api/usage")),
            ResourceClass::Api
        );
        assert_eq!(
            classify(&get("https://site.example/health")),
            ResourceClass::Api
        );
    }

    #[test]
    fn html_document_load_is_navigation() {
        let request = FetchRequest::navigation("https://site.example/pages/about").unwrap();
        assert_eq!(classify(&request), ResourceClass::Navigation);
    }

    #[test]
    fn html_extension_classifies_static_before_navigation() {
        // First match wins: .html hits the static rule even on a document load
        let request = FetchRequest::navigation("https://site.example/pages/about.html").unwrap();
        assert_eq!(classify(&request), ResourceClass::StaticAsset);
    }

    #[test]
    fn non_get_passes_through() {
        let mut request = get("https://site.example/css/style.css");
        request.method = "POST".to_string();
        assert_eq!(classify(&request), ResourceClass::PassThrough);
    }

    #[test]
    fn non_network_scheme_passes_through() {
        let request = FetchRequest {
            method: "GET".to_string(),
            url: url::Url::parse("chrome-extension://abcdef/page.html").unwrap(),
            accept: None,
        };
        assert_eq!(classify(&request), ResourceClass::PassThrough);
    }

    #[test]
    fn plain_get_without_accept_passes_through() {
        assert_eq!(
            classify(&get("https://site.example/metrics")),
            ResourceClass::PassThrough
        );
    }
}
