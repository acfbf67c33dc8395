//! Access-log request classification.
//!
//! A request is kept when it asks for HTML or carries JSON, and it is not
//! one of the host's own build artefacts.

use crate::info::RequestInfo;

/// Media types in `accept` that mark a page load.
const PAGE_TYPES: &[&str] = &["text/html", "application/xhtml"];

/// Media types in `content-type` that mark an API call.
const API_TYPES: &[&str] = &["application/json"];

/// URL marker of the host's internal static assets.
pub const DEFAULT_ASSET_MARKER: &str = "/_nuxt/";

/// Inputs of [`is_loggable`] besides the request itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// When `false`, every request is loggable.
    pub perform_header_checks: bool,
    /// Requests whose URL contains this substring are never logged.
    pub asset_marker: String,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            perform_header_checks: true,
            asset_marker: DEFAULT_ASSET_MARKER.to_owned(),
        }
    }
}

/// Decides whether `info` deserves an access-log line.
pub fn is_loggable(info: &RequestInfo, opts: &ClassifyOptions) -> bool {
    if !opts.perform_header_checks {
        return true;
    }

    let html_or_json = header_contains(info, "accept", PAGE_TYPES)
        || header_contains(info, "content-type", API_TYPES);
    let internal_asset = info.url.contains(opts.asset_marker.as_str());

    html_or_json && !internal_asset
}

/// True when any value of header `name` contains any of `needles`, ignoring
/// ASCII case. An absent header matches nothing.
fn header_contains(info: &RequestInfo, name: &str, needles: &[&str]) -> bool {
    info.header_values(name).any(|value| {
        let value = value.to_ascii_lowercase();
        needles.iter().any(|needle| value.contains(needle))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::info::HeaderField;

    fn info(url: &str, headers: &[(&str, &str)]) -> RequestInfo {
        let headers: BTreeMap<String, HeaderField> = headers
            .iter()
            .map(|(k, v)| (k.to_string(), HeaderField::One(v.to_string())))
            .collect();
        RequestInfo { url: url.to_owned(), method: "GET".to_owned(), headers, remote_addr: None }
    }

    fn checked() -> ClassifyOptions {
        ClassifyOptions::default()
    }

    fn unchecked() -> ClassifyOptions {
        ClassifyOptions { perform_header_checks: false, ..ClassifyOptions::default() }
    }

    #[test]
    fn everything_is_loggable_without_header_checks() {
        for req in [
            info("/_nuxt/app.js", &[]),
            info("/img.png", &[("accept", "image/png")]),
            info("/", &[]),
        ] {
            assert!(is_loggable(&req, &unchecked()), "{}", req.url);
        }
    }

    #[test]
    fn html_page_is_loggable() {
        assert!(is_loggable(&info("/about", &[("accept", "text/html")]), &checked()));
        assert!(is_loggable(
            &info("/about", &[("accept", "text/html,application/xhtml+xml,*/*;q=0.8")]),
            &checked()
        ));
        assert!(is_loggable(&info("/x", &[("accept", "application/xhtml+xml")]), &checked()));
    }

    #[test]
    fn media_type_match_ignores_case() {
        assert!(is_loggable(&info("/about", &[("accept", "Text/HTML")]), &checked()));
    }

    #[test]
    fn json_body_is_loggable() {
        let req = info("/api/users", &[("accept", "*/*"), ("content-type", "application/json; charset=utf-8")]);
        assert!(is_loggable(&req, &checked()));
    }

    #[test]
    fn internal_assets_are_never_logged() {
        for headers in [
            &[("accept", "text/html")][..],
            &[("content-type", "application/json")][..],
            &[][..],
        ] {
            assert!(!is_loggable(&info("/_nuxt/app.js", headers), &checked()));
        }
    }

    #[test]
    fn binary_download_is_not_loggable() {
        assert!(!is_loggable(&info("/file.bin", &[("accept", "application/octet-stream")]), &checked()));
        assert!(!is_loggable(
            &info("/file.bin", &[("accept", "application/octet-stream"), ("content-type", "text/plain")]),
            &checked()
        ));
    }

    #[test]
    fn missing_headers_are_not_loggable() {
        assert!(!is_loggable(&info("/about", &[]), &checked()));
    }

    #[test]
    fn any_value_of_a_repeated_header_matches() {
        let mut req = info("/about", &[]);
        req.headers.insert(
            "accept".to_owned(),
            HeaderField::Many(vec!["image/webp".into(), "text/html".into()]),
        );
        assert!(is_loggable(&req, &checked()));
    }

    #[test]
    fn custom_asset_marker() {
        let opts = ClassifyOptions { asset_marker: "/static/".to_owned(), ..ClassifyOptions::default() };
        assert!(!is_loggable(&info("/static/page.html", &[("accept", "text/html")]), &opts));
        assert!(is_loggable(&info("/_nuxt/page", &[("accept", "text/html")]), &opts));
    }
}
