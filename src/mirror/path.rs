// src/mirror/path.rs
// =============================================================================
// Maps a URL onto a file path inside the mirror root.
//
//   http://site            -> <root>/index.html
//   http://site/           -> <root>/index.html
//   http://site/docs/      -> <root>/docs/index.html
//   http://site/docs/readme -> <root>/docs/readme
//
// Only the URL path takes part in the mapping; query and fragment are ignored,
// so `/page?a=1` and `/page?a=2` land on the same file.
//
// NOTE: `..` segments are not sanitised. The `url` parser already removes dot
// segments from http(s) URLs, but a hostile percent-encoded segment can still
// decode to `..` here. Mirroring untrusted sites into a sensitive directory is
// the caller's risk.
// =============================================================================

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use url::Url;

/// Canonical file name for path-less and directory-style URLs.
pub const INDEX_FILE: &str = "index.html";

/// Returns the local path for `url` under `root`. Pure and infallible.
pub fn map_url_to_path(root: &Path, url: &Url) -> PathBuf {
    // Still percent-encoded here, e.g. "/a%20b/"
    let raw = url.path();
    let mut local = root.to_path_buf();

    // Bare host: the site root page
    if raw.is_empty() || raw == "/" {
        local.push(INDEX_FILE);
        return local;
    }

    // Pushing segment by segment gives us the platform separator for free.
    // Empty segments (from "//" or the leading "/") are skipped, otherwise
    // push("") would be a no-op anyway and push("/x") would replace the root
    for segment in raw.split('/').filter(|s| !s.is_empty()) {
        local.push(decode_segment(segment).as_ref());
    }

    // A file cannot live at a directory path, so `/docs/` gets an index too
    if raw.ends_with('/') {
        local.push(INDEX_FILE);
    }

    local
}

// Percent-decodes one path segment.
//
// Falls back to the raw segment when decoding yields invalid UTF-8 or a
// separator: an encoded `/` would otherwise turn into an extra directory, or an
// absolute path that replaces the root entirely.
fn decode_segment(segment: &str) -> Cow<'_, str> {
    match urlencoding::decode(segment) {
        Ok(decoded) if !decoded.contains('/') && !decoded.contains('\\') => decoded,
        _ => Cow::Borrowed(segment),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why PathBuf::push instead of format!("{}/{}", ...)?
//    - push() uses the right separator on every platform
//    - It also handles a root that does or does not end in a separator
//
// 2. What is Cow<'_, str>?
//    - "Clone on write": either a borrowed &str or an owned String
//    - urlencoding::decode only allocates when the segment had %XX escapes,
//      so most segments stay borrowed
//
// 3. Why ignore the query string?
//    - "?" is awkward in file names on some systems
//    - The mirror stores one file per path; the last writer wins
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn map(url: &str) -> PathBuf {
        map_url_to_path(Path::new("mirror"), &Url::parse(url).unwrap())
    }

    #[test]
    fn test_root_maps_to_index() {
        let expected = Path::new("mirror").join("index.html");
        assert_eq!(map("http://site/"), expected);
        assert_eq!(map("http://site"), expected);
    }

    #[test]
    fn test_nested_path() {
        assert_eq!(
            map("http://site/docs/readme"),
            Path::new("mirror").join("docs").join("readme")
        );
    }

    #[test]
    fn test_directory_url_gets_index() {
        assert_eq!(
            map("http://site/docs/"),
            Path::new("mirror").join("docs").join("index.html")
        );
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        assert_eq!(map("http://site/page?id=7#top"), map("http://site/page"));
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            map("http://site/my%20file.css"),
            Path::new("mirror").join("my file.css")
        );
    }

    #[test]
    fn test_encoded_slash_stays_one_segment() {
        assert_eq!(
            map("http://site/a%2Fb"),
            Path::new("mirror").join("a%2Fb")
        );
        assert_eq!(
            map("http://site/%2Fetc"),
            Path::new("mirror").join("%2Fetc")
        );
    }

    #[test]
    fn test_repeated_slashes_collapse() {
        assert_eq!(
            map("http://site//img//logo.png"),
            Path::new("mirror").join("img").join("logo.png")
        );
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(map("http://site/a/b.js"), map("http://site/a/b.js"));
    }
}
