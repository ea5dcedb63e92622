use eyre::Result;
use log::debug;
use url::Url;

use crate::youtube::YouTubeApi;

/// Extract a video ID from a YouTube URL.
///
/// Short links carry the ID in the path; watch URLs carry it in the `v`
/// query parameter. Anything else yields None. No network call.
pub fn extract_video_id(input: &str) -> Option<String> {
    let parsed = Url::parse(input.trim()).ok()?;
    let host = parsed.host_str()?;

    if host.contains("youtu.be") {
        let id = parsed.path().trim_matches('/');
        if id.is_empty() {
            return None;
        }
        return Some(id.to_string());
    }

    if host.contains("youtube.com") {
        return parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned());
    }

    None
}

/// What a channel URL resolves to without touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// Canonical `/channel/<id>` URL; the ID is final.
    Id(String),
    /// `user/`, `c/`, or `@` path; needs a search call to resolve.
    Handle(String),
}

/// Parse a channel URL into either a final ID or a handle to resolve.
pub fn parse_channel_url(url: &str) -> Option<ChannelRef> {
    if let Some(rest) = url.split("/channel/").nth(1) {
        let id = rest.split('/').next().unwrap_or(rest);
        if id.is_empty() {
            return None;
        }
        return Some(ChannelRef::Id(id.to_string()));
    }

    let parsed = Url::parse(url).ok()?;
    let path = parsed.path().trim_matches('/');

    if path.starts_with("user/") || path.starts_with("c/") || path.starts_with('@') {
        // Second segment when the path has one, otherwise the whole path
        // (bare @handle).
        let identifier = if path.contains('/') {
            path.split('/').nth(1).unwrap_or(path)
        } else {
            path
        };
        if identifier.is_empty() {
            return None;
        }
        return Some(ChannelRef::Handle(identifier.to_string()));
    }

    None
}

/// Resolve a channel URL to a channel ID.
///
/// Canonical URLs resolve locally; handle/vanity URLs cost exactly one
/// search call. Ok(None) means the URL was unparseable or the search came
/// back empty — callers skip the channel. Network errors propagate.
pub async fn extract_channel_id(api: &YouTubeApi, url: &str) -> Result<Option<String>> {
    match parse_channel_url(url) {
        Some(ChannelRef::Id(id)) => Ok(Some(id)),
        Some(ChannelRef::Handle(identifier)) => {
            debug!("resolving handle {identifier} via search");
            api.search_channel_id(&identifier).await
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_link_trailing_slash() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ/"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_missing_v() {
        assert_eq!(extract_video_id("https://www.youtube.com/watch?list=PL123"), None);
    }

    #[test]
    fn test_other_host() {
        assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
    }

    #[test]
    fn test_not_a_url() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_channel_url_canonical() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/channel/UCdeadbeef/videos"),
            Some(ChannelRef::Id("UCdeadbeef".to_string()))
        );
    }

    #[test]
    fn test_channel_url_canonical_bare() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/channel/UCdeadbeef"),
            Some(ChannelRef::Id("UCdeadbeef".to_string()))
        );
    }

    #[test]
    fn test_channel_url_user() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/user/somebody"),
            Some(ChannelRef::Handle("somebody".to_string()))
        );
    }

    #[test]
    fn test_channel_url_c_path() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/c/SomeChannel"),
            Some(ChannelRef::Handle("SomeChannel".to_string()))
        );
    }

    #[test]
    fn test_channel_url_handle() {
        assert_eq!(
            parse_channel_url("https://www.youtube.com/@somehandle"),
            Some(ChannelRef::Handle("@somehandle".to_string()))
        );
    }

    #[test]
    fn test_channel_url_other_shape() {
        assert_eq!(parse_channel_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), None);
    }
}
