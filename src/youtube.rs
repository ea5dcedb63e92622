use chrono::Local;
use eyre::{Result, bail};
use log::debug;
use serde::Deserialize;

use crate::VideoRecord;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Per-call ID ceiling of the videos.list endpoint.
pub const BATCH_SIZE: usize = 50;

/// How many recent uploads to collect per channel.
pub const UPLOADS_CAP: usize = 20;

/// Page size used when walking an uploads playlist.
const PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub snippet: VideoSnippet,
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub channel_title: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    channel_id: String,
}

/// YouTube Data API v3 client. Holds the shared HTTP client and key; every
/// caller receives a handle explicitly rather than reaching for a global.
pub struct YouTubeApi {
    client: reqwest::Client,
    api_key: String,
}

impl YouTubeApi {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{API_BASE}/{endpoint}");
        debug!("GET {endpoint} {query:?}");

        // Query builder keeps the key out of the URL we log.
        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("YouTube API returned {status} for {endpoint}: {body}");
        }

        Ok(resp.json().await?)
    }

    /// Resolve a handle or legacy username to a channel ID via a single
    /// search call. Returns None when the search comes back empty.
    pub async fn search_channel_id(&self, identifier: &str) -> Result<Option<String>> {
        let resp: SearchResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", identifier),
                    ("type", "channel"),
                    ("maxResults", "1"),
                ],
            )
            .await?;

        Ok(resp.items.into_iter().next().map(|item| item.snippet.channel_id))
    }

    /// Fetch snippet + statistics for up to [`BATCH_SIZE`] IDs in one call.
    async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoItem>> {
        let joined = ids.join(",");
        let resp: VideoListResponse = self
            .get_json("videos", &[("part", "snippet,statistics"), ("id", joined.as_str())])
            .await?;
        Ok(resp.items)
    }

    /// Fetch normalized records for an arbitrary number of video IDs,
    /// chunking into batches of [`BATCH_SIZE`].
    ///
    /// The API silently drops deleted/private IDs, so the result can be
    /// shorter than the input; index records by ID, never by position.
    pub async fn fetch_video_records(&self, video_ids: &[String]) -> Result<Vec<VideoRecord>> {
        let collected_at = Local::now().format("%Y-%m-%d").to_string();
        let mut records = Vec::with_capacity(video_ids.len());

        for chunk in video_ids.chunks(BATCH_SIZE) {
            for item in self.list_videos(chunk).await? {
                records.push(video_record(item, &collected_at));
            }
        }

        debug!("fetched {} records for {} ids", records.len(), video_ids.len());
        Ok(records)
    }

    /// Look up the channel's uploads playlist ID.
    async fn uploads_playlist(&self, channel_id: &str) -> Result<String> {
        let resp: ChannelListResponse = self
            .get_json("channels", &[("part", "contentDetails"), ("id", channel_id)])
            .await?;

        match resp.items.into_iter().next() {
            Some(item) => Ok(item.content_details.related_playlists.uploads),
            None => bail!("channel {channel_id} has no uploads playlist"),
        }
    }

    /// Collect up to [`UPLOADS_CAP`] recent video IDs from a channel's
    /// uploads playlist, paging until the cap or the last page is reached.
    pub async fn list_recent_uploads(&self, channel_id: &str) -> Result<Vec<String>> {
        let playlist_id = self.uploads_playlist(channel_id).await?;
        let max_results = PAGE_SIZE.to_string();

        let mut video_ids: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("part", "contentDetails"),
                ("playlistId", playlist_id.as_str()),
                ("maxResults", max_results.as_str()),
            ];
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.as_str()));
            }

            let resp: PlaylistItemsResponse = self.get_json("playlistItems", &query).await?;

            for item in resp.items {
                video_ids.push(item.content_details.video_id);
                if video_ids.len() >= UPLOADS_CAP {
                    break;
                }
            }
            if video_ids.len() >= UPLOADS_CAP {
                break;
            }

            match resp.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        video_ids.truncate(UPLOADS_CAP);
        Ok(video_ids)
    }
}

fn video_record(item: VideoItem, collected_at: &str) -> VideoRecord {
    VideoRecord {
        video_id: item.id,
        channel_title: item.snippet.channel_title,
        title: item.snippet.title,
        description: item.snippet.description.unwrap_or_default(),
        view_count: item
            .statistics
            .and_then(|s| s.view_count)
            .unwrap_or_else(|| "0".to_string()),
        collected_at: collected_at.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_list_response() {
        let json = r#"{
            "items": [
                {
                    "id": "abc123xyz00",
                    "snippet": {
                        "channelTitle": "DemoChan",
                        "title": "Demo Video",
                        "description": "Amazing Tutorial"
                    },
                    "statistics": { "viewCount": "5000" }
                }
            ]
        }"#;
        let resp: VideoListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.items.len(), 1);
        let item = &resp.items[0];
        assert_eq!(item.id, "abc123xyz00");
        assert_eq!(item.snippet.channel_title, "DemoChan");
        assert_eq!(item.statistics.as_ref().unwrap().view_count.as_deref(), Some("5000"));
    }

    #[test]
    fn test_video_record_defaults() {
        let json = r#"{
            "id": "abc123xyz00",
            "snippet": { "channelTitle": "DemoChan", "title": "Demo Video" }
        }"#;
        let item: VideoItem = serde_json::from_str(json).unwrap();
        let record = video_record(item, "2026-08-27");
        assert_eq!(record.view_count, "0");
        assert_eq!(record.description, "");
        assert_eq!(record.collected_at, "2026-08-27");
    }

    #[test]
    fn test_parse_channel_list_response() {
        let json = r#"{
            "items": [
                {
                    "contentDetails": {
                        "relatedPlaylists": { "uploads": "UUdeadbeef" }
                    }
                }
            ]
        }"#;
        let resp: ChannelListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.items[0].content_details.related_playlists.uploads, "UUdeadbeef");
    }

    #[test]
    fn test_parse_channel_list_response_empty() {
        let resp: ChannelListResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.items.is_empty());
    }

    #[test]
    fn test_parse_playlist_items_response() {
        let json = r#"{
            "items": [
                { "contentDetails": { "videoId": "vid00000001" } },
                { "contentDetails": { "videoId": "vid00000002" } }
            ],
            "nextPageToken": "CAUQAA"
        }"#;
        let resp: PlaylistItemsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.items.len(), 2);
        assert_eq!(resp.next_page_token.as_deref(), Some("CAUQAA"));
    }

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "items": [ { "snippet": { "channelId": "UCdeadbeef" } } ]
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.items[0].snippet.channel_id, "UCdeadbeef");
    }

    #[test]
    fn test_batch_chunking() {
        let ids: Vec<String> = (0..120).map(|i| format!("id{i:09}")).collect();
        let chunks: Vec<_> = ids.chunks(BATCH_SIZE).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 50);
        assert_eq!(chunks[1].len(), 50);
        assert_eq!(chunks[2].len(), 20);
    }
}
