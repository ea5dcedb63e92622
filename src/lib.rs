pub mod config;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod youtube;

/// Normalized metadata for one video, as returned by the batch fetcher.
///
/// View counts stay string-encoded the way the Data API delivers them; the
/// collection date is stamped at fetch time, not at publish time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub video_id: String,
    pub channel_title: String,
    pub title: String,
    pub description: String,
    pub view_count: String,
    pub collected_at: String,
}
