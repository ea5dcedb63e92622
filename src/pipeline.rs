use std::collections::HashMap;
use std::path::{Path, PathBuf};

use eyre::Result;
use log::{info, warn};
use serde::Serialize;

use crate::VideoRecord;
use crate::extract::{extract_channel_id, extract_video_id};
use crate::output::{read_column, timestamped_path, write_rows};
use crate::youtube::YouTubeApi;

/// How many of a channel's most recent videos feed the view average.
const AVERAGE_WINDOW: usize = 10;

/// Progress emitted by the pipelines. The shell decides how to render
/// these; the pipelines never touch the terminal themselves.
#[derive(Debug, Clone)]
pub enum Progress {
    /// Working on item `current` of `total`, identified by `label`.
    Item { current: usize, total: usize, label: String },
    /// An item was dropped without producing output.
    Skipped { label: String, reason: String },
    /// The run finished and the output file is in place.
    Done { output: PathBuf, rows: usize },
}

pub type ProgressFn<'a> = &'a mut dyn FnMut(Progress);

/// Output row of the video-report pipeline. Headers match the exported
/// spreadsheet column names; field order must match [`VIDEO_HEADERS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoReportRow {
    pub url: String,
    pub channel_title: String,
    pub title: String,
    pub view_count: String,
    pub collected_at: String,
}

pub const VIDEO_HEADERS: [&str; 5] =
    ["Ссылка", "Название канала", "Название видео", "Просмотры", "Дата сбора"];

/// Output row of the channel-keyword pipeline; field order must match
/// [`KEYWORD_HEADERS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordHitRow {
    pub channel_title: String,
    pub url: String,
    pub title: String,
    pub keyword: String,
    pub average_views: u64,
}

pub const KEYWORD_HEADERS: [&str; 5] =
    ["Канал", "Ссылка", "Название видео", "Ключевое слово", "Средние просмотры"];

/// One keyword per line; trimmed, lower-cased, blanks discarded.
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Average view count over the first [`AVERAGE_WINDOW`] records, floor
/// division. An empty slice averages to 0 rather than dividing by zero.
pub fn average_views(records: &[VideoRecord]) -> u64 {
    let head = &records[..records.len().min(AVERAGE_WINDOW)];
    let sum: u64 = head
        .iter()
        .map(|r| r.view_count.parse::<u64>().unwrap_or(0))
        .sum();
    sum / head.len().max(1) as u64
}

/// One row per (record, keyword) pair whose keyword appears in the
/// record's lower-cased description. A video matching several keywords
/// contributes several rows.
pub fn keyword_rows(records: &[VideoRecord], keywords: &[String], average_views: u64) -> Vec<KeywordHitRow> {
    let mut rows = Vec::new();
    for record in records {
        let description = record.description.to_lowercase();
        for keyword in keywords {
            if description.contains(keyword.as_str()) {
                rows.push(KeywordHitRow {
                    channel_title: record.channel_title.clone(),
                    url: format!("https://youtu.be/{}", record.video_id),
                    title: record.title.clone(),
                    keyword: keyword.clone(),
                    average_views,
                });
            }
        }
    }
    rows
}

/// Video-report pipeline: extract IDs from a `url` column, batch-fetch
/// their metadata, and export one row per fetched record.
pub async fn process_csv_video(
    api: &YouTubeApi,
    input: &Path,
    progress: ProgressFn<'_>,
) -> Result<PathBuf> {
    let urls = read_column(input, "url")?;

    let mut video_ids = Vec::new();
    let mut url_map: HashMap<String, String> = HashMap::new();
    for url in &urls {
        match extract_video_id(url) {
            Some(id) => {
                // Last URL wins when two URLs carry the same ID.
                url_map.insert(id.clone(), url.clone());
                video_ids.push(id);
            }
            None => {
                warn!("no video ID in {url}, skipping");
                progress(Progress::Skipped {
                    label: url.clone(),
                    reason: "no video ID in URL".to_string(),
                });
            }
        }
    }

    let records = api.fetch_video_records(&video_ids).await?;

    let total = records.len();
    let mut rows = Vec::with_capacity(total);
    for (idx, record) in records.iter().enumerate() {
        let url = url_map
            .get(&record.video_id)
            .cloned()
            .unwrap_or_else(|| "N/A".to_string());
        progress(Progress::Item { current: idx + 1, total, label: url.clone() });
        rows.push(VideoReportRow {
            url,
            channel_title: record.channel_title.clone(),
            title: record.title.clone(),
            view_count: record.view_count.clone(),
            collected_at: record.collected_at.clone(),
        });
    }

    let output = timestamped_path("video_stats");
    write_rows(&output, &VIDEO_HEADERS, &rows)?;
    info!("video report: {} rows -> {}", rows.len(), output.display());
    progress(Progress::Done { output: output.clone(), rows: rows.len() });
    Ok(output)
}

/// Channel-keyword pipeline: resolve each `channel_url`, walk its recent
/// uploads, and export one row per (video, matched keyword), annotated
/// with the channel's average view count.
pub async fn analyze_channels(
    api: &YouTubeApi,
    input: &Path,
    keywords_text: &str,
    progress: ProgressFn<'_>,
) -> Result<PathBuf> {
    let urls = read_column(input, "channel_url")?;
    let keywords = parse_keywords(keywords_text);

    let total = urls.len();
    let mut rows = Vec::new();
    for (idx, url) in urls.iter().enumerate() {
        progress(Progress::Item { current: idx + 1, total, label: url.clone() });
        info!("processing channel {url}");

        let Some(channel_id) = extract_channel_id(api, url).await? else {
            warn!("could not resolve channel for {url}, skipping");
            progress(Progress::Skipped {
                label: url.clone(),
                reason: "channel not resolved".to_string(),
            });
            continue;
        };

        let video_ids = api.list_recent_uploads(&channel_id).await?;
        let records = api.fetch_video_records(&video_ids).await?;
        let average = average_views(&records);
        rows.extend(keyword_rows(&records, &keywords, average));
    }

    let output = timestamped_path("channel_keyword_stats");
    write_rows(&output, &KEYWORD_HEADERS, &rows)?;
    info!("channel keyword report: {} rows -> {}", rows.len(), output.display());
    progress(Progress::Done { output: output.clone(), rows: rows.len() });
    Ok(output)
}
