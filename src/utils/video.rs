// src/utils/video.rs

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Canonical YouTube video id: exactly 11 URL-safe characters.
static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// Extracts the video id from the common YouTube URL shapes:
/// `youtube.com/watch?v=ID`, `youtu.be/ID`, and `/embed/ID`, `/v/ID`,
/// `/e/ID`, `/shorts/ID` paths. Returns `None` for anything else.
pub fn extract_youtube_id(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.");

    let candidate = match host {
        "youtu.be" => parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" => {
            if parsed.path() == "/watch" {
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())
            } else {
                let mut segments = parsed.path_segments()?;
                match segments.next() {
                    Some("embed") | Some("v") | Some("e") | Some("shorts") => {
                        segments.next().map(str::to_string)
                    }
                    _ => None,
                }
            }
        }
        _ => None,
    }?;

    VIDEO_ID.is_match(&candidate).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_watch_url() {
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn extracts_from_short_link() {
        assert_eq!(
            extract_youtube_id("https://youtu.be/dQw4w9WgXcQ?t=42"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn extracts_from_embed_path() {
        assert_eq!(
            extract_youtube_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn rejects_non_youtube_hosts() {
        assert_eq!(extract_youtube_id("https://vimeo.com/123456789"), None);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!(extract_youtube_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(extract_youtube_id("not a url at all"), None);
    }
}
