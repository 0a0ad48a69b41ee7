//! Interpretation of engine-reported stream metadata.
//!
//! Encoders disagree on where the station identity goes: some send a
//! dedicated station field, others repurpose the display title, many send
//! neither. [`resolve_stream_name`] applies a fixed preference order so the
//! notification title stays stable across those variants.

use bridge_traits::StreamMetadata;

/// Track metadata extracted from a metadata-changed event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackInfo {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub stream_name: Option<String>,
}

/// Trim and drop blank values.
pub fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Pick the stream display name.
///
/// 1. engine-supplied station name
/// 2. display title, when it differs from the track title
/// 3. the current stream name
pub fn resolve_stream_name(metadata: &StreamMetadata, current: Option<&str>) -> Option<String> {
    if let Some(station) = normalize(metadata.station.as_deref()) {
        return Some(station);
    }

    let title = normalize(metadata.title.as_deref());
    if let Some(display) = normalize(metadata.display_title.as_deref()) {
        if title.as_deref() != Some(display.as_str()) {
            return Some(display);
        }
    }

    current.map(str::to_string)
}

/// Extract artist, title and stream name from `metadata`.
pub fn extract(metadata: &StreamMetadata, current_name: Option<&str>) -> TrackInfo {
    TrackInfo {
        artist: normalize(metadata.artist.as_deref()),
        title: normalize(metadata.title.as_deref()),
        stream_name: resolve_stream_name(metadata, current_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_wins() {
        let meta = StreamMetadata {
            station: Some("Jazz FM".into()),
            display_title: Some("Something else".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_stream_name(&meta, Some("Requested")),
            Some("Jazz FM".to_string())
        );
    }

    #[test]
    fn display_title_used_when_distinct_from_title() {
        let meta = StreamMetadata {
            title: Some("Song".into()),
            display_title: Some("Late Night Jazz".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_stream_name(&meta, Some("Requested")),
            Some("Late Night Jazz".to_string())
        );
    }

    #[test]
    fn display_title_equal_to_title_is_ignored() {
        let meta = StreamMetadata {
            title: Some("Song".into()),
            display_title: Some(" Song ".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_stream_name(&meta, Some("Requested")),
            Some("Requested".to_string())
        );
    }

    #[test]
    fn blank_values_fall_through() {
        let meta = StreamMetadata {
            station: Some("   ".into()),
            display_title: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(resolve_stream_name(&meta, None), None);
    }

    #[test]
    fn extract_normalizes_track_fields() {
        let meta = StreamMetadata::track("  Artist ", "");
        let info = extract(&meta, Some("Radio"));
        assert_eq!(info.artist.as_deref(), Some("Artist"));
        assert!(info.title.is_none());
        assert_eq!(info.stream_name.as_deref(), Some("Radio"));
    }
}
