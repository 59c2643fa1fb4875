//! ffprobe-based stream inspection.
//!
//! Probing is a go/no-go check run before each transcode. The parsed
//! [`StreamSummary`] is only used for diagnostics.

use crate::command::ToolCommand;
use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
}

/// The first video and audio stream of a probed file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSummary {
    pub video_codec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_rate: Option<f64>,
    pub audio_codec: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
}

impl fmt::Display for StreamSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.video_codec {
            Some(codec) => {
                write!(f, "video {codec}")?;
                if let (Some(w), Some(h)) = (self.width, self.height) {
                    write!(f, " {w}x{h}")?;
                }
                if let Some(fps) = self.frame_rate {
                    write!(f, " @ {fps:.3} fps")?;
                }
            }
            None => write!(f, "no video")?,
        }
        match &self.audio_codec {
            Some(codec) => {
                write!(f, ", audio {codec}")?;
                if let Some(rate) = self.sample_rate {
                    write!(f, " {rate} Hz")?;
                }
                if let Some(ch) = self.channels {
                    write!(f, " {ch}ch")?;
                }
                Ok(())
            }
            None => write!(f, ", no audio"),
        }
    }
}

/// Run ffprobe against `path` and return its raw JSON stream listing.
///
/// # Errors
///
/// Any non-zero exit, a missing binary, or a timeout.
pub async fn probe_streams(ffprobe: &Path, path: &Path, timeout: Duration) -> Result<String> {
    let output = ToolCommand::new(ffprobe.to_path_buf())
        .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
        .arg(path.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;
    Ok(output.stdout)
}

/// Parse ffprobe's `-show_streams` JSON into a [`StreamSummary`].
pub fn parse_streams(json: &str) -> Result<StreamSummary> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| Error::parse_error("ffprobe", e.to_string()))?;

    let mut summary = StreamSummary::default();

    for stream in output.streams {
        match stream.codec_type.as_deref() {
            Some("video") if summary.video_codec.is_none() => {
                summary.video_codec = Some(stream.codec_name.unwrap_or_default());
                summary.width = stream.width;
                summary.height = stream.height;
                summary.frame_rate = stream.r_frame_rate.and_then(|s| parse_frame_rate(&s));
            }
            Some("audio") if summary.audio_codec.is_none() => {
                summary.audio_codec = Some(stream.codec_name.unwrap_or_default());
                summary.sample_rate = stream.sample_rate.and_then(|s| s.parse().ok());
                summary.channels = stream.channels;
            }
            _ => {}
        }
    }

    Ok(summary)
}

fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let parts: Vec<&str> = rate_str.split('/').collect();
    if parts.len() == 2 {
        let num: f64 = parts[0].parse().ok()?;
        let den: f64 = parts[1].parse().ok()?;
        if den != 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate_str.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("24000/1001"), Some(23.976023976023978));
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("invalid"), None);
    }

    #[test]
    fn test_parse_streams_picks_first_of_each_kind() {
        let json = r#"{
            "streams": [
                {"index": 0, "codec_type": "video", "codec_name": "hevc",
                 "width": 1920, "height": 1080, "r_frame_rate": "30000/1001"},
                {"index": 1, "codec_type": "audio", "codec_name": "ac3",
                 "sample_rate": "48000", "channels": 6},
                {"index": 2, "codec_type": "audio", "codec_name": "aac",
                 "sample_rate": "44100", "channels": 2},
                {"index": 3, "codec_type": "subtitle", "codec_name": "subrip"}
            ]
        }"#;

        let summary = parse_streams(json).unwrap();
        assert_eq!(summary.video_codec.as_deref(), Some("hevc"));
        assert_eq!(summary.width, Some(1920));
        assert_eq!(summary.audio_codec.as_deref(), Some("ac3"));
        assert_eq!(summary.sample_rate, Some(48000));
        assert_eq!(summary.channels, Some(6));
        assert_eq!(
            summary.to_string(),
            "video hevc 1920x1080 @ 29.970 fps, audio ac3 48000 Hz 6ch"
        );
    }

    #[test]
    fn test_parse_streams_without_audio() {
        let summary =
            parse_streams(r#"{"streams":[{"codec_type":"video","codec_name":"mpeg4"}]}"#).unwrap();
        assert_eq!(summary.to_string(), "video mpeg4, no audio");
    }

    #[test]
    fn test_parse_streams_rejects_garbage() {
        let err = parse_streams("not json").unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }
}
