//! Target containers and their fixed encoder profiles.
//!
//! Every file headed for the same container gets exactly the same encoder
//! arguments, so the normalized segments can later be joined by stream copy.

/// Target container formats with a dedicated profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// MPEG-4 Part 14 container
    Mp4,
    /// Matroska container
    Mkv,
    /// QuickTime container
    Mov,
    /// AVI container
    Avi,
    /// Windows Media container
    Wmv,
    /// WebM container
    Webm,
}

impl Container {
    /// Get the file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mkv => "mkv",
            Container::Mov => "mov",
            Container::Avi => "avi",
            Container::Wmv => "wmv",
            Container::Webm => "webm",
        }
    }

    /// The encoder profile used when normalizing into this container.
    pub fn profile(&self) -> &'static CodecProfile {
        match self {
            Container::Mp4 => &DEFAULT_PROFILE,
            Container::Mkv => &MKV_PROFILE,
            Container::Mov => &MOV_PROFILE,
            Container::Avi => &AVI_PROFILE,
            Container::Wmv => &WMV_PROFILE,
            Container::Webm => &WEBM_PROFILE,
        }
    }
}

impl std::str::FromStr for Container {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "mp4" | "m4v" => Ok(Container::Mp4),
            "mkv" | "matroska" => Ok(Container::Mkv),
            "mov" | "quicktime" => Ok(Container::Mov),
            "avi" => Ok(Container::Avi),
            "wmv" | "asf" => Ok(Container::Wmv),
            "webm" => Ok(Container::Webm),
            _ => Err(format!("Unknown container format: {}", s)),
        }
    }
}

/// How the video encoder trades size for quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateControl {
    /// Constant rate factor (`-crf`), used by x264 and VP9.
    Crf(u8),
    /// Fixed quantizer scale (`-q:v`), used by the older MPEG-4 family.
    Quantizer(u8),
}

/// A fixed set of encoder arguments applied to every file of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecProfile {
    pub name: &'static str,
    pub video_codec: &'static str,
    pub preset: Option<&'static str>,
    pub rate_control: RateControl,
    /// VP9 needs `-b:v 0` for pure constant-quality mode.
    pub video_bitrate: Option<&'static str>,
    pub pixel_format: Option<&'static str>,
    pub audio_codec: &'static str,
    pub audio_sample_rate: Option<u32>,
    pub audio_bitrate: Option<&'static str>,
    pub audio_channels: Option<u8>,
}

/// H.264/AAC in yuv420p: plays nearly everywhere. Also the fallback for
/// extensions without a profile of their own.
pub const DEFAULT_PROFILE: CodecProfile = CodecProfile {
    name: "h264-aac",
    video_codec: "libx264",
    preset: Some("medium"),
    rate_control: RateControl::Crf(23),
    video_bitrate: None,
    pixel_format: Some("yuv420p"),
    audio_codec: "aac",
    audio_sample_rate: Some(44_100),
    audio_bitrate: Some("192k"),
    audio_channels: Some(2),
};

const MKV_PROFILE: CodecProfile = CodecProfile {
    name: "h264-aac-mkv",
    ..DEFAULT_PROFILE
};

const MOV_PROFILE: CodecProfile = CodecProfile {
    name: "h264-aac-mov",
    ..DEFAULT_PROFILE
};

const AVI_PROFILE: CodecProfile = CodecProfile {
    name: "mpeg4-mp3",
    video_codec: "mpeg4",
    preset: None,
    rate_control: RateControl::Quantizer(4),
    video_bitrate: None,
    pixel_format: Some("yuv420p"),
    audio_codec: "libmp3lame",
    audio_sample_rate: Some(44_100),
    audio_bitrate: Some("192k"),
    audio_channels: Some(2),
};

const WMV_PROFILE: CodecProfile = CodecProfile {
    name: "wmv2-wma",
    video_codec: "wmv2",
    audio_codec: "wmav2",
    ..AVI_PROFILE
};

const WEBM_PROFILE: CodecProfile = CodecProfile {
    name: "vp9-opus",
    video_codec: "libvpx-vp9",
    preset: None,
    rate_control: RateControl::Crf(31),
    video_bitrate: Some("0"),
    pixel_format: Some("yuv420p"),
    audio_codec: "libopus",
    audio_sample_rate: Some(48_000),
    audio_bitrate: Some("128k"),
    audio_channels: Some(2),
};

/// Look up the profile for a target extension, falling back to
/// [`DEFAULT_PROFILE`] for anything unrecognized.
pub fn resolve_profile(extension: &str) -> &'static CodecProfile {
    extension
        .parse::<Container>()
        .map(|c| c.profile())
        .unwrap_or(&DEFAULT_PROFILE)
}

impl CodecProfile {
    /// Encoder arguments for this profile, in ffmpeg order.
    pub fn encoder_args(&self) -> Vec<String> {
        let mut args = vec!["-c:v".to_string(), self.video_codec.to_string()];

        if let Some(preset) = self.preset {
            args.extend(["-preset".to_string(), preset.to_string()]);
        }

        match self.rate_control {
            RateControl::Crf(crf) => args.extend(["-crf".to_string(), crf.to_string()]),
            RateControl::Quantizer(q) => args.extend(["-q:v".to_string(), q.to_string()]),
        }

        if let Some(bitrate) = self.video_bitrate {
            args.extend(["-b:v".to_string(), bitrate.to_string()]);
        }
        if let Some(pix_fmt) = self.pixel_format {
            args.extend(["-pix_fmt".to_string(), pix_fmt.to_string()]);
        }

        args.extend(["-c:a".to_string(), self.audio_codec.to_string()]);

        if let Some(rate) = self.audio_sample_rate {
            args.extend(["-ar".to_string(), rate.to_string()]);
        }
        if let Some(bitrate) = self.audio_bitrate {
            args.extend(["-b:a".to_string(), bitrate.to_string()]);
        }
        if let Some(channels) = self.audio_channels {
            args.extend(["-ac".to_string(), channels.to_string()]);
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_extension() {
        assert_eq!(Container::Mkv.extension(), "mkv");
        assert_eq!(Container::Mp4.extension(), "mp4");
        assert_eq!(Container::Wmv.extension(), "wmv");
    }

    #[test]
    fn test_container_from_str() {
        assert_eq!("mkv".parse::<Container>().ok(), Some(Container::Mkv));
        assert_eq!("MKV".parse::<Container>().ok(), Some(Container::Mkv));
        assert_eq!(".mp4".parse::<Container>().ok(), Some(Container::Mp4));
        assert_eq!("unknown".parse::<Container>().ok(), None);
    }

    #[test]
    fn test_unknown_extension_falls_back_to_default() {
        let first = resolve_profile("flv");
        let second = resolve_profile("flv");
        assert_eq!(first, &DEFAULT_PROFILE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_known_extensions_resolve() {
        assert_eq!(resolve_profile("mp4").video_codec, "libx264");
        assert_eq!(resolve_profile("AVI").video_codec, "mpeg4");
        assert_eq!(resolve_profile("wmv").audio_codec, "wmav2");
        assert_eq!(resolve_profile("webm").audio_sample_rate, Some(48_000));
    }

    #[test]
    fn test_default_encoder_args() {
        let args = DEFAULT_PROFILE.encoder_args();
        assert_eq!(
            args,
            [
                "-c:v", "libx264", "-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p",
                "-c:a", "aac", "-ar", "44100", "-b:a", "192k", "-ac", "2",
            ]
        );
    }

    #[test]
    fn test_quantizer_profile_args() {
        let args = resolve_profile("avi").encoder_args();
        assert!(args.windows(2).any(|w| w == ["-q:v", "4"]));
        assert!(!args.contains(&"-preset".to_string()));
    }
}
