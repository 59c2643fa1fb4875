mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    normalize_config(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./vidmerge.toml", "~/.config/vidmerge/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Bring user-supplied spellings to canonical form: the output format loses
/// any leading dot and is lowercased.
pub fn normalize_config(config: &mut Config) {
    config.output.format = config
        .output
        .format
        .trim_start_matches('.')
        .to_lowercase();
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let format = &config.output.format;
    if format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric()) {
        anyhow::bail!("Output format must be a plain extension like 'mp4', got {:?}", format);
    }

    if let Some(name) = &config.output.filename {
        if name.is_empty() || name.contains(['/', '\\']) {
            anyhow::bail!("Output filename must be a bare file name, got {:?}", name);
        }
        let reserved = format!("_converted.{}", format);
        if name.to_lowercase().ends_with(&reserved.to_lowercase()) {
            anyhow::bail!(
                "Output filename {:?} would be taken for a converted segment; pick a name not ending in {:?}",
                name,
                reserved
            );
        }
    }

    if config.output.manifest.is_empty() || config.output.manifest.contains(['/', '\\']) {
        anyhow::bail!(
            "Manifest name must be a bare file name, got {:?}",
            config.output.manifest
        );
    }

    if config.transcode.fps == 0 {
        anyhow::bail!("Frame rate cannot be 0");
    }

    if config.transcode.jobs == 0 {
        anyhow::bail!("Concurrent jobs cannot be 0");
    }

    if config.tools.timeout_secs == 0 {
        anyhow::bail!("Tool timeout cannot be 0");
    }

    config
        .logging
        .level
        .parse::<tracing::Level>()
        .map_err(|_| anyhow::anyhow!("Unknown log level: {:?}", config.logging.level))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output.format, "mp4");
        assert_eq!(config.output.merged_filename(), "merged_video.mp4");
        assert_eq!(config.output.manifest, "video_list.txt");
        assert_eq!(config.transcode.fps, 30);
        assert_eq!(config.transcode.jobs, 1);
        assert!(config.transcode.probe);
        assert_eq!(config.tools.timeout_secs, 3600);
        assert_eq!(config.logging.level, "info");
        validate_config(&config).unwrap();
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[output]
format = "mkv"

[transcode]
fps = 25
jobs = 2

[tools]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.output.format, "mkv");
        assert_eq!(config.output.merged_filename(), "merged_video.mkv");
        assert_eq!(config.transcode.fps, 25);
        assert_eq!(config.transcode.jobs, 2);
        assert!(config.transcode.probe);
        assert_eq!(
            config.tools.ffmpeg_path.as_deref(),
            Some(Path::new("/opt/ffmpeg/bin/ffmpeg"))
        );
        assert_eq!(config.tools.timeout_secs, 3600);
    }

    #[test]
    fn test_rejects_zero_fps() {
        let mut config = Config::default();
        config.transcode.fps = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_format() {
        let mut config = Config::default();
        config.output.format = "../mp4".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_filename_with_separator() {
        let mut config = Config::default();
        config.output.filename = Some("out/merged.mp4".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_filename_shaped_like_a_segment() {
        let mut config = Config::default();
        config.output.filename = Some("a_converted.mp4".to_string());
        assert!(validate_config(&config).is_err());

        config.output.filename = Some("A_CONVERTED.MP4".to_string());
        assert!(validate_config(&config).is_err());

        config.output.filename = Some("a_converted.mkv".to_string());
        validate_config(&config).unwrap();
    }

    #[test]
    fn test_load_normalizes_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[output]
format = ".MKV"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.output.format, "mkv");
        assert_eq!(config.output.merged_filename(), "merged_video.mkv");
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "chatty".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        assert!(load_config_or_default(Some(Path::new("/nonexistent/vidmerge.toml"))).is_err());
    }
}
