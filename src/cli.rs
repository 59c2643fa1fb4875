use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidmerge")]
#[command(
    author,
    version,
    about = "Convert every video in a folder to one format and merge them into a single file"
)]
pub struct Cli {
    /// Folder containing the videos to merge
    #[arg(required_unless_present = "check_tools")]
    pub input: Option<PathBuf>,

    /// Output folder (default: <INPUT>/converted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target container format, e.g. mp4, mkv, avi
    #[arg(short, long)]
    pub format: Option<String>,

    /// File name of the merged video (default: merged_video.<FORMAT>)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Frame rate every converted file is forced to
    #[arg(long)]
    pub fps: Option<u32>,

    /// Number of files to convert at the same time
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Skip the ffprobe check before converting each file
    #[arg(long)]
    pub no_probe: bool,

    /// Time limit for each ffmpeg/ffprobe run, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Check that ffmpeg and ffprobe are available, then exit
    #[arg(long)]
    pub check_tools: bool,
}
