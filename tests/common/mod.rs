//! Shared test harness: fake ffmpeg/ffprobe scripts and input folders.
//!
//! The fake ffmpeg writes `segment:<input>` for a transcode and copies the
//! manifest verbatim for a concat, so tests can read back exactly what was
//! joined. Inputs whose path contains `__broken__` fail to convert, inputs
//! containing `__hang__` stall, and ffprobe rejects `__unreadable__`.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use vidmerge_av::{Diagnostics, Level, ToolPaths};

const CONCAT_OK: &str = r#"cat "$input" > "$out"; exit 0"#;
const CONCAT_FAIL: &str = r#"echo "Impossible to open '$input'" >&2; exit 1"#;

pub struct FakeTools {
    dir: TempDir,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub log: PathBuf,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::build(CONCAT_OK)
    }

    /// Transcodes behave normally but the final concat exits non-zero.
    pub fn with_failing_concat() -> Self {
        Self::build(CONCAT_FAIL)
    }

    fn build(concat_body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("invocations.log");
        let ffmpeg = dir.path().join("ffmpeg");
        let ffprobe = dir.path().join("ffprobe");

        let ffmpeg_script = format!(
            r#"#!/bin/sh
if [ "$1" = "-version" ]; then echo "ffmpeg version 7.0-fake"; exit 0; fi
echo "$*" >> '{log}'
input=""
out=""
prev=""
concat=0
for arg in "$@"; do
  if [ "$prev" = "-i" ]; then input="$arg"; fi
  if [ "$prev" = "-f" ] && [ "$arg" = "concat" ]; then concat=1; fi
  prev="$arg"
  out="$arg"
done
if [ "$concat" = 1 ]; then
  {concat_body}
fi
case "$input" in
  *__broken__*) echo "simulated encoder error: $input" >&2; exit 1 ;;
  *__hang__*) sleep 5 ;;
esac
printf 'segment:%s\n' "$input" > "$out"
"#,
            log = log.display(),
        );

        let ffprobe_script = r#"#!/bin/sh
if [ "$1" = "-version" ]; then echo "ffprobe version 7.0-fake"; exit 0; fi
for last; do :; done
case "$last" in
  *__unreadable__*) echo "Invalid data found when processing input" >&2; exit 1 ;;
esac
echo '{"streams":[{"codec_type":"video","codec_name":"h264","width":640,"height":360,"r_frame_rate":"30/1"}]}'
"#;

        write_script(&ffmpeg, &ffmpeg_script);
        write_script(&ffprobe, ffprobe_script);

        Self {
            dir,
            ffmpeg,
            ffprobe,
            log,
        }
    }

    pub fn paths(&self) -> ToolPaths {
        ToolPaths {
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
        }
    }

    /// Every ffmpeg argument line, in call order.
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// A config file pointing vidmerge at these tools.
    pub fn config_file(&self, extra: &str) -> PathBuf {
        let path = self.dir.path().join("vidmerge.toml");
        let body = format!(
            "[tools]\nffmpeg_path = {:?}\nffprobe_path = {:?}\n\n{}",
            self.ffmpeg.display().to_string(),
            self.ffprobe.display().to_string(),
            extra
        );
        fs::write(&path, body).unwrap();
        path
    }

    pub fn concat_invocations(&self) -> usize {
        self.invocations()
            .iter()
            .filter(|line| line.contains("-f concat"))
            .count()
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// A temp folder holding empty files with the given names.
pub fn video_dir(names: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        fs::write(dir.path().join(name), b"").unwrap();
    }
    dir
}

/// Collects messages so tests can assert on the diagnostic trail.
#[derive(Default)]
pub struct RecordingDiagnostics {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingDiagnostics {
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn log(&self, level: Level, message: &str) {
        self.messages.lock().unwrap().push((level, message.to_string()));
    }
}
