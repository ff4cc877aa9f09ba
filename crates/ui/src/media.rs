//! Media panels shown next to a conversation: what each panel points at and
//! how its download action copies the source out.

use mathcast_core::logging::sanitize_path;
use mathcast_core::{MediaConfig, Result};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Upper bound on the transcript bytes held for the panel preview
pub const TRANSCRIPT_PREVIEW_BYTES: u64 = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Transcript,
    Audio,
}

impl MediaKind {
    pub fn title(&self) -> &'static str {
        match self {
            MediaKind::Video => "Video",
            MediaKind::Transcript => "Transcript",
            MediaKind::Audio => "Audio",
        }
    }

    /// Function key that downloads this panel's source
    pub fn download_key(&self) -> &'static str {
        match self {
            MediaKind::Video => "F2",
            MediaKind::Transcript => "F3",
            MediaKind::Audio => "F4",
        }
    }
}

/// Outcome of a download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    NothingToDownload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPanel {
    pub kind: MediaKind,
    pub source: Option<PathBuf>,
}

impl MediaPanel {
    pub fn file_name(&self) -> Option<String> {
        self.source
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn is_available(&self) -> bool {
        self.source.as_ref().is_some_and(|p| p.is_file())
    }
}

/// The Video, Transcript and Audio panels
#[derive(Debug, Clone)]
pub struct MediaPanels {
    panels: [MediaPanel; 3],
    download_dir: PathBuf,
    transcript_preview: Option<String>,
}

impl MediaPanels {
    pub fn new(config: &MediaConfig) -> Self {
        let transcript_preview = config.transcript.as_deref().and_then(|path| match read_preview(path) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(path = %sanitize_path(path), error = %e, "transcript preview unavailable");
                None
            }
        });

        Self {
            panels: [
                MediaPanel { kind: MediaKind::Video, source: config.video.clone() },
                MediaPanel { kind: MediaKind::Transcript, source: config.transcript.clone() },
                MediaPanel { kind: MediaKind::Audio, source: config.audio.clone() },
            ],
            download_dir: config.download_dir.clone(),
            transcript_preview,
        }
    }

    pub fn panel(&self, kind: MediaKind) -> &MediaPanel {
        match kind {
            MediaKind::Video => &self.panels[0],
            MediaKind::Transcript => &self.panels[1],
            MediaKind::Audio => &self.panels[2],
        }
    }

    /// Leading text of the transcript file, when it could be read
    pub fn transcript_preview(&self) -> Option<&str> {
        self.transcript_preview.as_deref()
    }

    /// Copy the panel's source into the download directory
    pub fn download(&self, kind: MediaKind) -> Result<DownloadOutcome> {
        let panel = self.panel(kind);
        let (Some(source), Some(name)) = (panel.source.as_ref(), source_file_name(panel)) else {
            return Ok(DownloadOutcome::NothingToDownload);
        };
        if !source.is_file() {
            return Ok(DownloadOutcome::NothingToDownload);
        }

        fs::create_dir_all(&self.download_dir)?;
        let target = self.download_dir.join(name);

        // Copying a file onto itself truncates it first.
        if target.exists() && fs::canonicalize(&target)? == fs::canonicalize(source)? {
            tracing::info!(kind = kind.title(), target = %sanitize_path(&target), "media already in download directory");
            return Ok(DownloadOutcome::Saved(target));
        }
        fs::copy(source, &target)?;

        tracing::info!(
            kind = kind.title(),
            source = %sanitize_path(source),
            target = %sanitize_path(&target),
            "media downloaded"
        );
        Ok(DownloadOutcome::Saved(target))
    }
}

/// Read at most [`TRANSCRIPT_PREVIEW_BYTES`], replacing invalid UTF-8
fn read_preview(path: &Path) -> std::io::Result<String> {
    let mut bytes = Vec::new();
    File::open(path)?.take(TRANSCRIPT_PREVIEW_BYTES).read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn source_file_name(panel: &MediaPanel) -> Option<&std::ffi::OsStr> {
    panel.source.as_ref().and_then(|p| p.file_name())
}

impl Default for MediaPanels {
    fn default() -> Self {
        Self::new(&MediaConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> MediaConfig {
        let video = dir.join("lesson.mp4");
        let transcript = dir.join("lesson.txt");
        fs::write(&video, b"fake video").unwrap();
        fs::write(&transcript, "A derivative measures change.").unwrap();

        MediaConfig {
            video: Some(video),
            transcript: Some(transcript),
            audio: None,
            download_dir: dir.join("downloads"),
        }
    }

    #[test]
    fn test_panels_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let panels = MediaPanels::new(&config_in(dir.path()));

        assert_eq!(panels.panel(MediaKind::Video).file_name().as_deref(), Some("lesson.mp4"));
        assert!(panels.panel(MediaKind::Video).is_available());
        assert!(!panels.panel(MediaKind::Audio).is_available());
        assert_eq!(panels.transcript_preview(), Some("A derivative measures change."));
    }

    #[test]
    fn test_download_copies_source() {
        let dir = tempfile::tempdir().unwrap();
        let panels = MediaPanels::new(&config_in(dir.path()));

        let outcome = panels.download(MediaKind::Video).unwrap();
        let expected = dir.path().join("downloads").join("lesson.mp4");
        assert_eq!(outcome, DownloadOutcome::Saved(expected.clone()));
        assert_eq!(fs::read(expected).unwrap(), b"fake video");
    }

    #[test]
    fn test_download_into_source_dir_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = MediaConfig { download_dir: dir.path().to_path_buf(), ..config_in(dir.path()) };
        let panels = MediaPanels::new(&config);

        let outcome = panels.download(MediaKind::Video).unwrap();
        assert_eq!(outcome, DownloadOutcome::Saved(dir.path().join("lesson.mp4")));
        assert_eq!(fs::read(dir.path().join("lesson.mp4")).unwrap(), b"fake video");

        fs::create_dir_all(dir.path().join("downloads")).unwrap();
        let relative = MediaConfig { download_dir: dir.path().join("downloads").join(".."), ..config };
        let panels = MediaPanels::new(&relative);
        assert!(matches!(panels.download(MediaKind::Transcript).unwrap(), DownloadOutcome::Saved(_)));
        assert_eq!(fs::read_to_string(dir.path().join("lesson.txt")).unwrap(), "A derivative measures change.");
    }

    #[test]
    fn test_transcript_preview_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("long.txt");
        let mut bytes = "x".repeat(TRANSCRIPT_PREVIEW_BYTES as usize * 4).into_bytes();
        bytes[0] = 0xff;
        fs::write(&transcript, &bytes).unwrap();

        let config = MediaConfig { transcript: Some(transcript), ..MediaConfig::default() };
        let preview = MediaPanels::new(&config).transcript_preview().unwrap().to_string();
        assert!(preview.starts_with('\u{fffd}'));
        assert!(preview.len() <= TRANSCRIPT_PREVIEW_BYTES as usize + 2);
    }

    #[test]
    fn test_unreadable_transcript_has_no_preview() {
        let dir = tempfile::tempdir().unwrap();
        let config = MediaConfig { transcript: Some(dir.path().join("missing.txt")), ..MediaConfig::default() };
        assert_eq!(MediaPanels::new(&config).transcript_preview(), None);
    }

    #[test]
    fn test_download_without_source() {
        let dir = tempfile::tempdir().unwrap();
        let panels = MediaPanels::new(&config_in(dir.path()));

        assert_eq!(panels.download(MediaKind::Audio).unwrap(), DownloadOutcome::NothingToDownload);
        assert!(!dir.path().join("downloads").exists());
    }

    #[test]
    fn test_download_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = MediaConfig {
            video: Some(dir.path().join("gone.mp4")),
            download_dir: dir.path().join("downloads"),
            ..MediaConfig::default()
        };
        let panels = MediaPanels::new(&config);
        assert_eq!(panels.download(MediaKind::Video).unwrap(), DownloadOutcome::NothingToDownload);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(MediaKind::Video.download_key(), "F2");
        assert_eq!(MediaKind::Transcript.download_key(), "F3");
        assert_eq!(MediaKind::Audio.download_key(), "F4");
        assert_eq!(MediaKind::Transcript.title(), "Transcript");
    }
}
