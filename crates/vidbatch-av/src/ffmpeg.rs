//! [`MediaSession`] backed by the `ffmpeg` and `ffprobe` command line tools.
//!
//! The session only records state while the pipeline is being configured.
//! Nothing is decoded until [`MediaSession::save`] or
//! [`MediaSession::export_still`], each of which runs one ffmpeg process
//! whose filter graph is built from the recorded markers and filters.

use crate::session::{Bitrate, CodecSelection, Container, Filter, Marker, MediaSession};
use crate::{Error, Result, Staging, ToolCommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// JPEG quality for exported stills (ffmpeg `-q:v`, 2 is near best).
const STILL_QUALITY: &str = "2";

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    nb_read_packets: Option<String>,
    nb_frames: Option<String>,
}

/// Count the video frames of a file with ffprobe.
///
/// Packets are counted rather than decoded, which is exact for the intra-only
/// and constant-frame-rate sources this tool targets.
pub fn count_frames(ffprobe: &Path, path: &Path) -> Result<u64> {
    let output = ToolCommand::new(ffprobe.to_path_buf())
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-count_packets",
            "-show_entries",
            "stream=nb_read_packets,nb_frames",
            "-print_format",
            "json",
        ])
        .arg(path.to_string_lossy())
        .execute()?;

    parse_frame_count(&output.stdout)
}

fn parse_frame_count(json_str: &str) -> Result<u64> {
    let parsed: FfprobeOutput = serde_json::from_str(json_str)?;
    let stream = parsed
        .streams
        .first()
        .ok_or_else(|| Error::parse_error("ffprobe", "no video stream"))?;

    let count = [&stream.nb_read_packets, &stream.nb_frames]
        .into_iter()
        .flatten()
        .find_map(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| Error::parse_error("ffprobe", "frame count not reported"))?;

    if count == 0 {
        return Err(Error::parse_error("ffprobe", "video stream has no frames"));
    }
    Ok(count)
}

/// Render a filter as an ffmpeg filtergraph element.
pub fn filter_graph_element(filter: &Filter) -> String {
    match filter {
        Filter::ResampleFps { fps } => format!("fps=fps={fps}"),
        Filter::Grayscale => "format=gray".to_string(),
        Filter::Rotate {
            angle,
            width,
            height,
        } => format!("rotate=a={angle}*PI/180:ow={width}:oh={height}"),
    }
}

fn bitrate_args(bitrate: &Bitrate) -> Vec<String> {
    match bitrate {
        Bitrate::Cbr { kbps } => vec![
            "-b:v".to_string(),
            format!("{kbps}k"),
            "-minrate".to_string(),
            format!("{kbps}k"),
            "-maxrate".to_string(),
            format!("{kbps}k"),
            "-bufsize".to_string(),
            format!("{}k", kbps.saturating_mul(2)),
        ],
        Bitrate::Quantizer { q } => vec!["-q:v".to_string(), q.to_string()],
    }
}

/// Per-file state, reset by every `load`.
#[derive(Debug, Clone)]
struct LoadedMedia {
    path: PathBuf,
    frame_count: u64,
    marker_a: u64,
    marker_b: u64,
    current_frame: u64,
    filters: Vec<Filter>,
    codec: Option<CodecSelection>,
    container: Option<Container>,
}

impl LoadedMedia {
    fn new(path: PathBuf, frame_count: u64) -> Self {
        Self {
            path,
            frame_count,
            marker_a: 0,
            marker_b: frame_count.saturating_sub(1),
            current_frame: 0,
            filters: Vec::new(),
            codec: None,
            container: None,
        }
    }

    fn check_frame(&self, frame: u64) -> Result<()> {
        if frame >= self.frame_count {
            return Err(Error::FrameOutOfRange {
                frame,
                frame_count: self.frame_count,
            });
        }
        Ok(())
    }

    /// Arguments for encoding the processed video into `output`.
    fn save_args(&self, output: &Path) -> Result<Vec<String>> {
        let codec = self
            .codec
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("no video codec selected".to_string()))?;

        let mut graph = Vec::new();
        if self.marker_a > 0 {
            graph.push(format!("trim=start_frame={}", self.marker_a));
            graph.push("setpts=PTS-STARTPTS".to_string());
        }
        graph.extend(self.filters.iter().map(filter_graph_element));

        let mut args = vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-i".to_string(),
            self.path.to_string_lossy().to_string(),
        ];
        if !graph.is_empty() {
            args.push("-vf".to_string());
            args.push(graph.join(","));
        }
        args.push("-an".to_string());
        args.push("-c:v".to_string());
        args.push(codec.id.clone());
        args.extend(bitrate_args(&codec.bitrate));
        if let Some(container) = self.container {
            args.push("-f".to_string());
            args.push(container.ffmpeg_format_name().to_string());
        }
        args.push(output.to_string_lossy().to_string());

        Ok(args)
    }

    /// Arguments for writing the source frame at the current position,
    /// passed through the non-temporal filters, as one JPEG.
    fn still_args(&self, output: &Path) -> Vec<String> {
        let mut graph = vec![format!("select=eq(n\\,{})", self.current_frame)];
        graph.extend(
            self.filters
                .iter()
                .filter(|f| !f.is_temporal())
                .map(filter_graph_element),
        );

        vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-i".to_string(),
            self.path.to_string_lossy().to_string(),
            "-vf".to_string(),
            graph.join(","),
            "-frames:v".to_string(),
            "1".to_string(),
            "-an".to_string(),
            "-c:v".to_string(),
            "mjpeg".to_string(),
            "-q:v".to_string(),
            STILL_QUALITY.to_string(),
            "-update".to_string(),
            "1".to_string(),
            "-f".to_string(),
            "image2".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

/// Media session that drives `ffmpeg`.
#[derive(Debug)]
pub struct FfmpegSession {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    loaded: Option<LoadedMedia>,
}

impl FfmpegSession {
    /// Create a session using explicit tool paths.
    pub fn new(ffmpeg: PathBuf, ffprobe: PathBuf) -> Self {
        Self {
            ffmpeg,
            ffprobe,
            loaded: None,
        }
    }

    /// Locate ffmpeg and ffprobe, preferring configured paths over `PATH`.
    pub fn discover(ffmpeg_path: Option<&Path>, ffprobe_path: Option<&Path>) -> Result<Self> {
        let ffmpeg = crate::tools::get_tool_path("ffmpeg", ffmpeg_path)?;
        let ffprobe = crate::tools::get_tool_path("ffprobe", ffprobe_path)?;
        tracing::debug!(
            "Using ffmpeg at {} and ffprobe at {}",
            ffmpeg.display(),
            ffprobe.display()
        );
        Ok(Self::new(ffmpeg, ffprobe))
    }

    fn media(&self) -> Result<&LoadedMedia> {
        self.loaded.as_ref().ok_or(Error::NoMediaLoaded)
    }

    fn media_mut(&mut self) -> Result<&mut LoadedMedia> {
        self.loaded.as_mut().ok_or(Error::NoMediaLoaded)
    }

    fn run_staged(
        &self,
        destination: &Path,
        args: impl FnOnce(&Path) -> Result<Vec<String>>,
    ) -> Result<()> {
        let staging = Staging::new(destination)?;
        ToolCommand::new(self.ffmpeg.clone())
            .args(args(staging.path())?)
            .execute()?;
        staging.commit()?;
        Ok(())
    }
}

impl MediaSession for FfmpegSession {
    fn load(&mut self, path: &Path) -> Result<()> {
        // Drop the previous file first so a failed load leaves nothing stale.
        self.loaded = None;

        if !path.is_file() {
            return Err(Error::file_not_found(path));
        }

        let frame_count = count_frames(&self.ffprobe, path)?;
        tracing::debug!("Loaded {} ({} frames)", path.display(), frame_count);
        self.loaded = Some(LoadedMedia::new(path.to_path_buf(), frame_count));
        Ok(())
    }

    fn set_marker(&mut self, marker: Marker, frame: u64) -> Result<()> {
        let media = self.media_mut()?;
        media.check_frame(frame)?;
        match marker {
            Marker::A => media.marker_a = frame,
            Marker::B => media.marker_b = frame,
        }
        Ok(())
    }

    fn marker(&self, marker: Marker) -> Result<u64> {
        let media = self.media()?;
        Ok(match marker {
            Marker::A => media.marker_a,
            Marker::B => media.marker_b,
        })
    }

    fn add_filter(&mut self, filter: Filter) -> Result<()> {
        filter.validate()?;
        self.media_mut()?.filters.push(filter);
        Ok(())
    }

    fn select_codec(&mut self, codec: CodecSelection) -> Result<()> {
        if codec.id.trim().is_empty() {
            return Err(Error::InvalidInput("codec id is empty".to_string()));
        }
        self.media_mut()?.codec = Some(codec);
        Ok(())
    }

    fn set_container(&mut self, container: Container) -> Result<()> {
        self.media_mut()?.container = Some(container);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        let media = self.media()?.clone();
        if media.marker_a > media.marker_b {
            return Err(Error::InvalidInput(format!(
                "marker A ({}) is after marker B ({})",
                media.marker_a, media.marker_b
            )));
        }
        self.run_staged(path, |staged| media.save_args(staged))
    }

    fn current_frame(&self) -> Result<u64> {
        Ok(self.media()?.current_frame)
    }

    fn set_current_frame(&mut self, frame: u64) -> Result<()> {
        let media = self.media_mut()?;
        media.check_frame(frame)?;
        media.current_frame = frame;
        Ok(())
    }

    fn export_still(&mut self, path: &Path) -> Result<()> {
        let media = self.media()?.clone();
        self.run_staged(path, |staged| Ok(media.still_args(staged)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> LoadedMedia {
        let mut media = LoadedMedia::new(PathBuf::from("/videos/clip1.avi"), 100);
        media.marker_a = 3;
        media.filters = vec![
            Filter::ResampleFps { fps: 7.5 },
            Filter::Grayscale,
            Filter::Rotate {
                angle: 90.0,
                width: 480,
                height: 640,
            },
        ];
        media.codec = Some(CodecSelection::new("mjpeg", Bitrate::Cbr { kbps: 1000 }));
        media.container = Some(Container::Avi);
        media
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn parse_frame_count_prefers_counted_packets() {
        let json = r#"{"streams":[{"nb_frames":"120","nb_read_packets":"118"}]}"#;
        assert_eq!(parse_frame_count(json).unwrap(), 118);
    }

    #[test]
    fn parse_frame_count_falls_back_to_header() {
        let json = r#"{"streams":[{"nb_frames":"120"}]}"#;
        assert_eq!(parse_frame_count(json).unwrap(), 120);
    }

    #[test]
    fn parse_frame_count_rejects_missing_stream() {
        assert!(parse_frame_count(r#"{"streams":[]}"#).is_err());
        assert!(parse_frame_count(r#"{}"#).is_err());
        assert!(parse_frame_count(r#"{"streams":[{"nb_frames":"0"}]}"#).is_err());
    }

    #[test]
    fn filter_graph_elements() {
        assert_eq!(
            filter_graph_element(&Filter::ResampleFps { fps: 7.5 }),
            "fps=fps=7.5"
        );
        assert_eq!(filter_graph_element(&Filter::Grayscale), "format=gray");
        assert_eq!(
            filter_graph_element(&Filter::Rotate {
                angle: 90.0,
                width: 480,
                height: 640
            }),
            "rotate=a=90*PI/180:ow=480:oh=640"
        );
    }

    #[test]
    fn save_args_trim_then_filters_in_order() {
        let args = loaded().save_args(Path::new("/videos/clip1 AD.avi")).unwrap();
        assert_eq!(
            value_after(&args, "-vf"),
            Some(
                "trim=start_frame=3,setpts=PTS-STARTPTS,fps=fps=7.5,format=gray,\
                 rotate=a=90*PI/180:ow=480:oh=640"
            )
        );
        assert_eq!(value_after(&args, "-i"), Some("/videos/clip1.avi"));
        assert_eq!(value_after(&args, "-c:v"), Some("mjpeg"));
        assert_eq!(value_after(&args, "-b:v"), Some("1000k"));
        assert_eq!(value_after(&args, "-f"), Some("avi"));
        assert_eq!(args.last().map(String::as_str), Some("/videos/clip1 AD.avi"));
    }

    #[test]
    fn save_args_without_marker_skips_trim() {
        let mut media = loaded();
        media.marker_a = 0;
        media.filters.clear();
        let args = media.save_args(Path::new("out.avi")).unwrap();
        assert!(!args.contains(&"-vf".to_string()));
    }

    #[test]
    fn save_args_require_codec() {
        let mut media = loaded();
        media.codec = None;
        assert!(media.save_args(Path::new("out.avi")).is_err());
    }

    #[test]
    fn quantizer_rate_control() {
        let mut media = loaded();
        media.codec = Some(CodecSelection::new("mpeg4", Bitrate::Quantizer { q: 4 }));
        let args = media.save_args(Path::new("out.avi")).unwrap();
        assert_eq!(value_after(&args, "-q:v"), Some("4"));
        assert!(!args.contains(&"-b:v".to_string()));
    }

    #[test]
    fn still_args_select_current_frame_without_resampling() {
        let mut media = loaded();
        media.current_frame = 99;
        let args = media.still_args(Path::new("/videos/plip1.jpg"));
        assert_eq!(
            value_after(&args, "-vf"),
            Some("select=eq(n\\,99),format=gray,rotate=a=90*PI/180:ow=480:oh=640")
        );
        assert_eq!(value_after(&args, "-frames:v"), Some("1"));
        assert_eq!(value_after(&args, "-f"), Some("image2"));
    }

    #[test]
    fn markers_default_to_whole_video() {
        let media = LoadedMedia::new(PathBuf::from("a.avi"), 50);
        assert_eq!(media.marker_a, 0);
        assert_eq!(media.marker_b, 49);
        assert!(media.check_frame(49).is_ok());
        assert!(media.check_frame(50).is_err());
    }

    #[test]
    fn calls_before_load_fail() {
        let mut session = FfmpegSession::new(PathBuf::from("ffmpeg"), PathBuf::from("ffprobe"));
        assert!(matches!(
            session.set_marker(Marker::A, 3),
            Err(Error::NoMediaLoaded)
        ));
        assert!(matches!(session.marker(Marker::B), Err(Error::NoMediaLoaded)));
        assert!(matches!(
            session.add_filter(Filter::Grayscale),
            Err(Error::NoMediaLoaded)
        ));
        assert!(matches!(
            session.save(Path::new("out.avi")),
            Err(Error::NoMediaLoaded)
        ));
        assert!(matches!(
            session.export_still(Path::new("out.jpg")),
            Err(Error::NoMediaLoaded)
        ));
    }

    #[test]
    fn load_missing_file_fails() {
        let mut session = FfmpegSession::new(PathBuf::from("ffmpeg"), PathBuf::from("ffprobe"));
        let err = session
            .load(Path::new("/does/not/exist/clip.avi"))
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
