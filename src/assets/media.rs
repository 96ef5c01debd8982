use std::path::{Path, PathBuf};

use crate::{
    assets::library::AssetDescriptor,
    foundation::{
        core::Fps,
        error::{AnitypeError, AnitypeResult},
    },
};

/// Basic metadata about a source video file.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    /// Source path used for probing/decoding.
    #[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
    pub source_path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Container duration in seconds.
    pub duration_secs: f64,
    /// Native stream rate reported by ffprobe.
    pub native_fps: Fps,
}

/// Probe a video and decode it into a letter asset at the current project rate.
pub fn open_video_asset(path: &Path, project_fps: Fps) -> AnitypeResult<AssetDescriptor> {
    let info = probe_video(path)?;
    let handle = decode_video(&info)?;
    AssetDescriptor::video(
        info.width,
        info.height,
        info.duration_secs,
        project_fps,
        Box::new(handle),
    )
}

/// Parse an ffprobe rate string such as `30000/1001` or `24`.
pub fn parse_rate(s: &str) -> Option<Fps> {
    let (num, den) = s.split_once('/').unwrap_or((s, "1"));
    Fps::new(num.trim().parse().ok()?, den.trim().parse().ok()?).ok()
}

/// Probe source video metadata through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> AnitypeResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| AnitypeError::evaluation(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(AnitypeError::evaluation(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| AnitypeError::evaluation(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| AnitypeError::evaluation("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| AnitypeError::evaluation("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| AnitypeError::evaluation("missing video height from ffprobe"))?;
    let native_fps = video_stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .ok_or_else(|| AnitypeError::evaluation("missing video frame rate from ffprobe"))?;
    let duration_secs = video_stream
        .duration
        .as_deref()
        .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| AnitypeError::evaluation("missing video duration from ffprobe"))?;

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        duration_secs,
        native_fps,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe source video metadata through `ffprobe`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn probe_video(_source_path: &Path) -> AnitypeResult<VideoSourceInfo> {
    Err(AnitypeError::evaluation(
        "video letters require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
/// Decode every frame of a probed video at its native rate.
pub fn decode_video(source: &VideoSourceInfo) -> AnitypeResult<crate::assets::memory::MemoryVideo> {
    use crate::assets::library::Raster;

    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(&source.source_path)
        .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
        .output()
        .map_err(|e| {
            AnitypeError::evaluation(format!("failed to run ffmpeg for video decode: {e}"))
        })?;

    if !out.status.success() {
        return Err(AnitypeError::evaluation(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = source.width as usize * source.height as usize * 4;
    if expected_len == 0 {
        return Err(AnitypeError::evaluation(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if out.stdout.len() < expected_len || !out.stdout.len().is_multiple_of(expected_len) {
        return Err(AnitypeError::evaluation(format!(
            "decoded video has invalid size: got {} bytes, expected multiples of {expected_len}",
            out.stdout.len()
        )));
    }

    let mut frames = Vec::with_capacity(out.stdout.len() / expected_len);
    for chunk in out.stdout.chunks_exact(expected_len) {
        let mut px = chunk.to_vec();
        crate::foundation::math::premultiply_rgba8_in_place(&mut px);
        frames.push(Raster::new(source.width, source.height, px)?);
    }
    crate::assets::memory::MemoryVideo::new(frames, source.native_fps)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode every frame of a probed video at its native rate.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn decode_video(
    _source: &VideoSourceInfo,
) -> AnitypeResult<crate::assets::memory::MemoryVideo> {
    Err(AnitypeError::evaluation(
        "video letters require the 'media-ffmpeg' feature",
    ))
}
