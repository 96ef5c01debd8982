use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    encode::sink::{FrameSink, SinkConfig, check_next_index},
    foundation::{
        core::FrameIndex,
        error::{AnitypeError, AnitypeResult},
        math::unpremultiply_rgba8_into,
    },
    render::surface::FrameRGBA,
};

/// Alpha-capable video formats produced through ffmpeg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// VP9 with alpha.
    WebM,
    /// ProRes 4444.
    ProRes,
    /// HEVC with alpha, tagged for QuickTime.
    Hevc,
    /// Resolume DXV.
    Dxv,
}

impl ExportFormat {
    pub const ALL: [Self; 4] = [Self::WebM, Self::ProRes, Self::Hevc, Self::Dxv];

    pub fn extension(self) -> &'static str {
        match self {
            Self::WebM => "webm",
            Self::ProRes | Self::Hevc | Self::Dxv => "mov",
        }
    }

    /// Output codec arguments, placed after the input.
    pub fn codec_args(self) -> &'static [&'static str] {
        match self {
            Self::WebM => &[
                "-c:v",
                "libvpx-vp9",
                "-pix_fmt",
                "yuva420p",
                "-b:v",
                "0",
                "-crf",
                "18",
            ],
            Self::ProRes => &[
                "-c:v",
                "prores_ks",
                "-profile:v",
                "4444",
                "-pix_fmt",
                "yuva444p10le",
                "-vendor",
                "apl0",
            ],
            Self::Hevc => &[
                "-c:v",
                "libx265",
                "-vtag",
                "hvc1",
                "-pix_fmt",
                "yuva420p",
                "-crf",
                "18",
            ],
            Self::Dxv => &["-c:v", "dxv", "-pix_fmt", "bgra"],
        }
    }

    /// Chroma-subsampled formats need even frame dimensions.
    pub fn needs_even_dimensions(self) -> bool {
        matches!(self, Self::WebM | Self::Hevc)
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::WebM => "webm",
            Self::ProRes => "prores",
            Self::Hevc => "hevc",
            Self::Dxv => "dxv",
        })
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = AnitypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| AnitypeError::validation(format!("unknown export format '{s}'")))
    }
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    pub format: ExportFormat,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// ffmpeg executable to run.
    pub program: PathBuf,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            out_path: out_path.into(),
            format,
            overwrite: true,
            program: PathBuf::from("ffmpeg"),
        }
    }

    /// Full argument list for a `width`x`height` raw RGBA input at `fps`.
    pub fn args(&self, cfg: &SinkConfig) -> Vec<String> {
        let mut args: Vec<String> = vec![
            if self.overwrite { "-y" } else { "-n" }.to_owned(),
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            "rgba".into(),
            "-s".into(),
            format!("{}x{}", cfg.width, cfg.height),
            "-r".into(),
            format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i".into(),
            "pipe:0".into(),
        ];
        if self.format.needs_even_dimensions()
            && (!cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2))
        {
            args.push("-vf".into());
            args.push("pad=ceil(iw/2)*2:ceil(ih/2)*2".into());
        }
        args.extend(self.format.codec_args().iter().map(|s| (*s).to_owned()));
        args.push(self.out_path.to_string_lossy().into_owned());
        args
    }
}

/// Sink that spawns `ffmpeg` and streams straight-alpha RGBA frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Close stdin, wait for the child and join the stderr drain. No-op when not started.
    fn reap_child(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            match child.wait() {
                Ok(status) => tracing::debug!(%status, "ffmpeg reaped without end()"),
                Err(e) => tracing::warn!(error = %e, "failed to wait for abandoned ffmpeg"),
            }
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        self.cfg = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.reap_child();
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> AnitypeResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(AnitypeError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(AnitypeError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let mut child = Command::new(&self.opts.program)
            .args(self.opts.args(&cfg))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AnitypeError::encode(format!(
                    "failed to spawn '{}' (is it installed and on PATH?): {e}",
                    self.opts.program.display()
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AnitypeError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| AnitypeError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            format = %self.opts.format,
            out = %self.opts.out_path.display(),
            "ffmpeg started"
        );
        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> AnitypeResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| AnitypeError::encode("ffmpeg sink not started"))?;
        check_next_index(self.last_idx, idx)?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(AnitypeError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(AnitypeError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        self.last_idx = Some(idx);

        if frame.premultiplied {
            unpremultiply_rgba8_into(&mut self.scratch, &frame.data);
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(AnitypeError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            AnitypeError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> AnitypeResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| AnitypeError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| AnitypeError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| AnitypeError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| AnitypeError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(AnitypeError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> AnitypeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Version string reported by `program -version`, or `None` when it cannot be run.
pub fn ffmpeg_version(program: &Path) -> Option<String> {
    let out = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    parse_version_banner(&String::from_utf8_lossy(&out.stdout))
}

/// Extract `X` from a banner starting with `ffmpeg version X ...`.
pub fn parse_version_banner(banner: &str) -> Option<String> {
    let rest = banner.split("ffmpeg version ").nth(1)?;
    rest.split_whitespace().next().map(str::to_owned)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
