use super::*;
use crate::foundation::core::Fps;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30000, 1001).unwrap(),
        total_frames: 10,
    }
}

#[test]
fn format_names_round_trip_through_from_str() {
    for f in ExportFormat::ALL {
        assert_eq!(f.to_string().parse::<ExportFormat>().unwrap(), f);
    }
    assert_eq!("WEBM".parse::<ExportFormat>().unwrap(), ExportFormat::WebM);
    assert!("gif".parse::<ExportFormat>().is_err());
}

#[test]
fn webm_args_stream_raw_rgba_into_vp9() {
    let opts = FfmpegSinkOpts::new("out/HI.webm", ExportFormat::WebM);
    let args = opts.args(&cfg(800, 400));
    let joined = args.join(" ");
    assert!(joined.starts_with("-y -loglevel error -f rawvideo -pix_fmt rgba -s 800x400"));
    assert!(joined.contains("-r 30000/1001 -i pipe:0"));
    assert!(joined.contains("-c:v libvpx-vp9 -pix_fmt yuva420p -b:v 0 -crf 18"));
    assert!(!joined.contains("-vf"));
    assert_eq!(args.last().map(String::as_str), Some("out/HI.webm"));
}

#[test]
fn odd_canvas_is_padded_only_for_subsampled_formats() {
    let hevc = FfmpegSinkOpts::new("a.mov", ExportFormat::Hevc).args(&cfg(801, 400));
    assert!(hevc.iter().any(|a| a == "pad=ceil(iw/2)*2:ceil(ih/2)*2"));
    assert!(hevc.iter().any(|a| a == "hvc1"));

    let prores = FfmpegSinkOpts::new("a.mov", ExportFormat::ProRes).args(&cfg(801, 401));
    assert!(!prores.iter().any(|a| a == "-vf"));
}

#[test]
fn dxv_uses_bgra_in_a_mov() {
    assert_eq!(ExportFormat::Dxv.extension(), "mov");
    assert_eq!(ExportFormat::Dxv.codec_args(), &["-c:v", "dxv", "-pix_fmt", "bgra"]);
}

#[test]
fn version_banner_is_parsed() {
    let banner = "ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023 the FFmpeg developers\n";
    assert_eq!(parse_version_banner(banner).as_deref(), Some("6.1.1-3ubuntu5"));
    assert_eq!(parse_version_banner("nope"), None);
}

#[test]
fn missing_program_fails_at_begin() {
    let mut opts = FfmpegSinkOpts::new(
        std::env::temp_dir().join("anitype_never_written.webm"),
        ExportFormat::WebM,
    );
    opts.program = PathBuf::from("anitype-no-such-ffmpeg");
    let mut sink = FfmpegSink::new(opts);
    let err = sink.begin(cfg(2, 2)).unwrap_err();
    assert!(err.to_string().contains("failed to spawn"));
    assert!(ffmpeg_version(Path::new("anitype-no-such-ffmpeg")).is_none());
}

#[cfg(unix)]
#[test]
fn abandoned_sink_reaps_its_child() {
    let mut opts = FfmpegSinkOpts::new(
        std::env::temp_dir().join("anitype_abandoned.webm"),
        ExportFormat::WebM,
    );
    opts.program = PathBuf::from("true");
    let mut sink = FfmpegSink::new(opts);
    sink.begin(cfg(2, 2)).unwrap();
    assert!(sink.child.is_some());

    sink.reap_child();
    assert!(sink.child.is_none());
    assert!(sink.stdin.is_none());
    assert!(sink.stderr_drain.is_none());
    assert!(sink.end().is_err());

    sink.begin(cfg(2, 2)).unwrap();
    drop(sink);
}
