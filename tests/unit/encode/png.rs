use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "anitype_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn frame(premul: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 1,
        data: [premul, [0, 0, 0, 0]].concat(),
        premultiplied: true,
    }
}

fn cfg(total_frames: u64) -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 1,
        fps: Fps::whole(24).unwrap(),
        total_frames,
    }
}

#[test]
fn frames_are_numbered_with_five_digits() {
    assert_eq!(frame_file_name(FrameIndex(0)), "frame_00000.png");
    assert_eq!(frame_file_name(FrameIndex(123)), "frame_00123.png");
}

#[test]
fn writes_straight_alpha_pngs_in_order() {
    let dir = temp_dir("png_sink");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame([100, 50, 0, 128])).unwrap();
    sink.push_frame(FrameIndex(1), &frame([255, 255, 255, 255])).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.written().len(), 2);
    let img = image::open(dir.join("frame_00000.png")).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(0, 0).0, [199, 100, 0, 128]);
    assert_eq!(img.get_pixel(1, 0).0, [0, 0, 0, 0]);
    assert!(dir.join("frame_00001.png").exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn rejects_gaps_and_short_runs() {
    let dir = temp_dir("png_gap");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(3)).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &frame([0; 4])).is_err());
    sink.push_frame(FrameIndex(0), &frame([0; 4])).unwrap();
    assert!(sink.end().is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn conversion_command_matches_format() {
    let cmd = conversion_command(Fps::whole(30).unwrap(), ExportFormat::ProRes, "out.mov");
    assert_eq!(
        cmd,
        "ffmpeg -framerate 30 -i frame_%05d.png -c:v prores_ks -profile:v 4444 \
         -pix_fmt yuva444p10le -vendor apl0 out.mov"
    );
}
