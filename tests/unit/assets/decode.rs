use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let raster = decode_image(&buf).unwrap();
    assert_eq!(raster.width, 1);
    assert_eq!(raster.height, 1);
    assert_eq!(
        raster.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn numbered_frames_belong_to_a_sequence() {
    assert_eq!(
        classify_file_name("a_012.PNG"),
        Some(LetterFile::SequenceFrame {
            letter: 'A',
            index: 12
        })
    );
    assert_eq!(
        classify_file_name("Q_1.jpeg"),
        Some(LetterFile::SequenceFrame {
            letter: 'Q',
            index: 1
        })
    );
}

#[test]
fn multi_letter_sequence_prefix_is_ignored() {
    assert_eq!(classify_file_name("AB_001.png"), None);
}

#[test]
fn videos_and_stills_key_on_first_character() {
    assert_eq!(
        classify_file_name("hello.mp4"),
        Some(LetterFile::Video { letter: 'H' })
    );
    assert_eq!(
        classify_file_name("w-final.WEBM"),
        Some(LetterFile::Video { letter: 'W' })
    );
    assert_eq!(
        classify_file_name("x.png"),
        Some(LetterFile::Still { letter: 'X' })
    );
    assert_eq!(
        classify_file_name("k_final.png"),
        Some(LetterFile::Still { letter: 'K' })
    );
}

#[test]
fn hidden_files_are_skipped() {
    assert_eq!(classify_file_name(".DS_Store"), None);
}
