// crates/vidsnap-capture/src/postprocess.rs
//
// Rotation and colour-profile rewrite of a snapshot already on disk.
// The rewritten image goes to a sibling scratch file first and is renamed over
// the input, so a failed encode never destroys the raw snapshot.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, ImageReader};
use tracing::{debug, warn};
use vidsnap_core::ImageError;

/// Angles the rotation step can honour without resampling.
pub fn is_right_angle(degrees: i32) -> bool {
    degrees.rem_euclid(90) == 0
}

/// Rotates counter-clockwise by `degrees`, expanding the canvas.
pub fn rotate_ccw(img: &DynamicImage, degrees: i32) -> Result<DynamicImage, ImageError> {
    // image's rotateN helpers turn clockwise.
    match degrees.rem_euclid(360) {
        0   => Ok(img.clone()),
        90  => Ok(img.rotate270()),
        180 => Ok(img.rotate180()),
        270 => Ok(img.rotate90()),
        _   => Err(ImageError::Rotation(degrees)),
    }
}

/// Decodes `path`, rotates it, and writes it back as PNG with `icc` embedded.
pub fn apply(path: &Path, degrees: i32, icc: Option<&[u8]>) -> Result<(), ImageError> {
    let img = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| decode_err(path, e))?
        .decode()
        .map_err(|e| decode_err(path, e))?;

    let rotated = rotate_ccw(&img, degrees)?;
    debug!(
        "[capture] {} rotated {degrees}° → {}x{}",
        path.display(), rotated.width(), rotated.height()
    );

    let scratch = scratch_path(path);
    if let Err(e) = write_png(&scratch, &rotated, icc) {
        let _ = std::fs::remove_file(&scratch);
        return Err(e);
    }
    std::fs::rename(&scratch, path).map_err(|e| {
        let _ = std::fs::remove_file(&scratch);
        ImageError::Save { path: path.to_path_buf(), reason: e.to_string() }
    })
}

pub fn write_png(path: &Path, img: &DynamicImage, icc: Option<&[u8]>) -> Result<(), ImageError> {
    let save_err = |reason: String| ImageError::Save { path: path.to_path_buf(), reason };

    let file = File::create(path).map_err(|e| save_err(e.to_string()))?;
    let mut encoder = PngEncoder::new(BufWriter::new(file));
    if let Some(profile) = icc {
        if let Err(e) = encoder.set_icc_profile(profile.to_vec()) {
            warn!("[capture] PNG encoder refused the ICC profile: {e}");
        }
    }
    encoder
        .write_image(img.as_bytes(), img.width(), img.height(), img.color().into())
        .map_err(|e| save_err(e.to_string()))
}

fn scratch_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn decode_err(path: &Path, e: impl std::fmt::Display) -> ImageError {
    ImageError::Decode { path: path.to_path_buf(), reason: e.to_string() }
}
