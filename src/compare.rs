//! Screenshot comparison - concurrent decode, dimension checks, and
//! thresholded pixel diff against the stored baseline

use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::CompareSettings;
use crate::error::{SmokeError, SmokeResult};

/// Outcome of a passing comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixelDiff {
    /// Pixels whose channel deltas exceeded the threshold
    pub diff_pixels: u64,

    /// diff_pixels over the compared region, as a percentage
    pub percent_different: f64,

    /// Number of pixels actually compared (edge margin excluded)
    pub used_pixels: u64,

    /// Byte size of the current screenshot file
    pub current_bytes: u64,
}

/// Compares current screenshots against their baselines by file name
pub struct ScreenshotComparator {
    current_dir: PathBuf,
    baseline_dir: PathBuf,
    settings: CompareSettings,
}

impl ScreenshotComparator {
    pub fn new(current_dir: PathBuf, baseline_dir: PathBuf, settings: CompareSettings) -> Self {
        Self {
            current_dir,
            baseline_dir,
            settings,
        }
    }

    /// Compare `{current_dir}/{file_name}.png` against
    /// `{baseline_dir}/{file_name}.png`.
    ///
    /// Both decodes run concurrently; comparison starts once both have
    /// completed, and either failure fails the case. Dimensions must
    /// match exactly (height checked first) before any pixel work.
    /// A nonzero diff count is an error carrying the file name, the
    /// current file's byte size, and the percent difference.
    pub async fn compare(&self, file_name: &str) -> SmokeResult<PixelDiff> {
        let current_path = self.current_dir.join(format!("{file_name}.png"));
        let baseline_path = self.baseline_dir.join(format!("{file_name}.png"));
        let current_bytes = std::fs::metadata(&current_path)?.len();

        // Byte-identical files need no pixel walk.
        if hash_file(&current_path)? == hash_file(&baseline_path)? {
            debug!("{file_name}.png matches baseline exactly (same hash)");
            return Ok(PixelDiff {
                diff_pixels: 0,
                percent_different: 0.0,
                used_pixels: 0,
                current_bytes,
            });
        }

        let (current, baseline) =
            tokio::try_join!(decode(current_path), decode(baseline_path))?;

        if current.height() != baseline.height() {
            return Err(SmokeError::HeightMismatch {
                name: file_name.to_string(),
                current: current.height(),
                baseline: baseline.height(),
            });
        }
        if current.width() != baseline.width() {
            return Err(SmokeError::WidthMismatch {
                name: file_name.to_string(),
                current: current.width(),
                baseline: baseline.width(),
            });
        }

        let (diff_pixels, used_pixels) = diff_region(&current, &baseline, &self.settings);
        let percent_different = if used_pixels == 0 {
            0.0
        } else {
            diff_pixels as f64 / used_pixels as f64 * 100.0
        };

        info!("{file_name}.png => {current_bytes} bytes, {percent_different}% different");

        if diff_pixels > 0 {
            return Err(SmokeError::ScreenshotMismatch {
                name: file_name.to_string(),
                current_bytes,
                diff_pixels,
                percent_different,
            });
        }

        Ok(PixelDiff {
            diff_pixels,
            percent_different,
            used_pixels,
            current_bytes,
        })
    }
}

/// Decode a PNG off the async runtime's worker threads
async fn decode(path: PathBuf) -> SmokeResult<RgbaImage> {
    let img = tokio::task::spawn_blocking(move || image::open(&path))
        .await
        .map_err(|e| SmokeError::Io(std::io::Error::other(e)))??;
    Ok(img.to_rgba8())
}

/// Count differing pixels over the compared region of two equally
/// sized images, returning `(diff_pixels, used_pixels)`.
///
/// The outermost `edge_margin` rows and columns are excluded: the last
/// row/column of rendered output is noise on some machines. A pixel
/// differs when any RGBA channel delta, normalized to 0-1, exceeds the
/// threshold.
pub fn diff_region(
    current: &RgbaImage,
    baseline: &RgbaImage,
    settings: &CompareSettings,
) -> (u64, u64) {
    let used_width = current.width().saturating_sub(settings.edge_margin);
    let used_height = current.height().saturating_sub(settings.edge_margin);

    let mut diff_pixels = 0u64;
    for y in 0..used_height {
        for x in 0..used_width {
            if pixels_differ(
                current.get_pixel(x, y),
                baseline.get_pixel(x, y),
                settings.threshold,
            ) {
                diff_pixels += 1;
            }
        }
    }

    (diff_pixels, u64::from(used_width) * u64::from(used_height))
}

fn pixels_differ(a: &image::Rgba<u8>, b: &image::Rgba<u8>, threshold: f32) -> bool {
    a.0.iter().zip(b.0.iter()).any(|(&ca, &cb)| {
        let delta = (f32::from(ca) - f32::from(cb)).abs() / 255.0;
        delta > threshold
    })
}

/// Hash a file using SHA256
fn hash_file(path: &Path) -> SmokeResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(pixel))
    }

    #[test]
    fn identical_images_have_zero_diff() {
        let a = solid(10, 10, [255, 255, 255, 255]);
        let b = solid(10, 10, [255, 255, 255, 255]);
        let (diff, used) = diff_region(&a, &b, &CompareSettings::default());
        assert_eq!(diff, 0);
        assert_eq!(used, 81);
    }

    #[test]
    fn below_threshold_channel_noise_is_ignored() {
        let a = solid(10, 10, [100, 100, 100, 255]);
        // Channel delta 20/255 is well under the 0.2 threshold.
        let b = solid(10, 10, [120, 110, 95, 255]);
        let (diff, _) = diff_region(&a, &b, &CompareSettings::default());
        assert_eq!(diff, 0);
    }

    #[test]
    fn above_threshold_pixel_is_counted_once() {
        let a = solid(10, 10, [255, 255, 255, 255]);
        let mut b = solid(10, 10, [255, 255, 255, 255]);
        b.put_pixel(3, 4, Rgba([0, 0, 0, 255]));
        let (diff, used) = diff_region(&a, &b, &CompareSettings::default());
        assert_eq!(diff, 1);
        assert_eq!(used, 81);
    }

    #[test]
    fn last_row_and_column_are_outside_the_region() {
        let a = solid(10, 10, [255, 255, 255, 255]);
        let mut b = solid(10, 10, [255, 255, 255, 255]);
        for i in 0..10 {
            b.put_pixel(9, i, Rgba([0, 0, 0, 255]));
            b.put_pixel(i, 9, Rgba([0, 0, 0, 255]));
        }
        let (diff, _) = diff_region(&a, &b, &CompareSettings::default());
        assert_eq!(diff, 0);
    }

    #[test]
    fn margin_larger_than_image_compares_nothing() {
        let a = solid(1, 1, [255, 255, 255, 255]);
        let b = solid(1, 1, [0, 0, 0, 255]);
        let (diff, used) = diff_region(&a, &b, &CompareSettings::default());
        assert_eq!(diff, 0);
        assert_eq!(used, 0);
    }

    #[test]
    fn edge_margin_is_configurable() {
        let settings = CompareSettings {
            threshold: 0.2,
            edge_margin: 3,
        };
        let a = solid(10, 10, [255, 255, 255, 255]);
        let mut b = solid(10, 10, [255, 255, 255, 255]);
        b.put_pixel(8, 8, Rgba([0, 0, 0, 255]));
        let (diff, used) = diff_region(&a, &b, &settings);
        assert_eq!(diff, 0);
        assert_eq!(used, 49);
    }
}
