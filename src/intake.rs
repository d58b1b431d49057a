//! Photo intake: scan a folder, square each image, append to a case file

use crate::error::{ReportError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use roof_report_common::annotation::FrameSize;
use roof_report_common::types::{CaseFile, Photo};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Target edge of the squared image (px); matches the default annotation frame
pub const TARGET_SIZE: u32 = 1024;
pub const JPEG_QUALITY: u8 = 70;
/// Subfolder receiving squared copies
pub const SQUARED_DIR: &str = "squared";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

/// Outcome of one intake run
#[derive(Debug, Clone, Default)]
pub struct IntakeSummary {
    pub added: usize,
    /// Images kept at their original path after a processing failure
    pub fallbacks: usize,
}

/// Supported images directly inside `folder`, sorted by file name
pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(ReportError::FolderNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| is_image_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .map(|e| ImageInfo {
            path: e.path().to_path_buf(),
            file_name: e.file_name().to_string_lossy().to_string(),
        })
        .collect();

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(images)
}

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// Resize to [`TARGET_SIZE`] wide, then centre-crop to a square
pub fn square(img: &DynamicImage) -> DynamicImage {
    let resized = img.resize(TARGET_SIZE, u32::MAX, FilterType::Triangle);
    let side = resized.width().min(resized.height());
    let x = (resized.width() - side) / 2;
    let y = (resized.height() - side) / 2;
    resized.crop_imm(x, y, side, side)
}

/// Name of the squared copy; keeps the source extension so `roof.jpg` and
/// `roof.png` never share a target
pub fn squared_file_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "photo".to_string());
    format!("{}.jpg", name)
}

/// Write the squared JPEG copy of `source` into `out_dir`
pub fn square_image(source: &Path, out_dir: &Path) -> Result<PathBuf> {
    let img = image::open(source).map_err(|e| ReportError::Image(format!("{}: {}", source.display(), e)))?;
    let squared = DynamicImage::ImageRgb8(square(&img).to_rgb8());

    let target = out_dir.join(squared_file_name(source));

    let mut writer = BufWriter::new(File::create(&target)?);
    let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    squared
        .write_with_encoder(encoder)
        .map_err(|e| ReportError::Image(format!("{}: {}", target.display(), e)))?;
    Ok(target)
}

/// Squared copy, or the original path when processing fails
pub fn square_or_original(source: &Path, out_dir: &Path) -> (PathBuf, bool) {
    match square_image(source, out_dir) {
        Ok(path) => (path, false),
        Err(e) => {
            tracing::warn!(path = %source.display(), error = %e, "image processing failed, keeping original");
            (source.to_path_buf(), true)
        }
    }
}

/// Annotation frame for an image kept at its original size
pub fn original_frame(path: &Path) -> Option<FrameSize> {
    match image::image_dimensions(path) {
        Ok((width, height)) => Some(FrameSize::new(width as f64, height as f64)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "could not read image dimensions");
            None
        }
    }
}

/// Import every image of `folder` into `case` under `section`
pub fn intake_folder(
    case: &mut CaseFile,
    folder: &Path,
    section: &str,
    resize: bool,
) -> Result<IntakeSummary> {
    let images = scan_folder(folder)?;
    if images.is_empty() {
        return Err(ReportError::NoImagesFound(folder.display().to_string()));
    }

    let out_dir = folder.join(SQUARED_DIR);
    if resize {
        std::fs::create_dir_all(&out_dir)?;
    }

    let pb = ProgressBar::new(images.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let processed: Vec<(PathBuf, bool, Option<FrameSize>)> = images
        .par_iter()
        .map(|info| {
            let (path, fell_back) = if resize {
                square_or_original(&info.path, &out_dir)
            } else {
                (info.path.clone(), false)
            };
            // Squared copies use the default square frame
            let frame = if resize && !fell_back { None } else { original_frame(&path) };
            pb.inc(1);
            (path, fell_back, frame)
        })
        .collect();
    pb.finish_and_clear();

    let stamp = chrono::Utc::now().timestamp_millis();
    let mut summary = IntakeSummary::default();
    let start = case.photos.len();
    for (index, (path, fell_back, frame)) in processed.into_iter().enumerate() {
        let id = format!("{}-{}", stamp, start + index);
        let mut photo = Photo::captured(id, path.to_string_lossy(), section);
        photo.frame = frame;
        case.photos.push(photo);
        summary.added += 1;
        if fell_back {
            summary.fallbacks += 1;
        }
    }

    tracing::info!(folder = %folder.display(), section, added = summary.added, fallbacks = summary.fallbacks, "intake complete");
    Ok(summary)
}
