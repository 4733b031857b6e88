//! QR code encoding to PNG, SVG and PDF.
//!
//! Rasters are drawn from the symbol's module matrix so the image is exactly
//! `size` pixels wide with a quiet zone of `margin` modules. PDF output embeds
//! that raster through a temporary PNG file, and needs a font family from
//! `fonts_dir` because every genpdf document carries one.

use crate::error::QrError;
use common::model::qr::{ErrorCorrectionLevel, QrFormat, QrOptions};
use genpdf::elements::{Break, Image as PdfImage, LinearLayout, PageBreak, Paragraph, TableLayout};
use genpdf::{Alignment, Document};
use image::{ImageBuffer, Rgb, RgbImage};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use qrcode::render::svg;
use qrcode::{Color, EcLevel, QrCode};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const MM_PER_INCH: f64 = 25.4;
const PAGE_QR_MM: f64 = 150.0;
const SHEET_COLUMNS: usize = 3;
const SHEET_ROWS: usize = 4;
const SHEET_QR_MM: f64 = 50.0;
const SHEET_QR_PX: u32 = 256;

/// Largest accepted output edge, in pixels.
pub const MAX_QR_SIZE: u32 = 2048;
/// Largest accepted quiet zone, in modules.
pub const MAX_QR_MARGIN: u32 = 64;

/// Black-box encoder turning a text payload into an image or document.
pub trait ArtifactEncoder: Send + Sync {
    fn encode(&self, payload: &str, options: &QrOptions) -> Result<Vec<u8>, QrError>;
}

/// The production encoder.
#[derive(Debug, Clone)]
pub struct QrEncoder {
    fonts_dir: PathBuf,
}

impl QrEncoder {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        QrEncoder {
            fonts_dir: fonts_dir.into(),
        }
    }

    /// Lays out labelled QR codes on A4 pages, three across and four down.
    pub fn print_sheet(&self, items: &[(String, String)], options: &QrOptions) -> Result<Vec<u8>, QrError> {
        let mut doc = configure_document(&self.fonts_dir, "QR print sheet")?;
        doc.set_font_size(8);
        let mut temp_files = Vec::new();
        let per_page = SHEET_COLUMNS * SHEET_ROWS;
        let sheet_options = QrOptions {
            size: SHEET_QR_PX,
            ..options.clone()
        };

        for (page_idx, page) in items.chunks(per_page).enumerate() {
            if page_idx > 0 {
                doc.push(PageBreak::new());
            }
            let mut table = TableLayout::new(vec![1; SHEET_COLUMNS]);
            for line in page.chunks(SHEET_COLUMNS) {
                let mut row = table.row();
                for (text, label) in line {
                    let image = raster(text, &sheet_options)?;
                    let mut cell = LinearLayout::vertical();
                    cell.push(embed_image(&image, SHEET_QR_MM, &mut temp_files)?);
                    cell.push(Paragraph::new(label.as_str()).aligned(Alignment::Center));
                    cell.push(Break::new(1));
                    row = row.element(cell);
                }
                for _ in line.len()..SHEET_COLUMNS {
                    row = row.element(Paragraph::new(""));
                }
                row.push()?;
            }
            doc.push(table);
        }

        let mut out = Vec::new();
        doc.render(&mut out)?;
        Ok(out)
    }
}

impl ArtifactEncoder for QrEncoder {
    fn encode(&self, payload: &str, options: &QrOptions) -> Result<Vec<u8>, QrError> {
        match options.format {
            QrFormat::Png => encode_png(&raster(payload, options)?),
            QrFormat::Svg => render_svg(payload, options),
            QrFormat::Pdf => self.render_pdf(payload, options),
        }
    }
}

impl QrEncoder {
    fn render_pdf(&self, payload: &str, options: &QrOptions) -> Result<Vec<u8>, QrError> {
        let image = raster(payload, options)?;
        let mut doc = configure_document(&self.fonts_dir, "QR code")?;
        let mut temp_files = Vec::new();

        doc.push(Break::new(4));
        doc.push(embed_image(&image, PAGE_QR_MM, &mut temp_files)?);
        if let Some(label) = options.label.as_deref().filter(|l| !l.is_empty()) {
            doc.push(Break::new(2));
            doc.push(Paragraph::new(label).aligned(Alignment::Center));
        }

        let mut out = Vec::new();
        doc.render(&mut out)?;
        Ok(out)
    }
}

fn ec_level(level: ErrorCorrectionLevel) -> EcLevel {
    match level {
        ErrorCorrectionLevel::L => EcLevel::L,
        ErrorCorrectionLevel::M => EcLevel::M,
        ErrorCorrectionLevel::Q => EcLevel::Q,
        ErrorCorrectionLevel::H => EcLevel::H,
    }
}

/// Rejects sizes and margins that would produce unreasonably large images.
pub fn check_options(options: &QrOptions) -> Result<(), QrError> {
    if options.size == 0 || options.size > MAX_QR_SIZE {
        return Err(QrError::InvalidOptions(format!(
            "size must be between 1 and {} pixels",
            MAX_QR_SIZE
        )));
    }
    if options.margin > MAX_QR_MARGIN {
        return Err(QrError::InvalidOptions(format!(
            "margin must be at most {} modules",
            MAX_QR_MARGIN
        )));
    }
    Ok(())
}

fn symbol(payload: &str, options: &QrOptions) -> Result<QrCode, QrError> {
    check_options(options)?;
    Ok(QrCode::with_error_correction_level(
        payload.as_bytes(),
        ec_level(options.error_correction),
    )?)
}

/// Draws the symbol as a square RGB image of `options.size` pixels.
/// A size smaller than the symbol plus margins is raised to one pixel per module.
pub fn raster(payload: &str, options: &QrOptions) -> Result<RgbImage, QrError> {
    let code = symbol(payload, options)?;
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let span = options
        .margin
        .checked_mul(2)
        .and_then(|quiet| quiet.checked_add(modules))
        .ok_or_else(|| QrError::Encode("quiet zone too large".to_string()))?;
    let size = options.size.max(span);
    let scale = size as f64 / span as f64;
    let margin = options.margin as i64;

    Ok(ImageBuffer::from_fn(size, size, |x, y| {
        let mx = (x as f64 / scale).floor() as i64 - margin;
        let my = (y as f64 / scale).floor() as i64 - margin;
        let inside = (0..modules as i64).contains(&mx) && (0..modules as i64).contains(&my);
        if inside && colors[(my as usize) * modules as usize + mx as usize] == Color::Dark {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    }))
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, QrError> {
    let (w, h) = image.dimensions();
    let mut out = Vec::new();
    {
        let mut encoder = PngEncoder::new(&mut out, w, h);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
    }
    Ok(out)
}

fn render_svg(payload: &str, options: &QrOptions) -> Result<Vec<u8>, QrError> {
    let code = symbol(payload, options)?;
    let svg = code
        .render::<svg::Color>()
        .min_dimensions(options.size, options.size)
        .quiet_zone(options.margin > 0)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    Ok(svg.into_bytes())
}

/// Load the font family, trying Arial first and LiberationSans second.
fn load_font(fonts_dir: &Path) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, QrError> {
    if let Ok(family) = genpdf::fonts::from_files(fonts_dir, "Arial", None) {
        return Ok(family);
    }
    Ok(genpdf::fonts::from_files(fonts_dir, "LiberationSans", None)?)
}

fn configure_document(fonts_dir: &Path, title: &str) -> Result<Document, QrError> {
    let mut doc = Document::new(load_font(fonts_dir)?);
    doc.set_title(title);
    doc.set_paper_size(genpdf::PaperSize::A4);
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);
    Ok(doc)
}

/// Writes `image` to a temporary PNG and loads it as a centered PDF image
/// `width_mm` wide. The temp file is kept alive until rendering finishes.
fn embed_image(
    image: &RgbImage,
    width_mm: f64,
    temp_files: &mut Vec<NamedTempFile>,
) -> Result<PdfImage, QrError> {
    let bytes = encode_png(image)?;
    let mut tmp = tempfile::Builder::new().suffix(".png").tempfile()?;
    tmp.as_file_mut().write_all(&bytes)?;

    let dpi = image.width() as f64 / (width_mm / MM_PER_INCH);
    let mut element = PdfImage::from_path(tmp.path())?;
    element.set_dpi(dpi);
    element.set_alignment(Alignment::Center);
    temp_files.push(tmp);
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn options(size: u32) -> QrOptions {
        QrOptions {
            size,
            ..QrOptions::default()
        }
    }

    #[test]
    fn png_has_requested_dimensions() {
        let bytes = QrEncoder::new("./fonts")
            .encode("https://wa.me/14155552671", &options(512))
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (512, 512));
    }

    #[test]
    fn raster_has_white_quiet_zone_and_dark_finder() {
        let image = raster("https://wa.me/14155552671", &options(200)).unwrap();
        assert_eq!(image.get_pixel(0, 0), &Rgb([255, 255, 255]));
        // The top-left finder pattern starts right after the margin.
        let code = symbol("https://wa.me/14155552671", &options(200)).unwrap();
        let span = code.width() as f64 + 8.0;
        let px = (4.0 * 200.0 / span).ceil() as u32;
        assert_eq!(image.get_pixel(px, px), &Rgb([0, 0, 0]));
    }

    #[test]
    fn tiny_size_is_raised_to_one_pixel_per_module() {
        let image = raster("hi", &options(1)).unwrap();
        let code = symbol("hi", &options(1)).unwrap();
        assert_eq!(image.width(), code.width() as u32 + 8);
    }

    #[test]
    fn svg_output_is_markup() {
        let opts = QrOptions {
            format: QrFormat::Svg,
            ..QrOptions::default()
        };
        let bytes = QrEncoder::new("./fonts").encode("hello", &opts).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("<svg"));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let opts = QrOptions {
            error_correction: ErrorCorrectionLevel::H,
            ..options(64)
        };
        let payload = "x".repeat(4000);
        assert!(matches!(
            QrEncoder::new("./fonts").encode(&payload, &opts),
            Err(QrError::DataTooLong)
        ));
    }

    #[test]
    fn out_of_range_options_are_rejected() {
        let huge_margin = QrOptions {
            margin: u32::MAX,
            ..QrOptions::default()
        };
        assert!(matches!(
            raster("hi", &huge_margin),
            Err(QrError::InvalidOptions(_))
        ));

        let encoder = QrEncoder::new("./fonts");
        for size in [0, MAX_QR_SIZE + 1, 60_000] {
            assert!(matches!(
                encoder.encode("hi", &options(size)),
                Err(QrError::InvalidOptions(_))
            ));
        }
        let svg = QrOptions {
            format: QrFormat::Svg,
            ..options(u32::MAX)
        };
        assert!(matches!(encoder.encode("hi", &svg), Err(QrError::InvalidOptions(_))));
    }

    #[test]
    fn largest_accepted_options_still_encode() {
        let opts = QrOptions {
            margin: MAX_QR_MARGIN,
            ..options(MAX_QR_SIZE)
        };
        let image = raster("hi", &opts).unwrap();
        assert_eq!(image.width(), MAX_QR_SIZE);
    }

    #[test]
    fn pdf_without_fonts_fails_cleanly() {
        let opts = QrOptions {
            format: QrFormat::Pdf,
            ..QrOptions::default()
        };
        let encoder = QrEncoder::new("/nonexistent/fonts");
        assert!(matches!(encoder.encode("hello", &opts), Err(QrError::Pdf(_))));
    }
}
