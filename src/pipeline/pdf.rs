use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageFilter, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};
use crate::config::ExportConfig;
use crate::errors::ExportError;
use crate::models::Workspace;

// Resolution printpdf assumes when converting pixels to page units.
const EMBED_DPI: f32 = 300.0;
const MM_PER_INCH: f32 = 25.4;
const JPEG_QUALITY: u8 = 95;

/// Fixed portrait page the captured preview is placed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl PageSpec {
    pub const A4: PageSpec = PageSpec { width_mm: 210.0, height_mm: 297.0, margin_mm: 10.0 };

    pub fn printable_width(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    pub fn printable_height(&self) -> f32 {
        self.height_mm - 2.0 * self.margin_mm
    }
}

impl From<&ExportConfig> for PageSpec {
    fn from(config: &ExportConfig) -> Self {
        Self {
            width_mm: config.page_width_mm,
            height_mm: config.page_height_mm,
            margin_mm: config.margin_mm,
        }
    }
}

/// Where the image lands on the page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fits an image of `width_px` x `height_px` inside the printable area.
///
/// The image first takes the full printable width; if that makes it taller
/// than the printable height it is scaled by height instead. Aspect ratio is
/// kept and the result is centred on both axes.
pub fn fit_on_page(width_px: u32, height_px: u32, page: PageSpec) -> Placement {
    let aspect = width_px as f32 / height_px.max(1) as f32;

    let mut width = page.printable_width();
    let mut height = width / aspect;
    if height > page.printable_height() {
        height = page.printable_height();
        width = height * aspect;
    }

    Placement {
        x: (page.width_mm - width) / 2.0,
        y: (page.height_mm - height) / 2.0,
        width,
        height,
    }
}

/// Download name for a quote: only brand and model matter, each whitespace
/// run becomes a single underscore.
pub fn export_filename(brand: &str, model: &str) -> String {
    let raw = format!("presupuesto-{}-{}.pdf", brand, model);
    let mut name = String::with_capacity(raw.len());
    let mut in_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
        } else {
            name.push(ch);
            in_space = false;
        }
    }
    name
}

/// Why a workspace cannot be exported yet. Empty means the export is allowed.
pub fn export_blockers(workspace: &Workspace) -> Vec<&'static str> {
    let mut blockers = Vec::new();
    if workspace.logo.is_none() {
        blockers.push("falta el logo de la empresa");
    }
    if workspace.vehicle.is_none() {
        blockers.push("falta la foto del vehículo");
    }
    if workspace.quote.headline_is_empty() {
        blockers.push("faltan el nombre del plan y el modelo");
    }
    blockers
}

pub fn can_export(workspace: &Workspace) -> bool {
    export_blockers(workspace).is_empty()
}

/// Builds a one-page PDF with `raster` fitted and centred on `page`. The
/// raster is embedded as a baseline JPEG.
pub fn assemble_pdf(raster: RgbImage, page: PageSpec, title: &str) -> Result<Vec<u8>, ExportError> {
    let placement = fit_on_page(raster.width(), raster.height(), page);
    let natural_width = raster.width() as f32 * MM_PER_INCH / EMBED_DPI;
    let natural_height = raster.height() as f32 * MM_PER_INCH / EMBED_DPI;

    let (doc, page_index, layer_index) =
        PdfDocument::new(title, Mm(page.width_mm), Mm(page.height_mm), "Presupuesto");
    let layer = doc.get_page(page_index).get_layer(layer_index);

    let image = Image::from(jpeg_xobject(&raster)?);
    // PDF coordinates grow upwards from the bottom edge
    image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm(placement.x)),
            translate_y: Some(Mm(page.height_mm - placement.y - placement.height)),
            scale_x: Some(placement.width / natural_width),
            scale_y: Some(placement.height / natural_height),
            dpi: Some(EMBED_DPI),
            ..Default::default()
        },
    );

    doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}

// The JPEG stream goes into the PDF as is and is decoded by the viewer (DCTDecode).
fn jpeg_xobject(raster: &RgbImage) -> Result<ImageXObject, ExportError> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(raster)?;

    Ok(ImageXObject {
        width: Px(raster.width() as usize),
        height: Px(raster.height() as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: jpeg,
        image_filter: Some(ImageFilter::DCT),
        smask: None,
        clipping_bbox: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attachment, QuoteField};
    use bytes::Bytes;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn wide_image_fills_printable_width() {
        let placement = fit_on_page(1900, 1000, PageSpec::A4);
        assert!(close(placement.width, 190.0));
        assert!(close(placement.height, 100.0));
        assert!(close(placement.x, 10.0));
        assert!(close(placement.y, 98.5));
    }

    #[test]
    fn tall_image_is_fitted_by_height() {
        let placement = fit_on_page(1000, 4000, PageSpec::A4);
        assert!(close(placement.height, 277.0));
        assert!(close(placement.width, 69.25));
        assert!(close(placement.y, 10.0));
        assert!(close(placement.x, (210.0 - 69.25) / 2.0));
    }

    #[test]
    fn placement_stays_inside_margins() {
        for (w, h) in [(1, 1), (1280, 2400), (3000, 10), (10, 3000)] {
            let p = fit_on_page(w, h, PageSpec::A4);
            assert!(p.x >= 10.0 - 1e-3 && p.y >= 10.0 - 1e-3, "{}x{}", w, h);
            assert!(p.x + p.width <= 200.0 + 1e-3 && p.y + p.height <= 287.0 + 1e-3, "{}x{}", w, h);
        }
    }

    #[test]
    fn filename_collapses_whitespace_runs() {
        assert_eq!(export_filename("Toyota", "Corolla SE"), "presupuesto-Toyota-Corolla_SE.pdf");
        assert_eq!(export_filename("Mercedes  Benz", "Clase\tA 200"), "presupuesto-Mercedes_Benz-Clase_A_200.pdf");
        assert_eq!(export_filename("vw", "Amarok"), "presupuesto-vw-Amarok.pdf");
    }

    #[test]
    fn export_needs_both_images_and_a_headline() {
        let image = Attachment::from_image_bytes(Bytes::from_static(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR")).unwrap();
        let mut workspace = Workspace::new("1".into());
        workspace.quote.set(QuoteField::PlanName, "Plan 70/30");
        assert!(!can_export(&workspace));

        workspace.logo = Some(image.clone());
        assert!(!can_export(&workspace));

        workspace.vehicle = Some(image.clone());
        assert!(can_export(&workspace));

        workspace.quote.set(QuoteField::PlanName, "");
        assert!(!can_export(&workspace));
        assert_eq!(export_blockers(&workspace), vec!["faltan el nombre del plan y el modelo"]);

        workspace.quote.set(QuoteField::Model, "Corolla");
        assert!(can_export(&workspace));

        workspace.logo = None;
        assert!(!can_export(&workspace));
    }

    #[test]
    fn assembled_document_is_a_pdf() {
        let raster = RgbImage::from_pixel(40, 60, image::Rgb([200, 30, 30]));
        let bytes = assemble_pdf(raster, PageSpec::A4, "presupuesto").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn preview_is_embedded_as_jpeg() {
        let raster = RgbImage::from_pixel(40, 60, image::Rgb([10, 120, 200]));
        let bytes = assemble_pdf(raster, PageSpec::A4, "presupuesto").unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.contains("/DCTDecode"));
        // JPEG start-of-image marker inside the image stream
        assert!(bytes.windows(3).any(|w| w == [0xFF, 0xD8, 0xFF]));
    }
}
