use image::{imageops::FilterType, DynamicImage, RgbImage};
use plotters::coord::Shift;
use plotters::element::BitMapElement;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use crate::errors::ExportError;
use crate::models::Attachment;
use super::preview::{
    PreviewBody, QuoteDetails, QuoteLayout, SellerFooter, LOGO_PLACEHOLDER, VEHICLE_PLACEHOLDER,
};

/// Turns a rendered layout into pixels for embedding in the PDF.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, layout: &QuoteLayout) -> Result<RgbImage, ExportError>;
}

// Layout metrics at scale 1, in pixels.
const WIDTH: i32 = 640;
const FRAME: i32 = 16;
const PAD: i32 = 32;
const HEADER: i32 = 160;
const PLACEHOLDER_BODY: i32 = 200;
const HERO: i32 = 200;
const SECTION_TITLE: i32 = 52;
const ROW: i32 = 44;
const TOTAL_ROW: i32 = 56;
const NOTE_LINE: i32 = 22;
const FOOTER: i32 = 130;
const GAP: i32 = 32;

const NAVY: RGBColor = RGBColor(10, 15, 30);
const HEADER_GRAY: RGBColor = RGBColor(17, 24, 39);
const LIGHT_GRAY: RGBColor = RGBColor(249, 250, 251);
const BORDER_GRAY: RGBColor = RGBColor(229, 231, 235);
const PHOTO_GRAY: RGBColor = RGBColor(229, 231, 235);
const TEXT_DARK: RGBColor = RGBColor(31, 41, 55);
const TEXT_MUTED: RGBColor = RGBColor(107, 114, 128);
const BRAND_GOLD: RGBColor = RGBColor(202, 138, 4);

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Draws the layout with plotters on an in-memory RGB bitmap, oversampled by
/// `scale` so the printed page stays sharp.
pub struct PlottersRasterizer {
    scale: i32,
    font_family: String,
}

impl PlottersRasterizer {
    pub fn new(scale: u32, font_family: impl Into<String>) -> Self {
        Self {
            scale: scale.max(1) as i32,
            font_family: font_family.into(),
        }
    }

    fn px(&self, value: i32) -> i32 {
        value * self.scale
    }

    fn text_style(&self, size: i32, color: RGBColor, bold: bool, h: HPos) -> TextStyle<'_> {
        let size = f64::from(self.px(size));
        let font = if bold {
            (self.font_family.as_str(), size, FontStyle::Bold).into_font()
        } else {
            (self.font_family.as_str(), size).into_font()
        };
        font.color(&color).pos(Pos::new(h, VPos::Top))
    }

    fn text(&self, area: &Area, text: &str, at: (i32, i32), size: i32, color: RGBColor, bold: bool, h: HPos) -> Result<(), ExportError> {
        if text.is_empty() {
            return Ok(());
        }
        area.draw_text(text, &self.text_style(size, color, bold, h), (self.px(at.0), self.px(at.1)))
            .map_err(render_error)
    }

    fn rect(&self, area: &Area, from: (i32, i32), to: (i32, i32), color: RGBColor) -> Result<(), ExportError> {
        area.draw(&Rectangle::new(
            [(self.px(from.0), self.px(from.1)), (self.px(to.0), self.px(to.1))],
            color.filled(),
        ))
        .map_err(render_error)
    }

    fn picture(&self, area: &Area, attachment: &Attachment, at: (i32, i32), size: (i32, i32), cover: bool) -> Result<(), ExportError> {
        let decoded = image::load_from_memory(&attachment.bytes)?;
        let (w, h) = (self.px(size.0) as u32, self.px(size.1) as u32);
        let fitted = if cover {
            decoded.resize_to_fill(w, h, FilterType::Triangle)
        } else {
            decoded.resize(w, h, FilterType::Triangle)
        };
        // Contained images are centred inside their box
        let offset_x = (w as i32 - fitted.width() as i32) / 2;
        let offset_y = (h as i32 - fitted.height() as i32) / 2;
        let origin = (self.px(at.0) + offset_x, self.px(at.1) + offset_y);

        let element: BitMapElement<(i32, i32)> = (origin, DynamicImage::ImageRgb8(fitted.to_rgb8())).into();
        area.draw(&element).map_err(render_error)
    }

    fn body_height(body: &PreviewBody) -> i32 {
        match body {
            PreviewBody::Placeholder(_) => PLACEHOLDER_BODY,
            PreviewBody::Details(details) => {
                HERO + GAP
                    + SECTION_TITLE
                    + ROW * details.rows.len() as i32
                    + TOTAL_ROW
                    + GAP
                    + NOTE_LINE * details.notes.len() as i32
            }
        }
    }

    fn draw_header(&self, area: &Area, logo: Option<&Attachment>, top: i32) -> Result<(), ExportError> {
        let (left, right) = (FRAME, WIDTH - FRAME);
        self.rect(area, (left, top), (right, top + HEADER), HEADER_GRAY)?;
        match logo {
            Some(logo) => self.picture(area, logo, (WIDTH / 2 - 150, top + 20), (300, HEADER - 40), false),
            None => self.text(area, LOGO_PLACEHOLDER, (WIDTH / 2, top + HEADER / 2 - 10), 18, TEXT_MUTED, false, HPos::Center),
        }
    }

    fn draw_details(&self, area: &Area, details: &QuoteDetails, top: i32) -> Result<(), ExportError> {
        let left = FRAME + PAD;
        let right = WIDTH - FRAME - PAD;
        let photo_width = (right - left - GAP) / 2;

        // Vehicle photo and headline
        match &details.vehicle {
            Some(vehicle) => self.picture(area, vehicle, (left, top), (photo_width, HERO), true)?,
            None => {
                self.rect(area, (left, top), (left + photo_width, top + HERO), PHOTO_GRAY)?;
                self.text(area, VEHICLE_PLACEHOLDER, (left + photo_width / 2, top + HERO / 2 - 8), 14, TEXT_MUTED, false, HPos::Center)?;
            }
        }
        let text_left = left + photo_width + GAP;
        self.text(area, &details.brand, (text_left, top + 40), 13, BRAND_GOLD, true, HPos::Left)?;
        self.text(area, &details.model, (text_left, top + 62), 30, TEXT_DARK, true, HPos::Left)?;
        self.text(area, &details.plan_name, (text_left, top + 110), 15, TEXT_MUTED, false, HPos::Left)?;
        self.text(area, &details.plan_summary, (text_left, top + 134), 13, TEXT_MUTED, false, HPos::Left)?;

        // Plan table
        let mut y = top + HERO + GAP;
        self.rect(area, (left, y), (right, y + SECTION_TITLE), LIGHT_GRAY)?;
        self.text(area, "Detalles del Plan", (left + 16, y + 16), 17, TEXT_DARK, true, HPos::Left)?;
        y += SECTION_TITLE;
        for row in &details.rows {
            if row.highlighted {
                self.rect(area, (left, y), (right, y + ROW), LIGHT_GRAY)?;
            }
            self.rect(area, (left, y + ROW - 1), (right, y + ROW), BORDER_GRAY)?;
            self.text(area, row.label, (left + 16, y + 14), 13, TEXT_MUTED, false, HPos::Left)?;
            self.text(area, &row.value, (right - 16, y + 12), 15, TEXT_DARK, true, HPos::Right)?;
            y += ROW;
        }
        self.rect(area, (left, y), (right, y + TOTAL_ROW), LIGHT_GRAY)?;
        self.rect(area, (left, y), (right, y + 2), BORDER_GRAY)?;
        self.text(area, details.total.label, (left + 16, y + 20), 13, TEXT_MUTED, true, HPos::Left)?;
        self.text(area, &details.total.value, (right - 16, y + 14), 20, RGBColor(0, 0, 0), true, HPos::Right)?;
        y += TOTAL_ROW + GAP;

        for note in &details.notes {
            let line = format!("{}: {}", note.label, note.text);
            self.text(area, &line, (WIDTH / 2, y), 11, TEXT_MUTED, false, HPos::Center)?;
            y += NOTE_LINE;
        }
        Ok(())
    }

    fn draw_footer(&self, area: &Area, seller: &SellerFooter, top: i32) -> Result<(), ExportError> {
        let center = WIDTH / 2;
        self.rect(area, (FRAME + PAD, top), (WIDTH - FRAME - PAD, top + 2), BORDER_GRAY)?;
        self.text(area, &seller.name, (center, top + 24), 18, TEXT_DARK, true, HPos::Center)?;
        self.text(area, &seller.title, (center, top + 52), 13, TEXT_MUTED, false, HPos::Center)?;
        self.text(area, &seller.address, (center, top + 74), 13, TEXT_MUTED, false, HPos::Center)?;
        self.text(area, &seller.phone, (center, top + 96), 13, TEXT_MUTED, false, HPos::Center)
    }
}

impl Rasterizer for PlottersRasterizer {
    fn rasterize(&self, layout: &QuoteLayout) -> Result<RgbImage, ExportError> {
        let body_top = FRAME + HEADER + PAD;
        let body_bottom = body_top + Self::body_height(&layout.body);
        let footer_top = body_bottom + GAP;
        let height = match &layout.seller {
            Some(_) => footer_top + FOOTER + PAD + FRAME,
            None => body_bottom + PAD + FRAME,
        };

        let (w, h) = (self.px(WIDTH) as u32, self.px(height) as u32);
        let mut buffer = vec![0u8; (w * h * 3) as usize];
        {
            let area = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
            area.fill(&NAVY).map_err(render_error)?;
            self.rect(&area, (FRAME, FRAME), (WIDTH - FRAME, height - FRAME), WHITE)?;

            self.draw_header(&area, layout.logo.as_ref(), FRAME)?;
            match &layout.body {
                PreviewBody::Placeholder(prompt) => {
                    self.text(&area, prompt, (WIDTH / 2, body_top + PLACEHOLDER_BODY / 2 - 8), 14, TEXT_MUTED, false, HPos::Center)?;
                }
                PreviewBody::Details(details) => self.draw_details(&area, details, body_top)?,
            }
            if let Some(seller) = &layout.seller {
                self.draw_footer(&area, seller, footer_top)?;
            }
            area.present().map_err(render_error)?;
        }

        RgbImage::from_raw(w, h, buffer)
            .ok_or_else(|| ExportError::Render("bitmap buffer has the wrong size".into()))
    }
}

fn render_error(err: impl std::fmt::Display) -> ExportError {
    ExportError::Render(err.to_string())
}
