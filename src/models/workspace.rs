use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use image::ImageFormat;
use super::quote::QuoteData;

/// An uploaded image, kept as raw bytes plus the detected MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub mime: &'static str,
    pub bytes: Bytes,
}

impl Attachment {
    /// Accepts the bytes only if they are a recognised image format.
    pub fn from_image_bytes(bytes: Bytes) -> Option<Self> {
        let format = image::guess_format(&bytes).ok()?;
        Some(Self { mime: mime_for(format), bytes })
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSlot {
    Logo,
    Vehicle,
    Spreadsheet,
}

impl UploadSlot {
    fn index(self) -> usize {
        match self {
            UploadSlot::Logo => 0,
            UploadSlot::Vehicle => 1,
            UploadSlot::Spreadsheet => 2,
        }
    }
}

/// Editing state of one quote: the figures, both images, the chosen seller
/// and the name of the last imported spreadsheet.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    pub owner_id: String,
    pub quote: QuoteData,
    pub logo: Option<Attachment>,
    pub vehicle: Option<Attachment>,
    pub seller_id: Option<String>,
    pub spreadsheet_name: Option<String>,
    tickets: [u64; 3],
}

impl Workspace {
    pub fn new(owner_id: String) -> Self {
        Self {
            seller_id: Some(owner_id.clone()),
            owner_id,
            ..Default::default()
        }
    }

    /// Issues the ticket for an upload that is about to be read. Any earlier
    /// ticket for the same slot becomes stale.
    pub fn begin_upload(&mut self, slot: UploadSlot) -> u64 {
        let ticket = &mut self.tickets[slot.index()];
        *ticket += 1;
        *ticket
    }

    /// Withdraws `ticket` after its upload was rejected, so an earlier upload
    /// still in flight for the slot becomes current again.
    pub fn cancel_upload(&mut self, slot: UploadSlot, ticket: u64) {
        let current = &mut self.tickets[slot.index()];
        if *current == ticket {
            *current -= 1;
        }
    }

    pub fn is_current(&self, slot: UploadSlot, ticket: u64) -> bool {
        self.tickets[slot.index()] == ticket
    }

    /// Drops quote figures, images and the file name. Seller and tickets stay.
    pub fn reset(&mut self) {
        self.quote = QuoteData::default();
        self.logo = None;
        self.vehicle = None;
        self.spreadsheet_name = None;
    }
}
