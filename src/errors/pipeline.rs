use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Upload could not be read: {0}")]
    Unreadable(String),

    #[error("Workbook could not be opened: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook has no worksheets")]
    NoSheets,

    #[error("Invalid cell address: {0}")]
    CellAddress(String),

    #[error("Import task failed: {0}")]
    TaskPanic(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Image could not be decoded: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF encoding failed: {0}")]
    Pdf(String),

    #[error("Export timed out after {0} seconds")]
    Timeout(u64),

    #[error("Export task panicked: {0}")]
    TaskPanic(String),

    #[error("Export queue closed")]
    QueueClosed,
}
