pub mod currency;
pub mod importer;
pub mod pdf;
pub mod preview;
pub mod raster;

pub use pdf::{can_export, export_blockers, export_filename, PageSpec};
pub use preview::{render_preview, QuoteLayout};
pub use raster::{PlottersRasterizer, Rasterizer};
