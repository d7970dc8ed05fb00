//! Client-side file exports of a page: data as CSV, the table as a Word
//! document, the chart as a PNG image.

pub mod csv;
pub mod document;
pub mod raster;
pub mod svg;

use serde::Serialize;

use crate::catalog::PageSpec;
use crate::i18n::{self, Language};

pub use self::csv::table_to_csv;
pub use document::table_to_document;
pub use raster::{register_font, svg_to_png};
pub use svg::{ImageExport, render_svg};

/// Why an export produced nothing. No partial file is ever written.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("chart is not available for export")]
    MissingChart,
    #[error("data table is not available for export")]
    MissingTable,
    #[error("page data is still loading or failed to load")]
    NotReady,
    #[error("csv: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("csv output was not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("docx package: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("writing export: {0}")]
    Io(#[from] std::io::Error),
    #[error("png encoding: {0}")]
    Png(#[from] png::EncodingError),
    #[error("rasterizing chart: {0}")]
    Raster(String),
}

impl ExportError {
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::MissingChart => "export.missing_chart",
            Self::MissingTable | Self::Csv(_) | Self::Utf8(_) => "export.missing_table",
            Self::NotReady => "export.not_ready",
            Self::Archive(_) | Self::Io(_) | Self::Png(_) | Self::Raster(_) => "export.failed",
        }
    }

    /// Text for the alert shown to the reader.
    pub fn alert(&self, lang: Language) -> &'static str {
        i18n::text(self.message_key(), lang)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Document,
    Image,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Document => "docx",
            Self::Image => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv;charset=utf-8",
            Self::Document => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Self::Image => "image/png",
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            Self::Csv => "export.csv",
            Self::Document => "export.document",
            Self::Image => "export.image",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "document" | "doc" | "docx" | "word" => Ok(Self::Document),
            "image" | "png" => Ok(Self::Image),
            other => Err(format!("unknown export format `{other}` (expected csv, document or image)")),
        }
    }
}

/// `capital-expenditures.csv` / `depenses-immobilisations.csv`
pub fn file_name(page: &PageSpec, lang: Language, format: ExportFormat) -> String {
    format!("{}.{}", page.file_stem(lang), format.extension())
}
