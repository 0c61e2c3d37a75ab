//! Input decoding and data source handling.

mod parser;
mod source;
mod spreadsheet;

pub use parser::{Decoder, DecoderConfig, InputFormat};
pub use source::{is_blank, row_from_pairs, CellValue, Dataset, Row, SourceMetadata};
