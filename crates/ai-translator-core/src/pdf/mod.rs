mod chunk;
mod document;
mod output;

pub use chunk::split_into_chunks;
pub use document::PdfDocument;
pub use output::{TranslatedChunk, TranslatedDocument, TranslatedPage};
