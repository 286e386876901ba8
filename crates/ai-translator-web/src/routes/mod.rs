//! HTTP route handlers for the translator web application.
//!
//! HTML routes use Askama templates from the `templates` module; the download
//! route returns the translated file itself.

mod download;
mod index;
mod translate;

pub use download::download_file;
pub use index::index;
pub use translate::translate_pdf;
