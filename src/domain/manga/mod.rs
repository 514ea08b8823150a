//! Manga domain - catalogue entities and reader URL resolution

mod entity;
mod reader_target;

pub use entity::{
    Chapter, ChapterImages, ExtractionDiagnostics, ImageStrategy, MangaDetail, MangaList,
    MangaSummary, PageLink, Pagination, NO_IMAGES_NOTE, NO_ITEMS_NOTE,
};
pub use reader_target::ReaderTarget;
