//! HTML extraction for catalogue, series and reader pages

mod detail;
mod html;
mod list;
mod reader;
mod script_arrays;
mod slug;

pub use detail::parse_manga_detail;
pub use list::parse_manga_list;
pub use reader::{parse_chapter_images, ImageExtraction};
pub use script_arrays::find_json_arrays_in_text;
pub use slug::extract_slug_from_href;
