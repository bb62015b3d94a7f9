/// Emoji domain layer: skin-tone modifiers, the emoji index, fuzzy search.
pub mod errors;
pub mod index;
pub mod modifier;
pub mod search;

pub use errors::EmojiError;
pub use index::{EmojiIndex, EmojiMatch, SearchIndex, all_image_ids, image_id};
pub use modifier::SkinTone;
pub use search::{SearchOptions, search};
