/// The emoji index: a static table of every fully-qualified emoji, searchable
/// by CLDR name and shortcode.
use std::collections::BTreeSet;

use super::modifier::SkinTone;
use super::search::{Keywords, SearchOptions, search};

/// One search hit, resolved for a skin tone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiMatch {
    /// CLDR name, e.g. "grinning face".
    pub name: String,
    /// Canonical identifier, e.g. "grinning" or "thumbsup".
    pub shortcode: String,
    /// Rendered glyph for the requested modifier.
    pub character: String,
    /// Key into the image directory (file stem of the PNG).
    pub image_id: String,
}

/// A search service that turns a query into ranked matches.
pub trait SearchIndex {
    /// Return matches for `query`, best first, with glyphs for `tone`.
    fn search(&self, query: &str, tone: SkinTone) -> Vec<EmojiMatch>;
}

struct Entry {
    emoji: &'static emojis::Emoji,
    shortcode: String,
    keywords: Vec<String>,
}

impl Entry {
    fn new(emoji: &'static emojis::Emoji) -> Self {
        let shortcode = emoji
            .shortcode()
            .map_or_else(|| shortcode_from_name(emoji.name()), str::to_owned);

        let mut keywords = vec![emoji.name().to_owned()];
        let snake = emoji.name().replace(' ', "_");
        if snake != keywords[0] {
            keywords.push(snake);
        }
        for code in emoji.shortcodes() {
            if !keywords.iter().any(|k| k == code) {
                keywords.push(code.to_owned());
            }
        }
        if !keywords.contains(&shortcode) {
            keywords.push(shortcode.clone());
        }

        Self {
            emoji,
            shortcode,
            keywords,
        }
    }

    fn resolve(&self, tone: SkinTone) -> EmojiMatch {
        let glyph = tone
            .variant()
            .and_then(|t| self.emoji.with_skin_tone(t))
            .unwrap_or(self.emoji);
        EmojiMatch {
            name: self.emoji.name().to_owned(),
            shortcode: self.shortcode.clone(),
            character: glyph.as_str().to_owned(),
            image_id: image_id(glyph.as_str()),
        }
    }
}

impl Keywords for Entry {
    fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// In-memory index over the `emojis` table, in CLDR order.
pub struct EmojiIndex {
    entries: Vec<Entry>,
    opts: SearchOptions,
}

impl EmojiIndex {
    /// Build the index. Skin-tone variants are folded into their base emoji.
    #[must_use]
    pub fn new(opts: SearchOptions) -> Self {
        let entries = emojis::iter()
            .filter(|e| matches!(e.skin_tone(), None | Some(emojis::SkinTone::Default)))
            .map(Entry::new)
            .collect();
        Self { entries, opts }
    }

    /// Number of base emojis in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EmojiIndex {
    fn default() -> Self {
        Self::new(SearchOptions::default())
    }
}

impl SearchIndex for EmojiIndex {
    fn search(&self, query: &str, tone: SkinTone) -> Vec<EmojiMatch> {
        search(&self.entries, query, &self.opts)
            .into_iter()
            .map(|r| r.item.resolve(tone))
            .collect()
    }
}

/// Image key for a glyph: lowercase hex code points, zero-padded to four
/// digits, joined by `-` (e.g. "👍🏽" → `1f44d-1f3fd`, "©️" → `00a9-fe0f`).
#[must_use]
pub fn image_id(glyph: &str) -> String {
    glyph
        .chars()
        .map(|c| format!("{:04x}", u32::from(c)))
        .collect::<Vec<_>>()
        .join("-")
}

/// Image keys for every emoji and every skin-tone variant, deduplicated.
#[must_use]
pub fn all_image_ids() -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for emoji in emojis::iter() {
        ids.insert(image_id(emoji.as_str()));
        if let Some(variants) = emoji.skin_tones() {
            for variant in variants {
                ids.insert(image_id(variant.as_str()));
            }
        }
    }
    ids
}

fn shortcode_from_name(name: &str) -> String {
    let mut code = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            code.extend(c.to_lowercase());
        } else if !code.is_empty() && !code.ends_with('_') {
            code.push('_');
        }
    }
    while code.ends_with('_') {
        code.pop();
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id_single() {
        assert_eq!(image_id("😀"), "1f600");
    }

    #[test]
    fn test_image_id_sequence() {
        assert_eq!(image_id("👍🏽"), "1f44d-1f3fd");
        assert_eq!(image_id("\u{a9}\u{fe0f}"), "00a9-fe0f");
    }

    #[test]
    fn test_shortcode_from_name() {
        assert_eq!(shortcode_from_name("flag: Japan"), "flag_japan");
        assert_eq!(shortcode_from_name("A button (blood type)"), "a_button_blood_type");
    }

    #[test]
    fn test_index_not_empty() {
        let index = EmojiIndex::default();
        assert!(index.len() > 1000);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let index = EmojiIndex::default();
        let results = index.search("", SkinTone::None);
        assert_eq!(results.len(), index.len());
        assert_eq!(results[0].character, "😀");
    }

    #[test]
    fn test_grinning_first() {
        let index = EmojiIndex::default();
        let results = index.search("grinning", SkinTone::None);
        let first = &results[0];
        assert_eq!(first.name, "grinning face");
        assert_eq!(first.shortcode, "grinning");
        assert_eq!(first.character, "😀");
        assert_eq!(first.image_id, "1f600");
    }

    #[test]
    fn test_exact_shortcode_ranks_first() {
        let index = EmojiIndex::default();
        for query in ["heart", "cat", "fire"] {
            let results = index.search(query, SkinTone::None);
            assert_eq!(results[0].shortcode, query, "top hit for {query:?}");
        }
    }

    #[test]
    fn test_query_punctuation_is_literal() {
        let index = EmojiIndex::default();
        let results = index.search("!", SkinTone::None);
        assert!(results.len() < index.len());
        assert!(results.iter().all(|m| m.name.contains('!')));
        assert!(index.search("^", SkinTone::None).is_empty());
    }

    #[test]
    fn test_skin_tone_applied() {
        let index = EmojiIndex::default();
        let results = index.search("thumbs up", SkinTone::Medium);
        let hit = results
            .iter()
            .find(|m| m.name == "thumbs up")
            .expect("thumbs up present");
        assert_eq!(hit.character, "👍🏽");
        assert_eq!(hit.image_id, "1f44d-1f3fd");
    }

    #[test]
    fn test_skin_tone_ignored_without_variants() {
        let index = EmojiIndex::default();
        let results = index.search("grinning", SkinTone::Dark);
        assert_eq!(results[0].character, "😀");
    }

    #[test]
    fn test_no_match() {
        let index = EmojiIndex::default();
        assert!(index.search("zzzzqqqxxj", SkinTone::None).is_empty());
    }

    #[test]
    fn test_all_image_ids_include_variants() {
        let ids = all_image_ids();
        assert!(ids.contains("1f600"));
        assert!(ids.contains("1f44d"));
        assert!(ids.contains("1f44d-1f3fd"));
    }
}
