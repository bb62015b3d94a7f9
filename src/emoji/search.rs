/// Fuzzy search over keyword-bearing entries.
use std::cmp::Reverse;

use nucleo_matcher::{
    Matcher, Utf32Str,
    pattern::{AtomKind, CaseMatching, Normalization, Pattern},
};

/// Something that can be matched against a query by its keywords.
pub trait Keywords {
    /// Haystacks to match against. The best-scoring one counts.
    fn keywords(&self) -> &[String];
}

/// A search result with its match score.
#[derive(Debug, Clone)]
pub struct SearchResult<'a, T> {
    /// The matched entry.
    pub item: &'a T,
    /// Match score (higher = better match). 0 for empty queries.
    pub score: u32,
}

/// Search options.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Maximum number of results to return. 0 means unlimited.
    pub limit: usize,
}

/// Search entries by query string.
///
/// An empty (or whitespace-only) query matches every entry in its original
/// order. Otherwise each whitespace-separated word must fuzzy-match; query
/// characters are taken literally. Ranking:
/// 1. a keyword equal to the query (ignoring case)
/// 2. higher score
/// 3. a keyword starting with the query
/// 4. shorter matching keyword
///
/// Remaining ties keep the original order.
#[must_use]
pub fn search<'a, T: Keywords>(
    items: &'a [T],
    query: &str,
    opts: &SearchOptions,
) -> Vec<SearchResult<'a, T>> {
    let query = query.trim();
    let mut results = if query.is_empty() {
        items
            .iter()
            .map(|item| SearchResult { item, score: 0 })
            .collect()
    } else {
        fuzzy_search(items, query)
    };

    if opts.limit > 0 {
        results.truncate(opts.limit);
    }
    results
}

/// How well one entry matched. Fields compare in order; greater ranks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Rank {
    exact: bool,
    score: u32,
    prefix: bool,
    len: Reverse<usize>,
}

fn fuzzy_search<'a, T: Keywords>(items: &'a [T], query: &str) -> Vec<SearchResult<'a, T>> {
    let pattern = Pattern::new(
        query,
        CaseMatching::Smart,
        Normalization::Smart,
        AtomKind::Fuzzy,
    );
    let needle = query.to_lowercase();
    let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);
    let mut buf = Vec::new();

    let mut ranked = Vec::new();
    for item in items {
        let mut best: Option<Rank> = None;
        for keyword in item.keywords() {
            let haystack = Utf32Str::new(keyword, &mut buf);
            let Some(score) = pattern.score(haystack, &mut matcher) else {
                continue;
            };
            let lower = keyword.to_lowercase();
            let rank = Rank {
                exact: lower == needle,
                score,
                prefix: lower.starts_with(&needle),
                len: Reverse(keyword.chars().count()),
            };
            best = Some(best.map_or(rank, |b| b.max(rank)));
        }
        if let Some(rank) = best {
            ranked.push((rank, item));
        }
    }

    // Stable sort: full ties keep catalog order.
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked
        .into_iter()
        .map(|(rank, item)| SearchResult {
            item,
            score: rank.score,
        })
        .collect()
}
