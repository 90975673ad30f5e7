//! List query pipeline
//!
//! A list request runs a snapshot of the catalog through five fixed stages:
//!
//! 1. genre filter
//! 2. studio filter
//! 3. sort
//! 4. text search
//! 5. pagination
//!
//! The pipeline never mutates the snapshot and never fails: unusable
//! `page`/`limit` values fall back to their defaults.

use crate::store::models::{Cartoon, FieldValue};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Page returned when `page` is absent or unusable
pub const DEFAULT_PAGE: usize = 1;

/// Page size returned when `limit` is absent or unusable
pub const DEFAULT_LIMIT: usize = 9;

/// Sort direction parsed from the `sortBy` suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Parsed `sortBy` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Split `<field>-<direction>` on the last `-`.
    ///
    /// Anything other than `desc` sorts ascending, and a value without `-`
    /// is a bare field name.
    pub fn parse(raw: &str) -> Self {
        let (key, direction) = match raw.rsplit_once('-') {
            Some((key, "desc")) => (key, SortDirection::Desc),
            Some((key, _)) => (key, SortDirection::Asc),
            None => (raw, SortDirection::Asc),
        };

        Self {
            key: key.to_string(),
            direction,
        }
    }

    /// Compare two cartoons on this key
    pub fn compare(&self, a: &Cartoon, b: &Cartoon) -> Ordering {
        let ordering = compare_field(a, b, &self.key);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Parameters of a list request after parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub genre: Option<String>,
    pub studio: Option<String>,
    pub sort: Option<SortSpec>,
    pub page: usize,
    pub limit: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            genre: None,
            studio: None,
            sort: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQuery {
    /// Build a query from raw query-string parameters.
    ///
    /// Empty strings count as absent.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let text = |name: &str| params.get(name).filter(|v| !v.is_empty()).cloned();

        Self {
            search: text("search").unwrap_or_default(),
            genre: text("genre"),
            studio: text("studio"),
            sort: text("sortBy").map(|raw| SortSpec::parse(&raw)),
            page: parse_count(params.get("page"), DEFAULT_PAGE),
            limit: parse_count(params.get("limit"), DEFAULT_LIMIT),
        }
    }

    /// Run the pipeline over a snapshot of the catalog
    pub fn execute(&self, records: &[Cartoon]) -> PageResult {
        execute(records, self)
    }
}

/// One page of results plus navigation metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub items: Vec<Cartoon>,
    /// Matches after filtering and search, before pagination
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Run the full pipeline: genre, studio, sort, search, paginate
pub fn execute(records: &[Cartoon], query: &ListQuery) -> PageResult {
    let mut matched: Vec<&Cartoon> = records.iter().collect();

    if let Some(genre) = &query.genre {
        matched = filter_by_genre(matched, genre);
    }

    if let Some(studio) = &query.studio {
        matched = filter_by_studio(matched, studio);
    }

    if let Some(sort) = &query.sort {
        stable_sort_by(&mut matched, &|a: &&Cartoon, b: &&Cartoon| sort.compare(a, b));
    }

    if !query.search.is_empty() {
        matched = filter_by_search(matched, &query.search);
    }

    paginate(&matched, query.page, query.limit)
}

/// Single-record lookup using the canonical id coercion
pub fn find_in<'a>(records: &'a [Cartoon], id: &str) -> Option<&'a Cartoon> {
    records.iter().find(|c| c.matches_id(id))
}

pub(crate) fn filter_by_genre<'a>(cartoons: Vec<&'a Cartoon>, genre: &str) -> Vec<&'a Cartoon> {
    cartoons.into_iter().filter(|c| c.genre.contains(genre)).collect()
}

pub(crate) fn filter_by_studio<'a>(cartoons: Vec<&'a Cartoon>, studio: &str) -> Vec<&'a Cartoon> {
    cartoons.into_iter().filter(|c| c.studio == studio).collect()
}

pub(crate) fn filter_by_search<'a>(cartoons: Vec<&'a Cartoon>, search: &str) -> Vec<&'a Cartoon> {
    let needle = search.to_lowercase();
    cartoons
        .into_iter()
        .filter(|c| {
            c.title.to_lowercase().contains(&needle)
                || c.description.to_lowercase().contains(&needle)
                || c.director.to_lowercase().contains(&needle)
        })
        .collect()
}

fn paginate(matched: &[&Cartoon], page: usize, limit: usize) -> PageResult {
    let total = matched.len();
    let start = page.saturating_sub(1).saturating_mul(limit);
    let end = page.saturating_mul(limit);

    let items = matched
        .iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .map(|c| (*c).clone())
        .collect();

    PageResult {
        items,
        total,
        page,
        limit,
        has_next: end < total,
        has_previous: start > 0,
    }
}

/// Compare two cartoons on one field.
///
/// Missing fields and mismatched or non-scalar types compare equal, so the
/// stable sort leaves such pairs in their existing order.
pub fn compare_field(a: &Cartoon, b: &Cartoon, key: &str) -> Ordering {
    match (a.field(key), b.field(key)) {
        (Some(FieldValue::Text(x)), Some(FieldValue::Text(y))) => collate(x, y),
        (Some(FieldValue::Integer(x)), Some(FieldValue::Integer(y))) => x.cmp(&y),
        (Some(FieldValue::Integer(x)), Some(FieldValue::Number(y))) => {
            (x as f64).partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(FieldValue::Number(x)), Some(FieldValue::Integer(y))) => {
            x.partial_cmp(&(y as f64)).unwrap_or(Ordering::Equal)
        }
        (Some(FieldValue::Number(x)), Some(FieldValue::Number(y))) => {
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        _ => Ordering::Equal,
    }
}

/// Human ordering for text: case-insensitive natural order.
///
/// Strings equal up to case put the lowercase form first.
pub fn collate(a: &str, b: &str) -> Ordering {
    natord::compare_ignore_case(a, b).then_with(|| natord::compare(b, a))
}

/// Stable merge sort.
///
/// `compare_field` is not a total order once missing or mixed-type fields
/// are involved, and `slice::sort_by` may panic on such comparators.
fn stable_sort_by<T: Copy, F>(items: &mut Vec<T>, compare: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return;
    }

    let mut right = items.split_off(items.len() / 2);
    let mut left = std::mem::take(items);
    stable_sort_by(&mut left, compare);
    stable_sort_by(&mut right, compare);

    items.reserve(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if compare(&right[j], &left[i]) == Ordering::Less {
            items.push(right[j]);
            j += 1;
        } else {
            items.push(left[i]);
            i += 1;
        }
    }
    items.extend_from_slice(&left[i..]);
    items.extend_from_slice(&right[j..]);
}

/// Parse a page number or size, falling back to `default`.
fn parse_count(raw: Option<&String>, default: usize) -> usize {
    raw.and_then(|value| parse_leading_int(value))
        .filter(|n| *n >= 1)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(default)
}

/// Lenient integer read: leading whitespace, optional sign, then digits.
/// Trailing characters are ignored (`"2abc"` reads as 2).
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }

    let value: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -value } else { value })
}
