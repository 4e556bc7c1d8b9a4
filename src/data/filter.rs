use super::model::Category;
use super::schema::{LineSchema, LineVariant};

// ---------------------------------------------------------------------------
// Tag predicate: does a raw log line belong to a category?
// ---------------------------------------------------------------------------

/// Whether every tag occurs somewhere in `line`.
///
/// Plain substring containment: `"Alg = 2"` also matches inside
/// `"Alg = 20"`. Profiles that need to tell those apart must pick tags that
/// include a delimiter.
pub fn contains_all<'a>(line: &str, tags: impl IntoIterator<Item = &'a str>) -> bool {
    tags.into_iter().all(|tag| line.contains(tag))
}

/// Whether `line` carries the schema's metric marker (if any) and all tags
/// of `category`.
pub fn matches(line: &str, category: &Category, schema: &LineSchema) -> bool {
    if let Some(marker) = &schema.marker {
        if !line.contains(marker.as_str()) {
            return false;
        }
    }
    contains_all(line, category.tags())
}

/// Select the layout a matched line was written with.
pub fn variant_of(line: &str, schema: &LineSchema) -> LineVariant {
    if line.contains(schema.discriminator.as_str()) {
        LineVariant::Annotated
    } else {
        LineVariant::Plain
    }
}
