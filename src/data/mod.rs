/// Extraction core: line schemas, matching, field extraction, series
/// building and alignment.
///
/// Architecture:
/// ```text
///   benchmark .log
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  tags + marker per line, pick layout variant
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ extract   │  schema fields → Sample, unit transform
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  one scan → Series per category (file order)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  align    │  zip equal-length series → AlignedTable
///   └──────────┘
/// ```

pub mod align;
pub mod extract;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
