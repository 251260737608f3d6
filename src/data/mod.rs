/// Data layer: loading, aggregation, and export.
///
/// Architecture:
/// ```text
///  <school>_환경데이터.csv      4개교_생육결과데이터.xlsx
///        │                            │
///        ▼                            ▼
///   ┌──────────┐                ┌──────────┐
///   │  loader   │  one table     │  loader   │  one table
///   └──────────┘  per school     └──────────┘  per sheet
///        │                            │
///        └──────────┬─────────────────┘
///                   ▼
///             ┌──────────┐
///             │ Snapshot  │  immutable; both datasets or nothing
///             └──────────┘
///                   │
///         ┌─────────┴─────────┐
///         ▼                   ▼
///    ┌──────────┐        ┌──────────┐
///    │ analysis  │        │  export   │
///    └──────────┘        └──────────┘
///     Summary (means,     concatenated
///     best EC, spreads)   XLSX files
/// ```

pub mod analysis;
pub mod error;
pub mod export;
pub mod loader;
pub mod model;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testutil;
