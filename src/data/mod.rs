/// Data layer: registry, loading, filter planning and the query pipeline.
///
/// Architecture:
/// ```text
///   label
///     │
///     ▼
///   ┌──────────┐
///   │ registry  │  label → source identifier
///   └──────────┘
///     │
///     ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table, memoized in TableCache
///   └──────────┘
///     │
///     ▼
///   ┌──────────┐
///   │ planner   │  classify columns, user inputs → predicates
///   └──────────┘
///     │
///     ▼
///   ┌──────────┐
///   │  query    │  AND of predicates, stable sort on the measure
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod planner;
pub mod query;
pub mod registry;
