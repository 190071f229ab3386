/// Data layer: spectrum model and file loading.
///
/// Architecture:
/// ```text
///  a.csv + b.csv            ab.xlsx / ab.csv / ab.parquet
///        │                          │
///        ▼                          ▼
///   ┌───────────────┐      ┌──────────────┐
///   │ load_spectrum │      │  load_sheet  │  per-pair gap filtering
///   └───────────────┘      └──────────────┘
///        │                          │
///        └────────────┬─────────────┘
///                     ▼
///              ┌──────────────┐
///              │   Spectrum   │  validated samples, eval(λ)
///              └──────────────┘
/// ```
pub mod loader;
pub mod model;
