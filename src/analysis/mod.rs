/// Analysis layer: the comparison pipeline.
///
/// ```text
///   Spectrum A, Spectrum B
///        │
///        ▼
///   ┌──────────┐
///   │ resample │  common grid [λ0, λ1) step dλ, both scaled to 1.0 at λn
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ detrend  │  optional: subtract mean / linear / quadratic / cubic baseline
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ similarity │  cosine similarity → spectral angle
///   └────────────┘
/// ```
///
/// Every stage is a free function over immutable values.
pub mod detrend;
pub mod pipeline;
pub mod resample;
pub mod similarity;
