/// Recommended error type for a benchmark `main` function. Compatible with everything the runner
/// returns so that `?` can be used throughout.
pub type BenchResult<T> = anyhow::Result<T>;
