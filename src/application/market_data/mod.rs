// Quote pipeline: fetch, normalize, rank, cache
pub mod normalizer;
pub mod ranker;
pub mod snapshot_cache;
pub mod universe_fetcher;

// Daily history with synthetic fallback
pub mod historical;
pub mod synthetic;
