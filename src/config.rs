//! Loader-wide configuration.
//!
//! Mirrors the shape of the upstream `Config` type this crate grew from:
//! a single [`typed_builder::TypedBuilder`]-derived struct with sensible
//! defaults, threaded through every stage instead of hard-coded constants.

use typed_builder::TypedBuilder;

/// Default number of relocation entries processed before yielding once to
/// the host scheduler.
pub const DEFAULT_RESOLVER_THREAD_YIELD_STEP: u32 = 30;

/// Minimum size, in bytes, of the application manifest record carried in
/// `.fapmeta`.
pub const DEFAULT_MANIFEST_MIN_SIZE: u32 = 12;

#[derive(Debug, Clone, TypedBuilder)]
/// Tunables for one load. Construct with [`LoaderConfig::builder`], or use
/// [`Default::default`] for the values this loader ships with.
pub struct LoaderConfig {
    #[builder(default = DEFAULT_RESOLVER_THREAD_YIELD_STEP)]
    /// How many relocation entries are processed between cooperative
    /// scheduler yields.
    pub yield_interval: u32,

    #[builder(default = DEFAULT_MANIFEST_MIN_SIZE)]
    /// Minimum accepted size of the `.fapmeta` section.
    pub manifest_min_size: u32,

    #[builder(default = true)]
    /// When true, a `.fapmeta` section smaller than `manifest_min_size` is
    /// rejected. A section larger than the minimum is always accepted
    /// regardless of this flag (forward-compatible manifest growth).
    pub strict_manifest_size: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
