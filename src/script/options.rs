/// Default ceiling of nested grammar rules.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for parsing scripts and expressions.
///
/// # Examples
///
/// ```rust
/// use hyperstack::script::ParseOptions;
///
/// let options = ParseOptions::new().with_max_depth(64);
/// assert_eq!(options.max_depth, 64);
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Number of nested grammar rules after which parsing stops with
    /// [`Error::GrammarTooDeep`](crate::common::Error::GrammarTooDeep)
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Create a new `ParseOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ceiling of nested grammar rules.
    ///
    /// Every parenthesis level of an expression costs about a dozen rules.
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
