/// Default bound on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default bound on expression tree height.
pub const DEFAULT_MAX_HEIGHT: usize = 1024;

/// Resource limits applied while parsing and evaluating expressions.
///
/// `max_depth` bounds nesting: parentheses, `not` and unary minus. Ten
/// thousand nested parentheses fail with `ExpressionTooComplex` instead of
/// exhausting the stack.
///
/// `max_height` bounds the height of the resulting tree. Flat operator
/// chains such as `a + b + c + ...` do not nest, but every operator adds a
/// level to the tree, so this cap is much larger than `max_depth`. The
/// evaluator checks it again for trees built by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    pub max_depth: usize,
    pub max_height: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_height: DEFAULT_MAX_HEIGHT,
        }
    }
}

impl Limits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_height(mut self, max_height: usize) -> Self {
        self.max_height = max_height;
        self
    }
}
