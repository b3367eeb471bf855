//! Lexical scope coordinates
//!
//! Every token is tagged with the brace depth it appears at and the id of
//! the brace region it belongs to. Region ids increase on every `{` and `}`,
//! so two sibling blocks at the same depth never share an id:
//!
//! ```text
//! { int a = 1; } { int b = a; }
//!   (1, 1)         (1, 3)
//! ```

use std::fmt;

/// The (depth, region id) pair of a lexical position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScopeCoord {
    /// Brace nesting depth, 0 at top level. Only negative for unbalanced `}`.
    pub depth: i32,
    /// Bumped on every brace, never reused within a script
    pub region: u32,
}

impl ScopeCoord {
    pub fn new(depth: i32, region: u32) -> Self {
        Self { depth, region }
    }

    /// Whether a declaration at `self` may be read or written from `site`
    ///
    /// Same coordinate, or a strictly shallower and strictly older region.
    /// This approximates "`self` encloses `site`", which holds for scripts
    /// made of straight-line blocks.
    pub fn is_visible_from(&self, site: ScopeCoord) -> bool {
        *self == site || (self.depth < site.depth && self.region < site.region)
    }
}

impl fmt::Display for ScopeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab level: {}, tab id: {}", self.depth, self.region)
    }
}

/// Tracks the current scope coordinate while scanning
#[derive(Debug, Default)]
pub struct ScopeTracker {
    current: ScopeCoord,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ScopeCoord {
        self.current
    }

    /// Feed one character, returning the coordinate for the token it starts
    pub fn advance(&mut self, c: char) -> ScopeCoord {
        match c {
            '{' => {
                self.current.depth += 1;
                self.current.region += 1;
            }
            '}' => {
                self.current.depth -= 1;
                self.current.region += 1;
            }
            _ => {}
        }
        self.current
    }
}
