//! Fixture marker parsing.
//!
//! Source fixtures mark primary spans with `[|...|]` and additional spans with `{|...|}`.
//! Expected fixtures mark annotations with `{|kind:...|}` (e.g. `{|r:name|}` for rename).

pub use expected::ExpectedTestState;
pub use parser::{parse, MarkedSpan, MarkedText, MarkerSyntax, SpanKind};
pub use test_code::TestCode;

mod expected;
mod parser;
mod test_code;
