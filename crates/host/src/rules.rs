//! Sample analyzers and code fix providers.

pub use self::comparison::{ComparisonAnalyzer, ComparisonFixProvider};
pub use self::empty_else::{EmptyElseAnalyzer, RemoveEmptyElseFixProvider};
pub use self::unresolved_import::RemoveUnresolvedImportFixProvider;

mod comparison;
mod empty_else;
mod unresolved_import;
