//! Sample refactoring providers.

pub use self::introduce_local::IntroduceLocalRefactoring;
pub use self::swap_operands::SwapOperandsRefactoring;

mod introduce_local;
mod swap_operands;
