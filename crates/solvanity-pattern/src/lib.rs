//! SolVanity Pattern & Command Builder
//!
//! Search constraints and their translation into `solana-keygen grind` arguments.

mod constraints;
mod difficulty;
mod invocation;

pub use constraints::{
    ConstraintError, GrindPattern, MnemonicLanguage, SearchConstraints, WordCount,
    BASE58_ALPHABET, MAX_ADDRESS_LEN,
};
pub use difficulty::{calculate_difficulty, format_difficulty, format_duration};
pub use invocation::{Invocation, GRIND_SUBCOMMAND};
