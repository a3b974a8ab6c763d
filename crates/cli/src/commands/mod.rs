//! Subcommand implementations.

mod convert;
mod edit;
mod info;
mod variable;

pub use convert::{SubsetRequest, convert, filenames, subset};
pub use edit::{FlagChange, rename, set_names, set_style_flags};
pub use info::{info, names};
pub use variable::{slice, to_static};
