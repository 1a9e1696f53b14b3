pub mod serialize;
pub mod slide;

#[cfg(feature = "parse")]
pub mod parse;

pub use serialize::serialize_script;
pub use slide::{Animation, MessageGroup, MessageLine, SlideScript, Transition};

#[cfg(feature = "parse")]
pub use parse::{parse_script, ScriptFile};
