mod diff;
mod event;
mod frequency;
mod observer;

pub use diff::*;
pub use event::*;
pub use frequency::*;
pub use observer::*;
