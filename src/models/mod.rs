pub mod ping_result;
pub mod probe;

pub use ping_result::*;
pub use probe::*;
