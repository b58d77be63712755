pub mod ping_result;

pub use ping_result::PingResultRepository;
