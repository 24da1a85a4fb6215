pub mod assistant;
pub mod client;
#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "gemini")]
pub mod types;

pub use assistant::*;
pub use client::*;
#[cfg(feature = "gemini")]
pub use gemini::GeminiService;
