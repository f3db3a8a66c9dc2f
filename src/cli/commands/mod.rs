//! CLI command implementations.

mod channel;
mod config;
mod doctor;
mod generate;
mod info;
mod list;
mod speak;
mod status;
mod summarize;
mod transcript;
mod voices;

pub use channel::run_channel;
pub use config::run_config;
pub use doctor::run_doctor;
pub use generate::run_generate;
pub use info::run_info;
pub use list::run_list;
pub use speak::run_speak;
pub use status::run_status;
pub use summarize::run_summarize;
pub use transcript::run_transcript;
pub use voices::run_voices;
