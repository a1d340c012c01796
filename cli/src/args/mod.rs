pub mod log;
pub mod output;
pub mod request_options;
