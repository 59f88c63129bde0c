mod blocking;
pub mod client;
mod convert;

pub use blocking::SdkSsmClient;
