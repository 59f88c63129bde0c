pub mod automation;
pub mod command;
pub mod instances;
pub mod parameter;
pub mod sessions;
pub mod tags;
pub mod template;
pub mod windows;

pub use instances::instances;
pub use windows::windows;
