mod character_controller;
pub use character_controller::*;
mod capture;
pub use capture::*;
mod collision;
pub use collision::*;
mod config;
pub use config::*;
mod input_plugin;
pub use input_plugin::*;
mod locomotion;
pub use locomotion::*;
mod look;
pub use look::*;
