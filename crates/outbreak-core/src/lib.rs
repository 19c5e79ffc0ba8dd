#![deny(warnings)]
pub mod game;
pub mod model;
pub mod odds;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "outbreak"
    }

    pub const fn codename() -> &'static str {
        "Nerd Herd"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
