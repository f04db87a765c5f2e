//! Domain types for ScreenLab

pub mod bar;
pub mod ids;

pub use bar::Bar;
pub use ids::{DatasetHash, QueryHash, ScreenId};

/// Symbol type alias
pub type Symbol = String;
