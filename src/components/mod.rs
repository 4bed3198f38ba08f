pub mod dialog;
pub mod grid;
pub mod help;
pub mod location_bar;
pub mod preview;
pub mod status_bar;
