pub mod frame;
pub mod loader;
pub mod panel;

pub use frame::{forward_fill, FieldFrame, Frame};
pub use loader::load_panel_csv;
pub use panel::{Panel, PanelBuilder, PanelError};
