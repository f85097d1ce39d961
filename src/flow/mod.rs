pub mod artifact;
pub mod conversion;
pub mod definition;
pub mod ui;

pub use conversion::*;
pub use definition::*;
pub use ui::EditorGraph;
