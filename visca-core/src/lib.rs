mod modules;

pub use modules::classifier::classify;
pub use modules::command::{CamZoomFunction, Command, Direction, PanTiltFunction};
pub use modules::constants;
pub use modules::description::{Description, FormError, ReplyTag};
pub use modules::former::form;
pub use modules::nibbles;
