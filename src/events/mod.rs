pub mod keyboard;
pub mod layout;
pub mod pointer;

pub use keyboard::wire_exit_key;
pub use layout::wire_layout_change;
pub use pointer::wire_pointer_fallback;
