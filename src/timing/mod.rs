pub mod control_point;
pub mod control_point_info;
pub mod control_point_list;
pub mod snapping;
pub mod tick_generator;

pub use control_point::*;
pub use control_point_info::*;
pub use control_point_list::*;
pub use snapping::*;
pub use tick_generator::*;
