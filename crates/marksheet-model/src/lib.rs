pub mod semester;
pub mod record;
pub mod visitor;
pub mod usn;

pub use semester::*;
pub use record::*;
pub use visitor::*;
pub use usn::{is_plain_usn, next_usn};
