//! Order records and the values they are built from.

pub mod line_item;
pub mod order;
pub mod record;

pub use line_item::*;
pub use order::*;
pub use record::*;
