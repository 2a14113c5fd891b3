pub mod match_record;
pub mod order;

pub use match_record::Match;
pub use order::{Order, OrderStatus, OrderType, Side};
