pub mod utils;

pub use utils::current_timestamp;
