pub mod search;
pub mod special;

pub use search::HashBasedGridSearcher;
