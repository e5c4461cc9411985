pub mod check;
pub mod crop;
pub mod filter;
pub mod probe;
pub mod serve;
