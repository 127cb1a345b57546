mod dispatch;
pub mod msg;
pub mod oais;
pub mod storage;
mod versioning;

#[rustfmt::skip]
pub use {
    dispatch::*,
    versioning::*,
};
