pub mod aip;
mod last_aip;
pub mod request;

#[rustfmt::skip]
pub use {
    aip::AipEntity,
    last_aip::LastAip,
    request::ArchiveRequest,
};
