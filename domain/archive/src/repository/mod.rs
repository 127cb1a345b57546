mod aip;
mod last_aip;
mod request;

#[rustfmt::skip]
pub use {
    aip::AipRepo,
    last_aip::LastAipRepo,
    request::RequestRepo,
};
