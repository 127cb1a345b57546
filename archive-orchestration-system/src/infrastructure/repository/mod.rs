mod aip;
mod last_aip;
mod request;

#[rustfmt::skip]
pub use {
    aip::DashMapAipRepo,
    last_aip::DashMapLastAipRepo,
    request::DashMapRequestRepo,
};
