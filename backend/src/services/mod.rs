pub mod bulk;
pub mod links;
pub mod qr;
pub mod utm;
