pub mod batch;
pub mod bulk_row;
pub mod qr;
pub mod utm;
