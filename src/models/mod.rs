pub mod attachment;
pub mod category;
pub mod chapter;
pub mod course;
pub mod mux_data;
pub mod progress;
pub mod purchase;
