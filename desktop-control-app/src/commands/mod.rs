pub mod health;
pub mod serve_demo;
pub mod status;
