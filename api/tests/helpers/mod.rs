pub mod app;
pub mod ctx;

pub use app::{body_json, make_test_app, request};
pub use ctx::{TestCtx, setup};
