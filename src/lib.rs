pub mod catalog;
pub mod cli;
pub mod config;
pub mod crossval;
pub mod ctx;
pub mod differential;
pub mod input;
pub mod io;
pub mod math;
pub mod pd;
pub mod pipeline;
pub mod schema;
pub mod scores;
pub mod trajectory;
