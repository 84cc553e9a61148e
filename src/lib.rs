pub mod animate;
pub mod bbox;
pub mod config;
pub mod extract;
pub mod readers;
pub mod table;
pub mod time;
pub mod trend;
pub mod utils;
