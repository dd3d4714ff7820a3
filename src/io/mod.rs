pub mod output;

pub use output::{write_output, DIR_MODE, FILE_MODE};
