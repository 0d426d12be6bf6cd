// Command line and orchestration for the wallights binary.

pub mod cli;
pub mod pipeline;
