use super::*;

mod bumper_boot;
mod trace_output;
