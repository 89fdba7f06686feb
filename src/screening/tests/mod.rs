mod common;

mod engine;
mod ranking;
