pub mod cli;
pub mod demo;
pub mod watch;
pub mod wave;
pub mod waves;
