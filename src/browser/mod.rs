pub mod launch;

pub use launch::launch_session;
