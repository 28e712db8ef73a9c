mod mapper;

pub use mapper::to_run_config;
