pub mod api;
pub mod backend;
pub mod conf;
pub mod coordinator;
pub mod core;
pub mod report;
pub mod service;
pub mod timing;
pub mod topology;
pub mod workload;

#[cfg(feature = "testutil")]
pub mod testutil;
