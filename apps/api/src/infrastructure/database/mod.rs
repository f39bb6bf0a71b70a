pub mod pool;
pub mod probe_transport;
