pub mod route_monitor;
