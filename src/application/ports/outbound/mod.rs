//! Outbound ports - contracts the application depends on

mod oracle_port;

pub use oracle_port::RulesOracle;
