pub mod dispatcher;
pub mod ping;
pub mod resolve;
pub mod scan;
pub mod sweep;
pub mod trace;
