pub mod node;
pub mod propagate;

pub use node::NodeService;
pub use propagate::{CLIENT_RESERVE_EXPIRY_SECS, PropagateTask, Propagator};
