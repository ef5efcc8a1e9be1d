pub mod client;
pub mod discovery;
pub mod dispatcher;

pub use client::{EqusendClient, RunReport};
pub use dispatcher::{TaskStage, TransferOutcome};
