// 探测代理服务层
pub mod dedup;
pub mod discovery;
pub mod executor;
pub mod identity;
pub mod orchestrator;
pub mod reporter;
pub mod transport;

pub use dedup::CycleState;
pub use discovery::{DockerDiscovery, TargetDiscovery};
pub use executor::ProbeExecutor;
pub use identity::AgentIdentity;
pub use orchestrator::{CycleReport, ProbeOrchestrator};
pub use reporter::{OutcomeReporter, ResultReporter};
pub use transport::{NativeTransport, ProbeTransport, SubprocessTransport};
