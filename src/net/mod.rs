pub mod agents;
pub mod http;
pub mod intel;
pub mod ports;
pub mod resolver;

pub use http::{FetchOptions, HttpProbe, HttpResponse, ReqwestProbe};
pub use intel::{CheckHostIntel, IntelAnswer, IntelLookup};
pub use ports::{PortProbe, TcpPortProbe, PORT_PROBE_TIMEOUT};
pub use resolver::{HickoryResolver, RecordKind, Resolver};
