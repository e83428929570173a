use std::net::{IpAddr, Ipv4Addr, SocketAddr};

// Label set on every cluster object managed by keip.
pub const CREATED_BY_LABEL: &str = "app.kubernetes.io/created-by";

// Value of the managed-by label.
pub const CREATED_BY_VALUE: &str = "keip";

// Suffix appended to a route name to derive its ConfigMap name.
pub const CONFIGMAP_SUFFIX: &str = "-cm";

// The single data key under which a route's XML definition is stored.
pub const ROUTE_XML_KEY: &str = "integrationRoute.xml";

// Namespace used for deployment entries that do not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

// Container image run for each deployed route unless overridden.
pub const DEFAULT_INTEGRATION_IMAGE: &str = "keip-integration";

// Address the HTTP server binds to unless overridden.
pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
