//! API endpoint addressing and the catalogue of exportable resources.

use std::fmt;
use std::str::FromStr;

/// Version path of the current API.
pub const API_V2: &str = "2.0";

/// Version path of the legacy API, whose lists are named arrays.
pub const API_V09: &str = "0.9";

/// A resource path under a specific API version, plus fixed query
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    version: String,
    path: String,
    query: Vec<(String, String)>,
}

impl Endpoint {
    /// An endpoint under an arbitrary API version.
    pub fn new(version: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            path: path.into().trim_matches('/').to_string(),
            query: Vec::new(),
        }
    }

    /// An endpoint of the current (2.0) API.
    pub fn v2(path: impl Into<String>) -> Self {
        Self::new(API_V2, path)
    }

    /// An endpoint of the legacy (0.9) API.
    pub fn v09(path: impl Into<String>) -> Self {
        Self::new(API_V09, path)
    }

    /// A child of this endpoint, e.g. `customers` → `customers/<id>`.
    pub fn join(&self, segment: impl AsRef<str>) -> Self {
        Self {
            version: self.version.clone(),
            path: format!("{}/{}", self.path, segment.as_ref().trim_matches('/')),
            query: self.query.clone(),
        }
    }

    /// Add a fixed query parameter sent with every request.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// The API version path.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The resource path below the version.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fixed query parameters.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.version, self.path)
    }
}

/// Which pagination protocol an endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pagination {
    /// `after=<version>` with a `version.max` high-water mark.
    Version,
    /// `before=<id>` with the last record's id.
    Flake,
}

/// Collections the CLI knows how to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Customers,
    Products,
    Suppliers,
    Users,
    Outlets,
    Registers,
    Sales,
    GiftCards,
    StoreCredits,
    AuditLog,
}

impl Resource {
    /// Every known resource.
    pub const ALL: [Resource; 10] = [
        Resource::Customers,
        Resource::Products,
        Resource::Suppliers,
        Resource::Users,
        Resource::Outlets,
        Resource::Registers,
        Resource::Sales,
        Resource::GiftCards,
        Resource::StoreCredits,
        Resource::AuditLog,
    ];

    /// The kebab-case name used on the command line and in file names.
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Customers => "customers",
            Resource::Products => "products",
            Resource::Suppliers => "suppliers",
            Resource::Users => "users",
            Resource::Outlets => "outlets",
            Resource::Registers => "registers",
            Resource::Sales => "sales",
            Resource::GiftCards => "gift-cards",
            Resource::StoreCredits => "store-credits",
            Resource::AuditLog => "audit-log",
        }
    }

    /// The endpoint this resource lives at.
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Resource::Customers => Endpoint::v2("customers"),
            Resource::Products => Endpoint::v2("products"),
            Resource::Suppliers => Endpoint::v2("suppliers"),
            Resource::Users => Endpoint::v2("users"),
            Resource::Outlets => Endpoint::v2("outlets"),
            Resource::Registers => Endpoint::v2("registers"),
            Resource::Sales => Endpoint::v2("sales"),
            Resource::GiftCards => Endpoint::v2("gift_cards"),
            Resource::StoreCredits => Endpoint::v2("store_credits"),
            Resource::AuditLog => Endpoint::v2("auditlog_events"),
        }
    }

    /// The pagination protocol of this resource's list endpoint.
    pub fn pagination(&self) -> Pagination {
        match self {
            Resource::Sales | Resource::GiftCards | Resource::StoreCredits | Resource::AuditLog => {
                Pagination::Flake
            }
            _ => Pagination::Version,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Resource::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Resource::ALL.iter().map(Resource::name).collect();
                format!("unknown resource '{s}' (known: {})", known.join(", "))
            })
    }
}
