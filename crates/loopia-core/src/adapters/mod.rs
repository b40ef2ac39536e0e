//! Resource and data-source adapters
//!
//! One adapter per remote concept. Each converts between host state and
//! API records and sequences client calls; none of them talk to the network
//! directly.
//!
//! | Type name              | Kind        |
//! |------------------------|-------------|
//! | `loopia_domain`        | data source |
//! | `loopia_domains`       | data source |
//! | `loopia_subdomain`     | resource    |
//! | `loopia_subdomains`    | data source |
//! | `loopia_zone_record`   | resource    |
//! | `loopia_zone_records`  | data source |

pub mod domain;
pub mod subdomain;
pub mod subdomains;
pub mod zone_record;
pub mod zone_records;

pub use domain::{DomainDataSource, DomainsDataSource};
pub use subdomain::SubdomainResource;
pub use subdomains::SubdomainsDataSource;
pub use zone_record::ZoneRecordResource;
pub use zone_records::ZoneRecordsDataSource;

use crate::registry::{AdapterFactory, AdapterRegistry};

/// Register every built-in adapter with a registry
pub fn register(registry: &mut AdapterRegistry) {
    registry.register_resource(Box::new(AdapterFactory::<SubdomainResource>::new()));
    registry.register_resource(Box::new(AdapterFactory::<ZoneRecordResource>::new()));

    registry.register_data_source(Box::new(AdapterFactory::<DomainDataSource>::new()));
    registry.register_data_source(Box::new(AdapterFactory::<DomainsDataSource>::new()));
    registry.register_data_source(Box::new(AdapterFactory::<SubdomainsDataSource>::new()));
    registry.register_data_source(Box::new(AdapterFactory::<ZoneRecordsDataSource>::new()));
}
