//! QoS resource map validation
//!
//! Checks a pod- or container-scoped resource map against the capability
//! catalog before any class is resolved. Native types are accepted as
//! known here; their class legality is decided by the class resolver.

use tracing::info;

use qosgate_core::{
    CapabilityCatalog, Error, QosResourceRequest, ResourceKind, ResourceScope, Result,
};

/// Validate one `(resource type, class)` pair
///
/// # Errors
/// - [`Error::EmptyClassName`] if `class` is empty, for every resource type
/// - [`Error::UnknownResourceType`] if the type is not registered in `scope`
/// - [`Error::UnknownClass`] if an extension type does not offer `class`
pub fn validate_class(
    catalog: &CapabilityCatalog,
    scope: ResourceScope,
    resource_type: &str,
    class: &str,
) -> Result<ResourceKind> {
    if class.is_empty() {
        return Err(Error::EmptyClassName {
            resource_type: resource_type.to_string(),
        });
    }

    let entry = catalog
        .lookup(scope, resource_type)
        .ok_or_else(|| Error::UnknownResourceType {
            resource_type: resource_type.to_string(),
        })?;

    if entry.kind() == ResourceKind::Extension && !entry.has_class(class) {
        return Err(Error::UnknownClass {
            resource_type: resource_type.to_string(),
            class: class.to_string(),
        });
    }

    Ok(entry.kind())
}

/// Validate a whole resource map, stopping at the first violation
///
/// Extension assignments that pass are logged; they have no further effect
/// on the launch descriptor.
pub fn validate_resources(
    catalog: &CapabilityCatalog,
    scope: ResourceScope,
    request: &QosResourceRequest,
) -> Result<()> {
    for (resource_type, class) in request.iter() {
        if validate_class(catalog, scope, resource_type, class)? == ResourceKind::Extension {
            info!(%scope, resource_type, class, "Setting QoS resource");
        }
    }
    Ok(())
}
