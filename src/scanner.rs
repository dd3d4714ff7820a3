//! Interface scanner: finds every interface-typed declaration in a package.

use crate::core::Package;
use crate::errors::Result;
use crate::frontend::resolve::{Method, Resolution, Resolver};
use tracing::debug;

/// One interface found in package scope with its flattened method set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedInterface {
    pub name: String,
    pub methods: Vec<Method>,
}

/// Walks the package scope in enumeration order and keeps the names whose
/// type resolves to an interface.
pub fn scan_interfaces(package: &Package) -> Result<Vec<ScannedInterface>> {
    let resolver = Resolver::new(&package.scope);
    let mut interfaces = Vec::new();

    for object in package.scope.objects() {
        match resolver.resolve_object(object)? {
            Resolution::Interface { iface, type_params } => {
                let methods = resolver.method_set(object, &iface, &type_params)?;
                debug!("interface {} has {} methods", object.name, methods.len());
                interfaces.push(ScannedInterface {
                    name: object.name.clone(),
                    methods,
                });
            }
            Resolution::NotInterface | Resolution::Unresolved => {
                debug!("skipping {} {}", object.kind.describe(), object.name);
            }
        }
    }

    Ok(interfaces)
}
