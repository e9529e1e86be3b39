//! Model discovery: declared types carrying the persistence marker.

use std::collections::BTreeSet;

use crate::error::LookupError;
use crate::types::{ModelType, TypeDecl, TypeRepository};

/// Collect the types in `packages` annotated with `marker`.
///
/// Every package must resolve; the first one that does not aborts discovery.
/// With `include_nested`, member types are examined as well as top-level ones.
pub fn discover<I, S>(
    types: &dyn TypeRepository,
    packages: I,
    marker: &str,
    include_nested: bool,
) -> Result<BTreeSet<ModelType>, LookupError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut models = BTreeSet::new();

    for package in packages {
        let package = package.as_ref();
        let declared = types.declared_types(package)?;

        for decl in declared {
            let candidates: Vec<&TypeDecl> = if include_nested { decl.walk() } else { vec![decl] };
            for candidate in candidates {
                if candidate.has_annotation(marker) {
                    log::debug!("model {} in {package}", candidate.qualified_name());
                    models.insert(ModelType::from(candidate));
                }
            }
        }
    }

    Ok(models)
}
