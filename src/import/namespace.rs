//! Namespace chains: dotted foreign namespaces to nested host namespaces.

use crate::{
    sema::{DeclId, DeclKind, DeclName, SemanticModel},
    Error::Scaffold,
    Result,
};

fn segments(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }

    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Err(Scaffold(format!("invalid namespace '{path}'")));
    }
    Ok(parts)
}

fn namespace_in(model: &SemanticModel, context: DeclId, name: &str) -> Option<DeclId> {
    model.lookup(context, name).into_iter().find(|candidate| {
        model
            .get(*candidate)
            .is_ok_and(|decl| matches!(decl.kind(), DeclKind::Namespace))
    })
}

/// Find or create the namespace chain for a dotted path.
///
/// Idempotent: every segment that already exists as a namespace is reused. The empty path names
/// the translation unit.
///
/// # Errors
/// Returns [`crate::Error::Scaffold`] for paths with empty segments (`A..B`, `.A`, `A.`).
pub fn resolve_namespace(model: &SemanticModel, path: &str) -> Result<DeclId> {
    let mut context = model.translation_unit();
    for segment in segments(path)? {
        context = match namespace_in(model, context, segment) {
            Some(existing) => existing,
            None => {
                let namespace =
                    model.create(DeclName::ident(segment), Some(context), DeclKind::Namespace);
                model.add_decl(context, namespace)?;
                namespace
            }
        };
    }
    Ok(context)
}

/// Find the namespace for a dotted path without creating anything
#[must_use]
pub fn find_namespace(model: &SemanticModel, path: &str) -> Option<DeclId> {
    let mut context = model.translation_unit();
    for segment in segments(path).ok()? {
        context = namespace_in(model, context, segment)?;
    }
    Some(context)
}
