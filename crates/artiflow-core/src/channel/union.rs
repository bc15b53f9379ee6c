use std::sync::Arc;

use super::{Channel, ChannelKind};
use crate::errors::{LineageError, Result};

/// Une canales del mismo tipo en un `Union` aplanado.
///
/// Uniones anidadas se expanden: `union([union([a]), b])` tiene miembros
/// `[a, b]`. Falla con `EmptyUnion` si no hay canales y con `TypeMismatch` si
/// algún miembro tiene otro tipo (nombre y propiedades declaradas).
pub fn union<I>(channels: I) -> Result<Channel>
    where I: IntoIterator<Item = Channel>
{
    let mut members: Vec<Arc<Channel>> = Vec::new();
    for ch in channels {
        match ch.kind {
            ChannelKind::Union { channels: nested } => members.extend(nested),
            _ => members.push(Arc::new(ch)),
        }
    }
    let first = members.first().ok_or(LineageError::EmptyUnion)?;
    let artifact_type = first.artifact_type().clone();
    if let Some(bad) = members.iter().find(|m| **m.artifact_type() != *artifact_type) {
        return Err(LineageError::type_mismatch(&artifact_type.name, bad.type_name()));
    }
    Ok(Channel::union_of(artifact_type, members))
}
