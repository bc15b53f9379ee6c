//! Extracción de dependencias: ids de nodos upstream de los que depende el
//! valor de un canal. Recorrido puro, sin ejecutar ninguna resolución; el
//! scheduler lo usa para bloquear un step hasta que terminen sus upstream.
use std::collections::BTreeSet;

use super::{Channel, ChannelKind};
use crate::errors::{LineageError, Result};

impl Channel {
    /// Conjunto deduplicado de ids de nodos upstream.
    ///
    /// - Declared → {}
    /// - Output / PipelineOutput → {productor}
    /// - PipelineInput → {pipeline} (error si no tiene pipeline asignado)
    /// - Union → unión de los miembros
    /// - Resolved → unión de los canales referenciados por sus hojas
    pub fn get_data_dependent_node_ids(&self) -> Result<BTreeSet<String>> {
        let mut out = BTreeSet::new();
        self.collect_node_ids(&mut out)?;
        Ok(out)
    }

    fn collect_node_ids(&self, out: &mut BTreeSet<String>) -> Result<()> {
        match &self.kind {
            ChannelKind::Declared { .. } => {}
            ChannelKind::Output { producer_id, .. } => {
                out.insert(producer_id.clone());
            }
            ChannelKind::PipelineOutput { pipeline_id, .. } => {
                out.insert(pipeline_id.clone());
            }
            ChannelKind::PipelineInput { pipeline_id, output_key, .. } => {
                let id = pipeline_id.as_ref().ok_or_else(|| {
                                                 LineageError::MalformedGraph(format!("pipeline input channel {output_key} is not attached to a pipeline"))
                                             })?;
                out.insert(id.clone());
            }
            ChannelKind::Union { channels } => {
                for ch in channels {
                    ch.collect_node_ids(out)?;
                }
            }
            ChannelKind::Resolved { node } => {
                for ch in node.input_channels() {
                    ch.collect_node_ids(out)?;
                }
            }
        }
        Ok(())
    }
}
