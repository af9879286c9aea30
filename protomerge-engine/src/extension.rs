//! Extension side-table merge.
//!
//! Each source entry is looked up in the pool by extendee and number and then
//! merged through the ordinary field rules. Cloning reuses this by merging
//! into a fresh, empty table.

use crate::engine::MergeEngine;
use crate::error::{EngineError, EngineResult};
use protomerge_model::Message;

impl MergeEngine {
    pub(crate) fn merge_extensions(
        &self,
        dst: &mut Message,
        src: &Message,
        depth: usize,
    ) -> EngineResult<()> {
        let descriptor = src.descriptor();
        if let Some(number) = src
            .extensions()
            .numbers()
            .find(|&n| descriptor.extension(n).is_none())
        {
            return Err(EngineError::UnknownExtension {
                message: descriptor.full_name().to_string(),
                number,
            });
        }

        for (number, value) in src.extensions().iter() {
            let Some(field) = descriptor.extension(number) else {
                continue;
            };
            self.trace_field(descriptor, field, "extension");
            let mut slot = dst.extensions_mut().remove(number);
            let result = self.merge_field(descriptor, field, &mut slot, value, depth);
            if let Some(merged) = slot {
                dst.extensions_mut().insert(number, merged);
            }
            result?;
        }
        Ok(())
    }
}
