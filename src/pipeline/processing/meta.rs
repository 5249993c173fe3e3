use std::collections::HashMap;

use crate::config::MetaConfig;
use crate::error::{AuditError, Result};
use crate::parser::FieldEntry;
use crate::pipeline::processing::condense::FieldLayout;
use crate::types::MetaRecord;

/// Reads the metadata snapshot fields out of a condensed "after" list and
/// resolves the warehouse code to its hub.
#[derive(Debug, Clone)]
pub struct MetaExtractor {
    layout: FieldLayout,
    sources: MetaConfig,
    hubs: HashMap<String, String>,
}

impl MetaExtractor {
    pub fn new(layout: FieldLayout, sources: MetaConfig, hubs: HashMap<String, String>) -> Self {
        Self {
            layout,
            sources,
            hubs,
        }
    }

    pub fn extract(&self, new: &[FieldEntry]) -> Result<MetaRecord> {
        // unmapped columns stay empty
        let field = |label: &str| -> Result<String> {
            if label.is_empty() {
                return Ok(String::new());
            }
            Ok(self.layout.value(new, label)?.to_string())
        };
        let s = &self.sources;

        let warehouse_id = field(&s.warehouse_id)?;
        let hub_id = self
            .hubs
            .get(warehouse_id.trim())
            .cloned()
            .ok_or_else(|| AuditError::LookupMiss {
                code: warehouse_id.clone(),
            })?;

        Ok(MetaRecord {
            order_num: field(&s.order_num)?,
            delivery_country_code: field(&s.delivery_country_code)?,
            ship_to_country_code: field(&s.ship_to_country_code)?,
            delivery_addr_type: field(&s.delivery_addr_type)?,
            ship_to_addr_type: field(&s.ship_to_addr_type)?,
            drug_flag: field(&s.drug_flag)?,
            order_date: field(&s.order_date)?,
            ship_date: field(&s.ship_date)?,
            delivery_date: field(&s.delivery_date)?,
            requested_delivery_date: field(&s.requested_delivery_date)?,
            priority: field(&s.priority)?,
            type_id: field(&s.type_id)?,
            warehouse_id,
            hub_id,
            iwrs_order: field(&s.iwrs_order)?,
        })
    }
}
