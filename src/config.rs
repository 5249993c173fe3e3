use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants;
use crate::error::{AuditError, Result};
use crate::pipeline::processing::condense::{FieldLayout, MergeGroup};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema: SchemaConfig,
    pub trail: TrailConfig,
    pub columns: ColumnConfig,
    pub meta: MetaConfig,
    /// Warehouse code -> hub name
    pub hubs: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub table_name: String,
    pub labels: Vec<String>,
    /// Defaults to the number of labels when omitted
    pub expected_width: Option<usize>,
    pub merge_groups: Vec<MergeGroup>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub order_number_field: String,
    pub status_field: String,
    pub skip_fields: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub timestamp: String,
    pub user: String,
    pub table: String,
    pub action: String,
    pub old_values: String,
    pub new_values: String,
}

/// Source label for each metadata column. When a `[meta]` section is given,
/// columns it omits are left empty in the output; an absent section means the
/// reference labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetaConfig {
    #[serde(default = "default_order_number_field")]
    pub order_num: String,
    #[serde(default)]
    pub delivery_country_code: String,
    #[serde(default)]
    pub ship_to_country_code: String,
    #[serde(default)]
    pub delivery_addr_type: String,
    #[serde(default)]
    pub ship_to_addr_type: String,
    #[serde(default)]
    pub drug_flag: String,
    #[serde(default)]
    pub order_date: String,
    #[serde(default)]
    pub ship_date: String,
    #[serde(default)]
    pub delivery_date: String,
    #[serde(default)]
    pub requested_delivery_date: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub type_id: String,
    #[serde(default = "default_warehouse_field")]
    pub warehouse_id: String,
    #[serde(default)]
    pub iwrs_order: String,
}

fn default_order_number_field() -> String {
    constants::ORDER_NUMBER_FIELD.to_string()
}

fn default_warehouse_field() -> String {
    constants::WAREHOUSE_FIELD.to_string()
}

impl MetaConfig {
    /// (output column, source label) for every mapped column
    pub fn sources(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("Order_num", self.order_num.as_str()),
            ("Delivery_Country_Code", self.delivery_country_code.as_str()),
            ("Ship_To_Country_Code", self.ship_to_country_code.as_str()),
            ("Delivery_Addr_Type", self.delivery_addr_type.as_str()),
            ("Ship_To_Addr_Type", self.ship_to_addr_type.as_str()),
            ("Drug_Flag", self.drug_flag.as_str()),
            ("Order_Date", self.order_date.as_str()),
            ("Ship_Date", self.ship_date.as_str()),
            ("Delivery_Date", self.delivery_date.as_str()),
            ("Requested_Delivery_Date", self.requested_delivery_date.as_str()),
            ("Priority", self.priority.as_str()),
            ("Type_Id", self.type_id.as_str()),
            ("Warehouse_Id", self.warehouse_id.as_str()),
            ("IWRS_Order", self.iwrs_order.as_str()),
        ]
        .into_iter()
        .filter(|(_, label)| !label.is_empty())
    }
}

impl Default for MetaConfig {
    fn default() -> Self {
        let [
            delivery_country_code,
            ship_to_country_code,
            delivery_addr_type,
            ship_to_addr_type,
            drug_flag,
            order_date,
            ship_date,
            delivery_date,
            requested_delivery_date,
            priority,
            type_id,
            iwrs_order,
        ] = constants::META_SOURCE_FIELDS.map(String::from);
        Self {
            order_num: default_order_number_field(),
            delivery_country_code,
            ship_to_country_code,
            delivery_addr_type,
            ship_to_addr_type,
            drug_flag,
            order_date,
            ship_date,
            delivery_date,
            requested_delivery_date,
            priority,
            type_id,
            warehouse_id: default_warehouse_field(),
            iwrs_order,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: SchemaConfig::default(),
            trail: TrailConfig::default(),
            columns: ColumnConfig::default(),
            meta: MetaConfig::default(),
            hubs: default_hub_table(),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            table_name: constants::ORDER_TABLE.to_string(),
            labels: constants::ORDER_FIELD_LABELS
                .iter()
                .map(|l| l.to_string())
                .collect(),
            expected_width: None,
            merge_groups: constants::ORDER_MERGE_GROUPS
                .iter()
                .map(|(label, sources)| MergeGroup::new(*label, sources))
                .collect(),
        }
    }
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            order_number_field: constants::ORDER_NUMBER_FIELD.to_string(),
            status_field: constants::STATUS_FIELD.to_string(),
            skip_fields: constants::TRAIL_SKIP_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            timestamp: constants::TIMESTAMP_COLUMN.to_string(),
            user: constants::USER_COLUMN.to_string(),
            table: constants::TABLE_COLUMN.to_string(),
            action: constants::ACTION_COLUMN.to_string(),
            old_values: constants::OLD_VALUES_COLUMN.to_string(),
            new_values: constants::NEW_VALUES_COLUMN.to_string(),
        }
    }
}

pub fn default_hub_table() -> HashMap<String, String> {
    constants::HUB_TABLE
        .iter()
        .map(|(code, hub)| (code.to_string(), hub.to_string()))
        .collect()
}

impl Config {
    /// Load configuration from `path`, the `ORDER_AUDIT_CONFIG` env var, or
    /// `order_audit.toml` in the working directory, in that order. Falls back
    /// to the reference configuration when no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var(constants::CONFIG_ENV_VAR)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .or_else(|| {
                    let local = PathBuf::from(constants::DEFAULT_CONFIG_FILE);
                    local.exists().then_some(local)
                }),
        };

        let config = match candidate {
            Some(config_path) => {
                let content = fs::read_to_string(&config_path).map_err(|e| {
                    AuditError::Config(format!(
                        "Failed to read config file '{}': {}",
                        config_path.display(),
                        e
                    ))
                })?;
                info!("Loaded configuration from {}", config_path.display());
                Self::from_toml_str(&content)?
            }
            None => {
                debug!("No config file found; using reference configuration");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn expected_width(&self) -> usize {
        self.schema
            .expected_width
            .unwrap_or(self.schema.labels.len())
    }

    pub fn label_set(&self) -> HashSet<String> {
        self.schema.labels.iter().cloned().collect()
    }

    pub fn layout(&self) -> FieldLayout {
        FieldLayout::new(&self.schema.labels, &self.schema.merge_groups)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema.labels.is_empty() {
            return Err(AuditError::Config("schema.labels must not be empty".into()));
        }
        if self.expected_width() == 0 {
            return Err(AuditError::Config(
                "schema.expected_width must be greater than zero".into(),
            ));
        }

        let mut seen = HashSet::new();
        for label in &self.schema.labels {
            if !seen.insert(label.as_str()) {
                return Err(AuditError::Config(format!("duplicate schema label '{}'", label)));
            }
        }

        for group in &self.schema.merge_groups {
            if group.sources.is_empty() {
                return Err(AuditError::Config(format!(
                    "merge group '{}' has no source fields",
                    group.label
                )));
            }
            if let Some(unknown) = group.sources.iter().find(|s| !seen.contains(s.as_str())) {
                return Err(AuditError::Config(format!(
                    "merge group '{}' names unknown field '{}'",
                    group.label, unknown
                )));
            }
        }

        let layout = self.layout();
        let trail_fields = [&self.trail.order_number_field, &self.trail.status_field]
            .into_iter()
            .chain(self.trail.skip_fields.iter());
        for field in trail_fields {
            if layout.position(field).is_none() {
                return Err(AuditError::Config(format!(
                    "trail field '{}' is not part of the condensed layout",
                    field
                )));
            }
        }

        if self.meta.order_num.is_empty() || self.meta.warehouse_id.is_empty() {
            return Err(AuditError::Config(
                "meta.order_num and meta.warehouse_id must name a field".into(),
            ));
        }
        for (column, label) in self.meta.sources() {
            if layout.position(label).is_none() {
                return Err(AuditError::Config(format!(
                    "meta column '{}' reads '{}', which is not part of the condensed layout",
                    column, label
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_schema() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.expected_width(), 55);
        assert_eq!(config.schema.merge_groups.len(), 4);
        assert_eq!(config.hubs.get("01").map(String::as_str), Some("Fisher Clinical Services Inc"));
        assert_eq!(config.layout().width(), 43);
        config.validate().unwrap();
    }

    #[test]
    fn partial_toml_overrides_only_named_sections() {
        let config = Config::from_toml_str(
            r#"
            [columns]
            timestamp = "CHANGE_DATE"

            [hubs]
            "99" = "TEST D.C."
            "#,
        )
        .unwrap();

        assert_eq!(config.columns.timestamp, "CHANGE_DATE");
        assert_eq!(config.columns.old_values, "OLD_VALUES");
        assert_eq!(config.hubs.len(), 1);
        assert_eq!(config.schema.table_name, "T_ORDER");
    }

    #[test]
    fn merge_group_with_unknown_source_is_rejected() {
        let config = Config::from_toml_str(
            r#"
            [schema]
            labels = ["ORDER_NUMBER", "STATUS", "CITY"]

            [[schema.merge_groups]]
            label = "LOCATION"
            sources = ["CITY", "ZIP"]

            [trail]
            skip_fields = []
            "#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown field 'ZIP'"));
    }

    #[test]
    fn trail_field_outside_layout_is_rejected() {
        let config = Config::from_toml_str(
            r#"
            [trail]
            status_field = "DELIVERY_CITY"
            "#,
        )
        .unwrap();

        // DELIVERY_CITY is folded into DELIVERY_LOCATION_INFO
        assert!(config.validate().is_err());
    }

    #[test]
    fn custom_schema_must_map_meta_columns_it_has() {
        let schema = r#"
            [schema]
            labels = ["ORDER_NUMBER", "STATUS", "WH_ID"]
            merge_groups = []

            [trail]
            skip_fields = []
            "#;

        // reference meta labels are not in this schema
        let err = Config::from_toml_str(schema).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("DELIVERY_COUNTRY_CODE"));

        let config = Config::from_toml_str(&format!("{}\n[meta]\n", schema)).unwrap();
        config.validate().unwrap();
        let mapped: Vec<_> = config.meta.sources().collect();
        assert_eq!(
            mapped,
            vec![("Order_num", "ORDER_NUMBER"), ("Warehouse_Id", "WH_ID")]
        );
    }

    #[test]
    fn default_meta_maps_all_fourteen_columns() {
        assert_eq!(Config::default().meta.sources().count(), 14);
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let config = Config::from_toml_str(
            r#"
            [schema]
            labels = ["ORDER_NUMBER", "STATUS", "STATUS"]
            merge_groups = []

            [trail]
            skip_fields = []
            "#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }
}
