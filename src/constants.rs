//! Reference constants for the order change-log export.
//! These are the defaults behind `Config`; a config file may override any of them.

/// Only change-log rows for this table are transformed
pub const ORDER_TABLE: &str = "T_ORDER";

/// Field labels of the order table, in export order
pub const ORDER_FIELD_LABELS: [&str; 55] = [
    "ORDER_NUMBER",
    "ACTUAL_DELIVERY_DATE",
    "ACTUAL_SHIP_DATE",
    "BACKORDER",
    "CARRIER",
    "CROSS_DOCK_ORDERS_FLAG",
    "DEA_NUMBER",
    "DELIVERY_ADDR1",
    "DELIVERY_ADDR2",
    "DELIVERY_ADDR3",
    "DELIVERY_CITY",
    "DELIVERY_COUNTRY_CODE",
    "DELIVERY_COUNTRY_NAME",
    "DELIVERY_NAME",
    "DELIVERY_PHONE",
    "DELIVERY_STATE",
    "DELIVERY_ZIP",
    "DESTINATION_ADDR_TYPE",
    "DETAILS_FOR_RECEIVER",
    "DRUG_FLAG",
    "E_CTS_SHIPMENT_NUMBER",
    "IVRS_NUMBER",
    "IVRS_ORDER",
    "ORDER_CONFIRM_DATE",
    "ORDER_CREATE_USER",
    "ORDER_DATE",
    "ORDER_ID",
    "PRIORITY",
    "PRO_NUMBER",
    "REFERENCE_NUMBER",
    "REGION",
    "REG_READY_FLAG",
    "REQUESTED_DELIVERY_DATE",
    "RMA_EXPIRATION_DATE",
    "RMA_NUMBER",
    "SHIPMENT_ADDR_TYPE",
    "SHIP_EARLY_FLAG",
    "SHIP_TO_ADDR1",
    "SHIP_TO_ADDR2",
    "SHIP_TO_ADDR3",
    "SHIP_TO_CITY",
    "SHIP_TO_COUNTRY_CODE",
    "SHIP_TO_NAME",
    "SHIP_TO_PHONE",
    "SHIP_TO_STATE",
    "SHIP_TO_ZIP",
    "STATUS",
    "TRIAL_ALIAS",
    "TYPE_ID",
    "WH_ID",
    "OUTBOUND_DELIVERY_NUMBER",
    "SHIP_TO_SAP_PLANT",
    "IWRS_ORDER",
    "FIT_FOR_USE",
    "AOR_RECEIVED_FLAG",
];

// Composite field labels produced by condensation
pub const DELIVERY_LOCATION_INFO: &str = "DELIVERY_LOCATION_INFO";
pub const DELIVERY_CONTACT_INFO: &str = "DELIVERY_CONTACT_INFO";
pub const SHIP_TO_LOCATION_INFO: &str = "SHIP_TO_LOCATION_INFO";
pub const SHIP_TO_CONTACT_INFO: &str = "SHIP_TO_CONTACT_INFO";

/// Merge groups in the order their composites are appended
pub const ORDER_MERGE_GROUPS: [(&str, &[&str]); 4] = [
    (
        DELIVERY_LOCATION_INFO,
        &[
            "DELIVERY_ADDR1",
            "DELIVERY_ADDR2",
            "DELIVERY_ADDR3",
            "DELIVERY_CITY",
            "DELIVERY_STATE",
            "DELIVERY_ZIP",
        ],
    ),
    (DELIVERY_CONTACT_INFO, &["DELIVERY_NAME", "DELIVERY_PHONE"]),
    (
        SHIP_TO_LOCATION_INFO,
        &[
            "SHIP_TO_ADDR1",
            "SHIP_TO_ADDR2",
            "SHIP_TO_ADDR3",
            "SHIP_TO_CITY",
            "SHIP_TO_STATE",
            "SHIP_TO_ZIP",
        ],
    ),
    (SHIP_TO_CONTACT_INFO, &["SHIP_TO_NAME", "SHIP_TO_PHONE"]),
];

// Fields with special meaning to the trail and metadata stages
pub const ORDER_NUMBER_FIELD: &str = "ORDER_NUMBER";
pub const STATUS_FIELD: &str = "STATUS";
pub const WAREHOUSE_FIELD: &str = "WH_ID";

/// Default meta sources, in `MetaRecord` column order, excluding the order
/// number and warehouse fields
pub const META_SOURCE_FIELDS: [&str; 12] = [
    "DELIVERY_COUNTRY_CODE",
    "SHIP_TO_COUNTRY_CODE",
    "DESTINATION_ADDR_TYPE",
    "SHIPMENT_ADDR_TYPE",
    "DRUG_FLAG",
    "ORDER_DATE",
    "ACTUAL_SHIP_DATE",
    "ACTUAL_DELIVERY_DATE",
    "REQUESTED_DELIVERY_DATE",
    "PRIORITY",
    "TYPE_ID",
    "IWRS_ORDER",
];

/// Fields whose changes never produce a trail entry
pub const TRAIL_SKIP_FIELDS: [&str; 4] = [
    "ACTUAL_DELIVERY_DATE",
    "ACTUAL_SHIP_DATE",
    "ORDER_CONFIRM_DATE",
    "ORDER_CREATE_USER",
];

/// Warehouse id -> distribution hub
pub const HUB_TABLE: [(&str, &str); 16] = [
    ("01", "Fisher Clinical Services Inc"),
    ("02", "EUROPEAN D.C."),
    ("03", "SYDNEY D.C."),
    ("11", "TORONTO D.C."),
    ("12", "MEXICO D.C."),
    ("13", "BRAZIL D.C."),
    ("14", "ARGENTINA D.C."),
    ("15", "LLY North America D.C."),
    ("20", "UKRAINE D.C."),
    ("21", "JSC IMP Logistics Russia"),
    ("23", "UNITED KINGDOM D.C."),
    ("30", "SINGAPORE D.C."),
    ("31", "JAPAN D.C."),
    ("32", "INDIA D.C."),
    ("33", "CHINA-HUB D.C."),
    ("34", "CHINA-DEPOT D.C."),
];

// Input export column names
pub const TIMESTAMP_COLUMN: &str = "TIMESTAMP";
pub const USER_COLUMN: &str = "USERNAME";
pub const TABLE_COLUMN: &str = "TABLENAME";
pub const ACTION_COLUMN: &str = "ACTION";
pub const OLD_VALUES_COLUMN: &str = "OLD_VALUES";
pub const NEW_VALUES_COLUMN: &str = "NEW_VALUES";

// Activity text
pub const ORDER_CREATED_ACTIVITY: &str = "Order Created";
pub const STATUS_ACTIVITY_PREFIX: &str = "Order status -";
pub const ADDED_SUFFIX: &str = " added to order";
pub const UPDATED_SUFFIX: &str = " updated/changed";

/// Time of day stamped onto reformatted trail dates
pub const TRAIL_TIME_OF_DAY: &str = "14:00:00";

// Output file names
pub const TRAIL_FILE_SUFFIX: &str = "_TRAIL.csv";
pub const META_FILE_SUFFIX: &str = "_META.csv";
pub const DROPPED_FILE_SUFFIX: &str = "_DROPPED.csv";
pub const FULL_TRAIL_PARQUET: &str = "fullTrail.parquet";
pub const FULL_META_PARQUET: &str = "fullMeta.parquet";
pub const FULL_TRAIL_CSV: &str = "fullTrail.csv";
pub const FULL_META_CSV: &str = "fullMeta.csv";

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "order_audit.toml";
/// Env var naming an alternative config file
pub const CONFIG_ENV_VAR: &str = "ORDER_AUDIT_CONFIG";
