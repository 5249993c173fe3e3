use serde::{Deserialize, Serialize};

/// One change-log row from the export, as read. The order number is not a
/// column of its own; it is derived from the parsed field lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChangeRecord {
    pub timestamp: String,
    pub user: String,
    pub table_name: String,
    pub action: String,
    pub raw_old: String,
    pub raw_new: String,
}

/// One audit-trail row describing a single detected change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailEntry {
    #[serde(rename = "Order_num")]
    pub order_num: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Activity")]
    pub activity: String,
}

impl TrailEntry {
    pub const COLUMNS: [&'static str; 3] = ["Order_num", "Date", "Activity"];

    pub fn new(order_num: &str, date: &str, activity: impl Into<String>) -> Self {
        Self {
            order_num: order_num.to_string(),
            date: date.to_string(),
            activity: activity.into(),
        }
    }

    pub fn values(&self) -> [&str; 3] {
        [&self.order_num, &self.date, &self.activity]
    }
}

/// Latest known snapshot of an order's descriptive fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    #[serde(rename = "Order_num")]
    pub order_num: String,
    #[serde(rename = "Delivery_Country_Code")]
    pub delivery_country_code: String,
    #[serde(rename = "Ship_To_Country_Code")]
    pub ship_to_country_code: String,
    #[serde(rename = "Delivery_Addr_Type")]
    pub delivery_addr_type: String,
    #[serde(rename = "Ship_To_Addr_Type")]
    pub ship_to_addr_type: String,
    #[serde(rename = "Drug_Flag")]
    pub drug_flag: String,
    #[serde(rename = "Order_Date")]
    pub order_date: String,
    #[serde(rename = "Ship_Date")]
    pub ship_date: String,
    #[serde(rename = "Delivery_Date")]
    pub delivery_date: String,
    #[serde(rename = "Requested_Delivery_Date")]
    pub requested_delivery_date: String,
    #[serde(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "Type_Id")]
    pub type_id: String,
    #[serde(rename = "Warehouse_Id")]
    pub warehouse_id: String,
    #[serde(rename = "Hub_Id")]
    pub hub_id: String,
    #[serde(rename = "IWRS_Order")]
    pub iwrs_order: String,
}

impl MetaRecord {
    /// Column names in output order
    pub const COLUMNS: [&'static str; 15] = [
        "Order_num",
        "Delivery_Country_Code",
        "Ship_To_Country_Code",
        "Delivery_Addr_Type",
        "Ship_To_Addr_Type",
        "Drug_Flag",
        "Order_Date",
        "Ship_Date",
        "Delivery_Date",
        "Requested_Delivery_Date",
        "Priority",
        "Type_Id",
        "Warehouse_Id",
        "Hub_Id",
        "IWRS_Order",
    ];

    /// Values in the same order as [`MetaRecord::COLUMNS`]
    pub fn values(&self) -> [&str; 15] {
        [
            &self.order_num,
            &self.delivery_country_code,
            &self.ship_to_country_code,
            &self.delivery_addr_type,
            &self.ship_to_addr_type,
            &self.drug_flag,
            &self.order_date,
            &self.ship_date,
            &self.delivery_date,
            &self.requested_delivery_date,
            &self.priority,
            &self.type_id,
            &self.warehouse_id,
            &self.hub_id,
            &self.iwrs_order,
        ]
    }
}
