//! Inventory item models, listing filters and sort options.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::pagination::deserialize_optional_i64;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

/// Reorder level applied when a create request omits it.
pub const DEFAULT_REORDER_LEVEL: i32 = 10;

/// An inventory item as read back from the store, joined with its category name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub item_name: String,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Always `quantity * unit_price`; derived by the store, never written.
    pub total_value: Decimal,
    pub reorder_level: i32,
    pub location: Option<String>,
    pub barcode: Option<String>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Item {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_level
    }

    /// Editable state captured in activity log entries.
    pub fn snapshot(&self) -> serde_json::Value {
        json!({
            "itemName": self.item_name,
            "categoryId": self.category_id,
            "description": self.description,
            "quantity": self.quantity,
            "unitPrice": self.unit_price,
            "reorderLevel": self.reorder_level,
            "location": self.location,
            "barcode": self.barcode,
        })
    }
}

/// Fully resolved editable fields of an item, used for both insert and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemValues {
    pub item_name: String,
    pub category_id: i64,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub reorder_level: i32,
    pub location: Option<String>,
    pub barcode: Option<String>,
}

impl ItemValues {
    pub fn snapshot(&self) -> serde_json::Value {
        json!({
            "itemName": self.item_name,
            "categoryId": self.category_id,
            "description": self.description,
            "quantity": self.quantity,
            "unitPrice": self.unit_price,
            "reorderLevel": self.reorder_level,
            "location": self.location,
            "barcode": self.barcode,
        })
    }
}

impl From<&Item> for ItemValues {
    fn from(item: &Item) -> Self {
        Self {
            item_name: item.item_name.clone(),
            category_id: item.category_id,
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            reorder_level: item.reorder_level,
            location: item.location.clone(),
            barcode: item.barcode.clone(),
        }
    }
}

/// Request payload for creating an item.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[validate(
        length(min = 1, max = 150, message = "Item name must be between 1 and 150 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub item_name: String,

    pub category_id: i64,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity: Option<i32>,

    pub unit_price: Decimal,

    #[validate(range(min = 0, message = "Reorder level must be non-negative"))]
    pub reorder_level: Option<i32>,

    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 50, message = "Barcode must be at most 50 characters"))]
    pub barcode: Option<String>,
}

impl CreateItemRequest {
    /// Runs the derived rules plus the unit price check.
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        merge_price_check(self.validate(), Some(&self.unit_price))
    }

    /// Applies defaults: quantity 0, reorder level 10.
    pub fn into_values(self) -> ItemValues {
        ItemValues {
            item_name: self.item_name.trim().to_string(),
            category_id: self.category_id,
            description: normalize_optional(self.description),
            quantity: self.quantity.unwrap_or(0),
            unit_price: self.unit_price,
            reorder_level: self.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL),
            location: normalize_optional(self.location),
            barcode: normalize_optional(self.barcode),
        }
    }
}

/// Request payload for a partial item update. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[validate(
        length(min = 1, max = 150, message = "Item name must be between 1 and 150 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub item_name: Option<String>,

    pub category_id: Option<i64>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity: Option<i32>,

    pub unit_price: Option<Decimal>,

    #[validate(range(min = 0, message = "Reorder level must be non-negative"))]
    pub reorder_level: Option<i32>,

    #[validate(length(max = 100, message = "Location must be at most 100 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 50, message = "Barcode must be at most 50 characters"))]
    pub barcode: Option<String>,
}

impl UpdateItemRequest {
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        merge_price_check(self.validate(), self.unit_price.as_ref())
    }

    /// Overlays the supplied fields onto the current state.
    pub fn merge(&self, current: &ItemValues) -> ItemValues {
        ItemValues {
            item_name: self
                .item_name
                .as_deref()
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| current.item_name.clone()),
            category_id: self.category_id.unwrap_or(current.category_id),
            description: match &self.description {
                Some(d) => normalize_optional(Some(d.clone())),
                None => current.description.clone(),
            },
            quantity: self.quantity.unwrap_or(current.quantity),
            unit_price: self.unit_price.unwrap_or(current.unit_price),
            reorder_level: self.reorder_level.unwrap_or(current.reorder_level),
            location: match &self.location {
                Some(l) => normalize_optional(Some(l.clone())),
                None => current.location.clone(),
            },
            barcode: match &self.barcode {
                Some(b) => normalize_optional(Some(b.clone())),
                None => current.barcode.clone(),
            },
        }
    }
}

fn merge_price_check(
    derived: Result<(), ValidationErrors>,
    price: Option<&Decimal>,
) -> Result<(), ValidationErrors> {
    let price_error: Option<ValidationError> =
        price.and_then(|p| shared::validation::validate_unit_price(p).err());

    match (derived, price_error) {
        (Ok(()), None) => Ok(()),
        (Ok(()), Some(err)) => {
            let mut errors = ValidationErrors::new();
            errors.add("unit_price", err);
            Err(errors)
        }
        (Err(mut errors), Some(err)) => {
            errors.add("unit_price", err);
            Err(errors)
        }
        (Err(errors), None) => Err(errors),
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Column a listing may be ordered by. Only these columns ever reach SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    ItemName,
    Quantity,
    TotalValue,
    CreatedAt,
    UnitPrice,
}

impl SortField {
    /// Parses a client-supplied value; anything off the allow-list yields the default.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    /// Qualified column name for the item listing query.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::ItemName => "i.item_name",
            SortField::Quantity => "i.quantity",
            SortField::TotalValue => "i.total_value",
            SortField::CreatedAt => "i.created_at",
            SortField::UnitPrice => "i.unit_price",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::ItemName => "itemName",
            SortField::Quantity => "quantity",
            SortField::TotalValue => "totalValue",
            SortField::CreatedAt => "createdAt",
            SortField::UnitPrice => "unitPrice",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "itemName" => Ok(SortField::ItemName),
            "quantity" => Ok(SortField::Quantity),
            "totalValue" => Ok(SortField::TotalValue),
            "createdAt" => Ok(SortField::CreatedAt),
            "unitPrice" => Ok(SortField::UnitPrice),
            _ => Err(format!("Unsupported sort field: {}", s)),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `desc` in any case selects descending; everything else is ascending.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemSort {
    pub field: SortField,
    pub order: SortOrder,
}

/// One constraint of an item listing. Clauses are AND-ed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFilterClause {
    /// Excludes soft-deleted items.
    ActiveOnly,
    /// Case-insensitive substring match on name, description or barcode.
    Search(String),
    Category(i64),
}

/// Listing filter. Empty fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub search: Option<String>,
    pub category_id: Option<i64>,
}

impl ItemFilter {
    pub fn clauses(&self) -> Vec<ItemFilterClause> {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| ItemFilterClause::Search(s.to_string()));

        std::iter::once(ItemFilterClause::ActiveOnly)
            .chain(search)
            .chain(self.category_id.map(ItemFilterClause::Category))
            .collect()
    }
}

/// Raw query string of `GET /inventory`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    pub search: Option<String>,
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ItemListQuery {
    /// Builds the filter, rejecting a category id that is present but not numeric.
    pub fn filter(&self) -> Result<ItemFilter, ValidationError> {
        let category_id = match self.category_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                let mut err = ValidationError::new("category_id");
                err.message = Some("categoryId must be an integer".into());
                err
            })?),
        };

        Ok(ItemFilter {
            search: self.search.clone(),
            category_id,
        })
    }

    pub fn sort(&self) -> ItemSort {
        ItemSort {
            field: SortField::parse_or_default(self.sort_by.as_deref()),
            order: SortOrder::parse_or_default(self.sort_order.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_values() -> ItemValues {
        ItemValues {
            item_name: "Widget".to_string(),
            category_id: 1,
            description: Some("Blue widget".to_string()),
            quantity: 5,
            unit_price: Decimal::new(250, 2),
            reorder_level: 10,
            location: Some("A-1".to_string()),
            barcode: None,
        }
    }

    fn create_request() -> CreateItemRequest {
        CreateItemRequest {
            item_name: "  Widget ".to_string(),
            category_id: 3,
            description: Some("".to_string()),
            quantity: None,
            unit_price: Decimal::new(1999, 2),
            reorder_level: None,
            location: None,
            barcode: Some("0123".to_string()),
        }
    }

    #[test]
    fn test_sort_field_allow_list() {
        assert_eq!(SortField::parse_or_default(Some("quantity")), SortField::Quantity);
        assert_eq!(SortField::parse_or_default(Some("totalValue")), SortField::TotalValue);
        assert_eq!(SortField::parse_or_default(Some("createdAt")), SortField::CreatedAt);
        assert_eq!(SortField::parse_or_default(Some("unitPrice")), SortField::UnitPrice);
        assert_eq!(SortField::parse_or_default(Some("itemName")), SortField::ItemName);
    }

    #[test]
    fn test_sort_field_rejects_injection() {
        let field = SortField::parse_or_default(Some("item_name; DROP TABLE items"));
        assert_eq!(field, SortField::ItemName);
        assert_eq!(field.column(), "i.item_name");
        assert_eq!(SortField::parse_or_default(None), SortField::ItemName);
    }

    #[test]
    fn test_sort_order() {
        assert_eq!(SortOrder::parse_or_default(Some("DESC")), SortOrder::Desc);
        assert_eq!(SortOrder::parse_or_default(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::parse_or_default(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse_or_default(Some("sideways")), SortOrder::Asc);
        assert_eq!(SortOrder::parse_or_default(None), SortOrder::Asc);
    }

    #[test]
    fn test_filter_clauses_always_start_with_active_only() {
        assert_eq!(
            ItemFilter::default().clauses(),
            vec![ItemFilterClause::ActiveOnly]
        );
    }

    #[test]
    fn test_filter_clauses_skip_blank_search() {
        let filter = ItemFilter {
            search: Some("   ".to_string()),
            category_id: Some(4),
        };
        assert_eq!(
            filter.clauses(),
            vec![ItemFilterClause::ActiveOnly, ItemFilterClause::Category(4)]
        );
    }

    #[test]
    fn test_filter_clauses_trim_search() {
        let filter = ItemFilter {
            search: Some(" bolt ".to_string()),
            category_id: None,
        };
        assert_eq!(
            filter.clauses(),
            vec![
                ItemFilterClause::ActiveOnly,
                ItemFilterClause::Search("bolt".to_string())
            ]
        );
    }

    #[test]
    fn test_list_query_category_parsing() {
        let empty = ItemListQuery {
            category_id: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(empty.filter().unwrap().category_id, None);

        let numeric = ItemListQuery {
            category_id: Some("12".to_string()),
            ..Default::default()
        };
        assert_eq!(numeric.filter().unwrap().category_id, Some(12));

        let garbage = ItemListQuery {
            category_id: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(garbage.filter().is_err());
    }

    #[test]
    fn test_list_query_blank_paging_params() {
        let query: ItemListQuery = serde_json::from_value(json!({
            "search": "",
            "categoryId": "",
            "page": "",
            "limit": " ",
            "sortBy": "",
            "sortOrder": ""
        }))
        .unwrap();
        assert_eq!(query.page, None);
        assert_eq!(query.limit, None);

        let query: ItemListQuery =
            serde_json::from_value(json!({ "page": "3", "limit": "abc" })).unwrap();
        assert_eq!(query.page, Some(3));
        assert_eq!(query.limit, None);

        let query: ItemListQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.page, None);
    }

    #[test]
    fn test_create_defaults() {
        let values = create_request().into_values();
        assert_eq!(values.item_name, "Widget");
        assert_eq!(values.quantity, 0);
        assert_eq!(values.reorder_level, DEFAULT_REORDER_LEVEL);
        assert_eq!(values.description, None);
        assert_eq!(values.barcode.as_deref(), Some("0123"));
    }

    #[test]
    fn test_create_validation() {
        assert!(create_request().validate_all().is_ok());

        let negative_quantity = CreateItemRequest {
            quantity: Some(-1),
            ..create_request()
        };
        assert!(negative_quantity.validate_all().is_err());

        let negative_price = CreateItemRequest {
            unit_price: Decimal::new(-1, 0),
            ..create_request()
        };
        let errors = negative_price.validate_all().unwrap_err();
        assert!(errors.field_errors().contains_key("unit_price"));

        let blank_name = CreateItemRequest {
            item_name: "  ".to_string(),
            ..create_request()
        };
        assert!(blank_name.validate_all().is_err());
    }

    #[test]
    fn test_update_merge_keeps_absent_fields() {
        let current = sample_values();
        let update = UpdateItemRequest {
            quantity: Some(2),
            ..Default::default()
        };
        let merged = update.merge(&current);
        assert_eq!(merged.quantity, 2);
        assert_eq!(merged.item_name, current.item_name);
        assert_eq!(merged.unit_price, current.unit_price);
        assert_eq!(merged.description, current.description);
    }

    #[test]
    fn test_update_merge_clears_with_empty_string() {
        let update = UpdateItemRequest {
            location: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(update.merge(&sample_values()).location, None);
    }

    #[test]
    fn test_update_validation() {
        assert!(UpdateItemRequest::default().validate_all().is_ok());
        let bad = UpdateItemRequest {
            unit_price: Some(Decimal::new(-5, 1)),
            reorder_level: Some(-1),
            ..Default::default()
        };
        let errors = bad.validate_all().unwrap_err();
        assert!(errors.field_errors().contains_key("unit_price"));
        assert!(errors.field_errors().contains_key("reorder_level"));
    }

    #[test]
    fn test_create_request_deserializes_camel_case() {
        let request: CreateItemRequest = serde_json::from_str(
            r#"{"itemName":"Cable","categoryId":2,"quantity":5,"unitPrice":"2.50"}"#,
        )
        .unwrap();
        assert_eq!(request.quantity, Some(5));
        assert_eq!(request.unit_price, Decimal::new(250, 2));
    }

    #[test]
    fn test_low_stock() {
        let values = sample_values();
        let item = Item {
            id: 1,
            item_name: values.item_name,
            category_id: 1,
            category_name: None,
            description: None,
            quantity: 10,
            unit_price: values.unit_price,
            total_value: Decimal::new(2500, 2),
            reorder_level: 10,
            location: None,
            barcode: None,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_active: true,
        };
        assert!(item.is_low_stock());
        assert_eq!(ItemValues::from(&item).quantity, 10);
    }
}
