//! Canonical field names for column mapping

use std::collections::BTreeMap;

/// Placeholder target meaning "leave this column unmapped"
pub const UNMAPPED_FIELD: &str = "Select field...";

pub const STANDARD_FIELDS: [&str; 30] = [
    // ids
    "retailer_id",
    "transaction_id",
    "organization_id",
    "outlet_id",
    // names
    "retailer_name",
    "organization_name",
    "outlet_name",
    "product_name",
    // contact and location
    "contact_info",
    "phone",
    "email",
    "address",
    "province",
    "city",
    "district",
    // transaction
    "transaction_date",
    "amount",
    "quantity",
    "status",
    // product
    "product_code",
    "product_category",
    "price",
    "discount",
    // visit
    "visit_date",
    "dse_name",
    "visit_status",
    // transfer
    "from_retailer",
    "to_retailer",
    "transfer_amount",
    "other",
];

pub fn is_standard_field(field: &str) -> bool {
    STANDARD_FIELDS.contains(&field)
}

/// Whether a mapping target means "not mapped"
pub fn is_unmapped(field: &str) -> bool {
    let field = field.trim();
    field.is_empty() || field == UNMAPPED_FIELD
}

/// Choices offered for every column, the placeholder first
pub fn field_options() -> Vec<&'static str> {
    std::iter::once(UNMAPPED_FIELD)
        .chain(STANDARD_FIELDS)
        .collect()
}

/// Pre-populated mapping for the given columns: a column takes its suggestion
/// only when the suggestion is a standard field
pub fn default_mappings(
    columns: &[String],
    suggestions: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    columns
        .iter()
        .filter_map(|column| {
            suggestions
                .get(column)
                .filter(|field| is_standard_field(field))
                .map(|field| (column.clone(), field.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_fields() {
        assert!(is_standard_field("retailer_id"));
        assert!(is_standard_field("other"));
        assert!(!is_standard_field(UNMAPPED_FIELD));
        assert!(!is_standard_field("customer_id"));
    }

    #[test]
    fn test_field_options_start_with_placeholder() {
        let options = field_options();
        assert_eq!(options[0], UNMAPPED_FIELD);
        assert_eq!(options.len(), STANDARD_FIELDS.len() + 1);
    }

    #[test]
    fn test_default_mappings_only_use_standard_suggestions() {
        let columns = vec![
            "ORGANIZATION ID".to_string(),
            "REGION".to_string(),
            "LEGACY".to_string(),
        ];
        let suggestions = BTreeMap::from([
            ("ORGANIZATION ID".to_string(), "retailer_id".to_string()),
            ("LEGACY".to_string(), "legacy_code".to_string()),
            ("NOT IN FILE".to_string(), "status".to_string()),
        ]);

        let mappings = default_mappings(&columns, &suggestions);
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings["ORGANIZATION ID"], "retailer_id");
    }

    #[test]
    fn test_is_unmapped() {
        assert!(is_unmapped(""));
        assert!(is_unmapped("  "));
        assert!(is_unmapped(UNMAPPED_FIELD));
        assert!(!is_unmapped("amount"));
    }
}
