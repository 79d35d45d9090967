//! Ancestry historical records and public family trees.

use crate::tool::ProviderTool;
use relay_rs_protocol::ToolError;
use relay_rs_tools::{
    CatalogError, Endpoint, ErrorShape, FieldSpec, Schema, Tool, ToolCatalog, ToolDescriptor,
    UpstreamRequest, ValidatedArguments,
};
use std::sync::Arc;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.ancestry.com/v2";

/// Ancestry reports failures as `{"success": false, "error": "..."}`.
pub const ERROR_SHAPES: &[ErrorShape] = &[ErrorShape::SuccessFlag];

pub const SEARCH_RECORDS: &str = "ancestry_search_records";
pub const GET_RECORD_DETAILS: &str = "ancestry_get_record_details";
pub const SEARCH_FAMILY_TREES: &str = "ancestry_search_family_trees";
pub const GET_PERSON_DETAILS: &str = "ancestry_get_person_details";

/// Build the Ancestry catalog against an authenticated endpoint.
pub fn catalog(endpoint: Arc<Endpoint>) -> Result<ToolCatalog, CatalogError> {
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                SEARCH_RECORDS,
                "Search historical records on Ancestry.com",
                Schema::new(vec![
                    FieldSpec::string("query", "Search terms").required(),
                    FieldSpec::string("category", "Record category"),
                    FieldSpec::number("year", "Year of record"),
                    FieldSpec::string("location", "Location of record"),
                ]),
            ),
            "Search failed",
            endpoint.clone(),
            search_records,
        )),
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                GET_RECORD_DETAILS,
                "Get detailed information about a specific record",
                Schema::new(vec![
                    FieldSpec::string("record_id", "The ID of the record to retrieve").required(),
                ]),
            ),
            "Failed to get record details",
            endpoint.clone(),
            record_details,
        )),
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                SEARCH_FAMILY_TREES,
                "Search public family trees on Ancestry.com",
                Schema::new(vec![
                    FieldSpec::string("name", "Person's name to search for").required(),
                    FieldSpec::number("birth_year", "Year of birth"),
                    FieldSpec::number("death_year", "Year of death"),
                    FieldSpec::string("location", "Location"),
                ]),
            ),
            "Search failed",
            endpoint.clone(),
            search_family_trees,
        )),
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                GET_PERSON_DETAILS,
                "Get detailed information about a person",
                Schema::new(vec![
                    FieldSpec::string("person_id", "The ID of the person to retrieve").required(),
                ]),
            ),
            "Failed to get person details",
            endpoint,
            person_details,
        )),
    ];
    ToolCatalog::from_tools(tools)
}

fn search_records(
    endpoint: &Endpoint,
    args: &ValidatedArguments,
) -> Result<UpstreamRequest, ToolError> {
    Ok(endpoint
        .get(&["records", "search"])?
        .query("q", args.require_str("query")?)
        .query_opt("category", args.param("category"))
        .query_opt("year", args.param("year"))
        .query_opt("location", args.param("location")))
}

fn record_details(
    endpoint: &Endpoint,
    args: &ValidatedArguments,
) -> Result<UpstreamRequest, ToolError> {
    endpoint.get(&["records", args.require_str("record_id")?])
}

fn search_family_trees(
    endpoint: &Endpoint,
    args: &ValidatedArguments,
) -> Result<UpstreamRequest, ToolError> {
    Ok(endpoint
        .get(&["trees", "search"])?
        .query("name", args.require_str("name")?)
        .query_opt("birth_year", args.param("birth_year"))
        .query_opt("death_year", args.param("death_year"))
        .query_opt("location", args.param("location")))
}

fn person_details(
    endpoint: &Endpoint,
    args: &ValidatedArguments,
) -> Result<UpstreamRequest, ToolError> {
    endpoint.get(&["persons", args.require_str("person_id")?])
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BASE_URL, catalog};
    use pretty_assertions::assert_eq;
    use relay_rs_tools::{Auth, Endpoint, Secret, Tool, validate};
    use serde_json::json;
    use std::sync::Arc;

    fn endpoint() -> Arc<Endpoint> {
        Arc::new(Endpoint::new(DEFAULT_BASE_URL, Auth::Bearer(Secret::new("key-1"))).expect("endpoint"))
    }

    #[test]
    fn catalog_lists_tools_in_declaration_order() {
        let catalog = catalog(endpoint()).expect("catalog");
        assert_eq!(
            catalog.names(),
            vec![
                "ancestry_search_records",
                "ancestry_get_record_details",
                "ancestry_search_family_trees",
                "ancestry_get_person_details",
            ]
        );
    }

    #[test]
    fn search_records_maps_query_to_q() {
        let catalog = catalog(endpoint()).expect("catalog");
        let tool = catalog.get("ancestry_search_records").expect("tool");
        let args = validate(
            &tool.descriptor().schema,
            &json!({ "query": "Smith", "year": 1900.0, "location": "Ohio" }),
        )
        .expect("valid");
        let request = tool.build_request(&args).expect("request");
        assert_eq!(
            request.full_url().as_str(),
            "https://api.ancestry.com/v2/records/search?q=Smith&year=1900&location=Ohio"
        );
        assert_eq!(request.header_value("Authorization"), Some("Bearer key-1"));
    }

    #[test]
    fn record_id_is_a_single_path_segment() {
        let catalog = catalog(endpoint()).expect("catalog");
        let tool = catalog.get("ancestry_get_record_details").expect("tool");
        let args = validate(&tool.descriptor().schema, &json!({ "record_id": "a/b c" }))
            .expect("valid");
        let request = tool.build_request(&args).expect("request");
        assert_eq!(
            request.url.as_str(),
            "https://api.ancestry.com/v2/records/a%2Fb%20c"
        );
    }

    #[test]
    fn family_tree_search_omits_absent_fields() {
        let catalog = catalog(endpoint()).expect("catalog");
        let tool = catalog.get("ancestry_search_family_trees").expect("tool");
        let args = validate(
            &tool.descriptor().schema,
            &json!({ "name": "Ada Lovelace", "death_year": 1852 }),
        )
        .expect("valid");
        let request = tool.build_request(&args).expect("request");
        assert_eq!(request.query_value("name"), Some("Ada Lovelace"));
        assert_eq!(request.query_value("death_year"), Some("1852"));
        assert_eq!(request.query_value("birth_year"), None);
        assert_eq!(request.query_value("location"), None);
    }
}
