//! FamilySearch tree graph: persons, pedigrees and person search.

use crate::tool::ProviderTool;
use relay_rs_protocol::ToolError;
use relay_rs_tools::{
    CatalogError, Endpoint, ErrorShape, FieldSpec, Schema, Tool, ToolCatalog, ToolDescriptor,
    UpstreamRequest, ValidatedArguments,
};
use serde_json::json;
use std::sync::Arc;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.familysearch.org/platform";

/// FamilySearch reports failures as `{"errors": [{"code", "message"}]}`.
pub const ERROR_SHAPES: &[ErrorShape] = &[ErrorShape::ErrorsArray];

pub const GET_PERSON: &str = "familysearch_get_person";
pub const GET_ANCESTRY: &str = "familysearch_get_ancestry";
pub const GET_DESCENDANCY: &str = "familysearch_get_descendancy";
pub const SEARCH_PERSONS: &str = "familysearch_search_persons";

/// Search fields folded into the `q` parameter, with their query keys.
const SEARCH_TERMS: [(&str, &str); 5] = [
    ("given_name", "givenName"),
    ("surname", "surname"),
    ("birth_year", "birthLikeDate"),
    ("birth_place", "birthLikePlace"),
    ("death_year", "deathLikeDate"),
];

/// Build the FamilySearch catalog against an authenticated endpoint.
pub fn catalog(endpoint: Arc<Endpoint>) -> Result<ToolCatalog, CatalogError> {
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                GET_PERSON,
                "Get a person from the FamilySearch family tree",
                Schema::new(vec![
                    FieldSpec::string("person_id", "Tree person ID, e.g. KWQS-BBQ").required(),
                ]),
            ),
            "Failed to get person",
            endpoint.clone(),
            get_person,
        )),
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                GET_ANCESTRY,
                "Get the ancestors (pedigree) of a person",
                Schema::new(vec![
                    FieldSpec::string("person_id", "Tree person ID").required(),
                    FieldSpec::integer("generations", "Number of generations to return (1-8)")
                        .range(1.0, 8.0)
                        .default_value(json!(4)),
                ]),
            ),
            "Failed to get ancestry",
            endpoint.clone(),
            get_ancestry,
        )),
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                GET_DESCENDANCY,
                "Get the descendants of a person",
                Schema::new(vec![
                    FieldSpec::string("person_id", "Tree person ID").required(),
                    FieldSpec::integer("generations", "Number of generations to return (1-2)")
                        .range(1.0, 2.0)
                        .default_value(json!(2)),
                ]),
            ),
            "Failed to get descendancy",
            endpoint.clone(),
            get_descendancy,
        )),
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                SEARCH_PERSONS,
                "Search the FamilySearch family tree for persons",
                Schema::new(vec![
                    FieldSpec::string("given_name", "Given name"),
                    FieldSpec::string("surname", "Surname"),
                    FieldSpec::number("birth_year", "Year of birth"),
                    FieldSpec::string("birth_place", "Place of birth"),
                    FieldSpec::number("death_year", "Year of death"),
                    FieldSpec::integer("count", "Number of results (1-100)")
                        .range(1.0, 100.0)
                        .default_value(json!(20)),
                    FieldSpec::integer("start", "Index of the first result").min(0.0),
                ]),
            ),
            "Person search failed",
            endpoint,
            search_persons,
        )),
    ];
    ToolCatalog::from_tools(tools)
}

fn get_person(endpoint: &Endpoint, args: &ValidatedArguments) -> Result<UpstreamRequest, ToolError> {
    endpoint.get(&["tree", "persons", args.require_str("person_id")?])
}

fn get_ancestry(
    endpoint: &Endpoint,
    args: &ValidatedArguments,
) -> Result<UpstreamRequest, ToolError> {
    Ok(endpoint
        .get(&["tree", "ancestry"])?
        .query("person", args.require_str("person_id")?)
        .query_opt("generations", args.param("generations")))
}

fn get_descendancy(
    endpoint: &Endpoint,
    args: &ValidatedArguments,
) -> Result<UpstreamRequest, ToolError> {
    Ok(endpoint
        .get(&["tree", "descendancy"])?
        .query("person", args.require_str("person_id")?)
        .query_opt("generations", args.param("generations")))
}

fn search_persons(
    endpoint: &Endpoint,
    args: &ValidatedArguments,
) -> Result<UpstreamRequest, ToolError> {
    let terms = SEARCH_TERMS
        .iter()
        .filter_map(|(field, key)| args.param(field).map(|value| search_term(key, &value)))
        .collect::<Vec<_>>();
    let query = (!terms.is_empty()).then(|| terms.join(" "));
    Ok(endpoint
        .get(&["tree", "search"])?
        .query_opt("q", query)
        .query_opt("count", args.param("count"))
        .query_opt("start", args.param("start")))
}

/// `key:value`, quoting values that contain whitespace.
fn search_term(key: &str, value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("{key}:\"{value}\"")
    } else {
        format!("{key}:{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BASE_URL, catalog};
    use pretty_assertions::assert_eq;
    use relay_rs_tools::{Auth, Endpoint, Secret, Tool, ValidationError, validate};
    use serde_json::json;
    use std::sync::Arc;

    fn endpoint() -> Arc<Endpoint> {
        Arc::new(
            Endpoint::new(DEFAULT_BASE_URL, Auth::Bearer(Secret::new("token-9")))
                .expect("endpoint"),
        )
    }

    #[test]
    fn person_lookup_targets_tree_path() {
        let catalog = catalog(endpoint()).expect("catalog");
        let tool = catalog.get("familysearch_get_person").expect("tool");
        let args = validate(&tool.descriptor().schema, &json!({ "person_id": "KWQS-BBQ" }))
            .expect("valid");
        let request = tool.build_request(&args).expect("request");
        assert_eq!(
            request.url.as_str(),
            "https://api.familysearch.org/platform/tree/persons/KWQS-BBQ"
        );
        assert_eq!(request.header_value("authorization"), Some("Bearer token-9"));
    }

    #[test]
    fn ancestry_defaults_to_four_generations() {
        let catalog = catalog(endpoint()).expect("catalog");
        let tool = catalog.get("familysearch_get_ancestry").expect("tool");
        let args = validate(&tool.descriptor().schema, &json!({ "person_id": "KWQS-BBQ" }))
            .expect("valid");
        let request = tool.build_request(&args).expect("request");
        assert_eq!(request.query_value("person"), Some("KWQS-BBQ"));
        assert_eq!(request.query_value("generations"), Some("4"));
    }

    #[test]
    fn descendancy_caps_generations() {
        let catalog = catalog(endpoint()).expect("catalog");
        let tool = catalog.get("familysearch_get_descendancy").expect("tool");
        let err = validate(
            &tool.descriptor().schema,
            &json!({ "person_id": "KWQS-BBQ", "generations": 3 }),
        )
        .expect_err("out of range");
        assert!(matches!(err, ValidationError::TypeMismatch { field, .. } if field == "generations"));
    }

    #[test]
    fn search_folds_fields_into_q() {
        let catalog = catalog(endpoint()).expect("catalog");
        let tool = catalog.get("familysearch_search_persons").expect("tool");
        let args = validate(
            &tool.descriptor().schema,
            &json!({
                "surname": "Lovelace",
                "given_name": "Ada",
                "birth_year": 1815,
                "birth_place": "London, England",
                "start": 40
            }),
        )
        .expect("valid");
        let request = tool.build_request(&args).expect("request");
        assert_eq!(
            request.query_value("q"),
            Some("givenName:Ada surname:Lovelace birthLikeDate:1815 birthLikePlace:\"London, England\"")
        );
        assert_eq!(request.query_value("count"), Some("20"));
        assert_eq!(request.query_value("start"), Some("40"));
    }

    #[test]
    fn search_without_terms_omits_q() {
        let catalog = catalog(endpoint()).expect("catalog");
        let tool = catalog.get("familysearch_search_persons").expect("tool");
        let args = validate(&tool.descriptor().schema, &json!({})).expect("valid");
        let request = tool.build_request(&args).expect("request");
        assert_eq!(request.query_value("q"), None);
    }
}
