//! Marketstack end-of-day, intraday, ticker and exchange data.

use crate::tool::ProviderTool;
use relay_rs_protocol::ToolError;
use relay_rs_tools::{
    CatalogError, Endpoint, ErrorShape, FieldKind, FieldSpec, Schema, Tool, ToolCatalog,
    ToolDescriptor, UpstreamRequest, ValidatedArguments,
};
use serde_json::json;
use std::sync::Arc;

/// Default API root. The free plan only serves plain HTTP.
pub const DEFAULT_BASE_URL: &str = "http://api.marketstack.com/v1";

/// Query parameter carrying the access key.
pub const ACCESS_KEY_PARAM: &str = "access_key";

/// Marketstack reports failures as `{"error": {"code", "message"}}`.
pub const ERROR_SHAPES: &[ErrorShape] = &[ErrorShape::ErrorObject];

pub const EOD: &str = "marketstack_eod";
pub const INTRADAY: &str = "marketstack_intraday";
pub const TICKERS: &str = "marketstack_tickers";
pub const EXCHANGES: &str = "marketstack_exchanges";

const INTERVALS: [&str; 9] = [
    "1min", "5min", "15min", "30min", "1hour", "3hour", "6hour", "12hour", "24hour",
];

fn symbols() -> FieldSpec {
    FieldSpec::new(
        "symbols",
        "Stock symbol(s) to fetch data for",
        &[FieldKind::String, FieldKind::StringArray],
    )
    .required()
}

fn limit() -> FieldSpec {
    FieldSpec::integer("limit", "Number of results per page (1-1000)")
        .range(1.0, 1000.0)
        .default_value(json!(100))
}

fn offset() -> FieldSpec {
    FieldSpec::integer("offset", "Pagination offset").min(0.0)
}

/// Build the Marketstack catalog against an authenticated endpoint.
pub fn catalog(endpoint: Arc<Endpoint>) -> Result<ToolCatalog, CatalogError> {
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                EOD,
                "Get end-of-day stock data",
                Schema::new(vec![
                    symbols(),
                    FieldSpec::string("date_from", "Start date (YYYY-MM-DD)"),
                    FieldSpec::string("date_to", "End date (YYYY-MM-DD)"),
                    limit(),
                    offset(),
                ]),
            ),
            "Failed to get end-of-day data",
            endpoint.clone(),
            eod,
        )),
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                INTRADAY,
                "Get intraday stock data",
                Schema::new(vec![
                    symbols(),
                    FieldSpec::string("interval", "Time interval between data points")
                        .one_of(&INTERVALS),
                    FieldSpec::string("date_from", "Start date (YYYY-MM-DD)"),
                    FieldSpec::string("date_to", "End date (YYYY-MM-DD)"),
                    limit(),
                    offset(),
                ]),
            ),
            "Failed to get intraday data",
            endpoint.clone(),
            intraday,
        )),
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                TICKERS,
                "Search for stock symbols and company information",
                Schema::new(vec![
                    FieldSpec::string("search", "Search term"),
                    FieldSpec::string("exchange", "Filter by exchange (e.g., 'XNAS' for NASDAQ)"),
                    limit(),
                    offset(),
                ]),
            ),
            "Ticker search failed",
            endpoint.clone(),
            tickers,
        )),
        Arc::new(ProviderTool::new(
            ToolDescriptor::new(
                EXCHANGES,
                "Get stock exchange information",
                Schema::new(vec![
                    FieldSpec::string("search", "Search term"),
                    limit(),
                    offset(),
                ]),
            ),
            "Failed to get exchanges",
            endpoint,
            exchanges,
        )),
    ];
    ToolCatalog::from_tools(tools)
}

fn eod(endpoint: &Endpoint, args: &ValidatedArguments) -> Result<UpstreamRequest, ToolError> {
    Ok(endpoint
        .get(&["eod"])?
        .query_opt("symbols", args.param("symbols"))
        .query_opt("date_from", args.param("date_from"))
        .query_opt("date_to", args.param("date_to"))
        .query_opt("limit", args.param("limit"))
        .query_opt("offset", args.param("offset")))
}

fn intraday(endpoint: &Endpoint, args: &ValidatedArguments) -> Result<UpstreamRequest, ToolError> {
    Ok(endpoint
        .get(&["intraday"])?
        .query_opt("symbols", args.param("symbols"))
        .query_opt("interval", args.param("interval"))
        .query_opt("date_from", args.param("date_from"))
        .query_opt("date_to", args.param("date_to"))
        .query_opt("limit", args.param("limit"))
        .query_opt("offset", args.param("offset")))
}

fn tickers(endpoint: &Endpoint, args: &ValidatedArguments) -> Result<UpstreamRequest, ToolError> {
    Ok(endpoint
        .get(&["tickers"])?
        .query_opt("search", args.param("search"))
        .query_opt("exchange", args.param("exchange"))
        .query_opt("limit", args.param("limit"))
        .query_opt("offset", args.param("offset")))
}

fn exchanges(endpoint: &Endpoint, args: &ValidatedArguments) -> Result<UpstreamRequest, ToolError> {
    Ok(endpoint
        .get(&["exchanges"])?
        .query_opt("search", args.param("search"))
        .query_opt("limit", args.param("limit"))
        .query_opt("offset", args.param("offset")))
}

#[cfg(test)]
mod tests {
    use super::{ACCESS_KEY_PARAM, DEFAULT_BASE_URL, catalog};
    use pretty_assertions::assert_eq;
    use relay_rs_tools::{Auth, Endpoint, Secret, Tool, validate};
    use serde_json::json;
    use std::sync::Arc;

    fn endpoint() -> Arc<Endpoint> {
        Arc::new(
            Endpoint::new(
                DEFAULT_BASE_URL,
                Auth::QueryKey {
                    param: ACCESS_KEY_PARAM.to_string(),
                    key: Secret::new("ms-key"),
                },
            )
            .expect("endpoint"),
        )
    }

    #[test]
    fn eod_joins_symbols_and_applies_default_limit() {
        let catalog = catalog(endpoint()).expect("catalog");
        let tool = catalog.get("marketstack_eod").expect("tool");
        let args = validate(
            &tool.descriptor().schema,
            &json!({ "symbols": ["AAPL", "MSFT"], "date_from": "2024-01-02" }),
        )
        .expect("valid");
        let request = tool.build_request(&args).expect("request");
        assert_eq!(
            request.full_url().as_str(),
            "http://api.marketstack.com/v1/eod?access_key=ms-key&symbols=AAPL%2CMSFT&date_from=2024-01-02&limit=100"
        );
        assert_eq!(request.header_value("authorization"), None);
    }

    #[test]
    fn intraday_rejects_unknown_interval() {
        let catalog = catalog(endpoint()).expect("catalog");
        let tool = catalog.get("marketstack_intraday").expect("tool");
        validate(
            &tool.descriptor().schema,
            &json!({ "symbols": "AAPL", "interval": "12hour" }),
        )
        .expect("known interval");
        let err = validate(
            &tool.descriptor().schema,
            &json!({ "symbols": "AAPL", "interval": "2min" }),
        )
        .expect_err("unknown interval");
        assert!(err.to_string().starts_with("field `interval` expected string one of"));
    }

    #[test]
    fn tickers_and_exchanges_need_no_arguments() {
        let catalog = catalog(endpoint()).expect("catalog");
        for name in ["marketstack_tickers", "marketstack_exchanges"] {
            let tool = catalog.get(name).expect("tool");
            let args = validate(&tool.descriptor().schema, &json!({})).expect("valid");
            let request = tool.build_request(&args).expect("request");
            assert_eq!(request.query_value("access_key"), Some("ms-key"));
            assert_eq!(request.query_value("limit"), Some("100"));
            assert_eq!(request.query_value("search"), None);
        }
    }

    #[test]
    fn listing_renders_symbols_as_union() {
        let catalog = catalog(endpoint()).expect("catalog");
        let listing = catalog.listing();
        let eod = &listing.tools[0];
        assert_eq!(eod.name, "marketstack_eod");
        assert_eq!(
            eod.input_schema["properties"]["symbols"]["oneOf"],
            json!([
                { "type": "string" },
                { "type": "array", "items": { "type": "string" } }
            ])
        );
        assert_eq!(eod.input_schema["required"], json!(["symbols"]));
    }
}
