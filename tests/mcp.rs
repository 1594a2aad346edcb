use anyhow::Result;
use mapcond::catalog::Catalog;
use mapcond::config::{BodyKind, FetchConfig};
use mapcond::fetch::Fetcher;
use mapcond::mcp::{McpServer, error_codes};
use mapcond::pipeline::ConditionsService;
use serde_json::{Value, json};
use std::io::Cursor;

const PAGE: &str = "Dam Battlegrounds CURRENT CLOUDY WEATHER Next Condition ACID RAIN 3:45 PM \
Buried City CURRENT HURRICANE MAJOR CONDITION Practice Range No active condition";

fn server() -> Result<McpServer> {
    let config = FetchConfig::inline(PAGE, BodyKind::Text);
    let service = ConditionsService::new(Fetcher::from_config(&config)?, Catalog::default());
    Ok(McpServer::new(service))
}

fn call(server: &McpServer, tool: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 7,
        "method": "tools/call",
        "params": { "name": tool, "arguments": arguments },
    });
    server
        .handle_line(&request.to_string())
        .expect("requests always get a response")
}

fn text_of(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_default()
}

#[test]
fn initialize_and_list_tools() -> Result<()> {
    let server = server()?;

    let init = server
        .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
        .expect("initialize must respond");
    assert_eq!(init["result"]["serverInfo"]["name"], "map-conditions");
    assert!(init["result"]["capabilities"]["tools"].is_object());

    let list = server
        .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
        .expect("tools/list must respond");
    let names: Vec<&str> = list["result"]["tools"]
        .as_array()
        .map(|tools| tools.iter().filter_map(|t| t["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(
        names,
        [
            "get_map_conditions",
            "get_specific_map_condition",
            "get_active_conditions_only",
            "get_next_conditions"
        ]
    );
    Ok(())
}

#[test]
fn notifications_get_no_response() -> Result<()> {
    let server = server()?;
    assert!(
        server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .is_none()
    );
    Ok(())
}

#[test]
fn malformed_and_unknown_requests_are_errors() -> Result<()> {
    let server = server()?;

    let parse = server.handle_line("{not json").expect("parse errors respond");
    assert_eq!(parse["error"]["code"], error_codes::PARSE_ERROR);
    assert!(parse["id"].is_null());

    let unknown = server
        .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#)
        .expect("unknown methods respond");
    assert_eq!(unknown["error"]["code"], error_codes::METHOD_NOT_FOUND);
    assert_eq!(unknown["id"], 3);

    let bad_tool = call(&server, "get_weather", json!({}));
    assert_eq!(bad_tool["error"]["code"], error_codes::INVALID_PARAMS);
    Ok(())
}

#[test]
fn summary_tool_call() -> Result<()> {
    let server = server()?;
    let response = call(&server, "get_map_conditions", json!({ "format": "summary" }));

    assert_eq!(response["result"]["isError"], false);
    assert_eq!(
        text_of(&response),
        "2/6 zones have active conditions (1 major conditions)"
    );
    Ok(())
}

#[test]
fn specific_zone_tool_is_case_insensitive() -> Result<()> {
    let server = server()?;
    let response = call(
        &server,
        "get_specific_map_condition",
        json!({ "map_name": "dam battlegrounds", "format": "json" }),
    );

    let record: Value = serde_json::from_str(text_of(&response))?;
    assert_eq!(record["name"], "Dam Battlegrounds");
    assert_eq!(record["next_condition"], "ACID RAIN");
    Ok(())
}

#[test]
fn unknown_zone_tool_reports_error_content() -> Result<()> {
    let server = server()?;
    let response = call(
        &server,
        "get_specific_map_condition",
        json!({ "map_name": "Atlantis" }),
    );

    assert_eq!(response["result"]["isError"], true);
    assert_eq!(text_of(&response), "Error: Map 'Atlantis' not found");
    Ok(())
}

#[test]
fn active_tool_filters_major_conditions() -> Result<()> {
    let server = server()?;
    let response = call(
        &server,
        "get_active_conditions_only",
        json!({ "include_major_only": true }),
    );

    let text = text_of(&response);
    assert!(text.starts_with("MAJOR CONDITIONS (1 zones)"));
    assert!(text.contains("Buried City"));
    assert!(!text.contains("Dam Battlegrounds"));
    Ok(())
}

#[test]
fn stdio_loop_answers_each_request_line() -> Result<()> {
    let server = server()?;
    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"get_next_conditions","arguments":{}}}"#,
    ]
    .join("\n");

    let mut out = Vec::new();
    server.run(Cursor::new(input), &mut out)?;

    let lines: Vec<Value> = String::from_utf8(out)?
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], 1);
    assert!(
        lines[1]["result"]["content"][0]["text"]
            .as_str()
            .is_some_and(|t| t.contains("Dam Battlegrounds: ACID RAIN at 3:45 PM"))
    );
    Ok(())
}
