/// MCP request loop tests: JSON-RPC lines in, JSON-RPC responses out
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use habit_fasting_tracker::mcp::protocol::{error_codes, JsonRpcResponse};
use habit_fasting_tracker::mcp::McpServer;
use habit_fasting_tracker::*;
use serde_json::{json, Value};

fn server() -> McpServer {
    let tracker = Tracker::open(
        Arc::new(MemoryKvStore::new()),
        Arc::new(RecordingScheduler::new()),
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 11, 5, 10, 0, 0).unwrap(),
        )),
    );
    McpServer::new(HabitTrackerServer::with_tracker(tracker))
}

fn send(server: &mut McpServer, request: Value) -> Option<JsonRpcResponse> {
    tokio_test::block_on(server.handle_line(&request.to_string()))
}

fn call(server: &mut McpServer, id: u64, tool: &str, arguments: Value) -> (bool, String) {
    let response = send(
        server,
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": tool, "arguments": arguments}
        }),
    )
    .expect("tools/call should get a response");

    let result = response.result.expect("tool calls report errors in the result");
    let text = result["content"][0]["text"].as_str().unwrap_or_default().to_string();
    (result["isError"].as_bool().unwrap_or(false), text)
}

fn extract_id(text: &str, label: &str) -> String {
    text.lines()
        .find_map(|line| line.trim().strip_prefix(label))
        .map(|id| id.trim().to_string())
        .expect("response should carry an id")
}

#[cfg(test)]
mod mcp_tests {
    use super::*;

    #[test]
    fn test_initialize_and_list_tools() {
        let mut server = server();

        let response = send(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        )
        .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert!(result["capabilities"]["tools"].is_object());

        // Notifications get no response
        assert!(send(
            &mut server,
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"})
        )
        .is_none());
        assert!(server.is_initialized());

        let response = send(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        )
        .unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
        for expected in [
            "habit_create",
            "habit_update",
            "habit_delete",
            "habit_mark_day",
            "habit_status",
            "habit_list",
            "app_resume",
            "fasting_start",
            "fasting_end",
            "fasting_status",
            "fasting_settings",
        ] {
            assert!(names.contains(&expected), "missing tool {}", expected);
        }
        assert!(tools[0]["inputSchema"].is_object());
    }

    #[test]
    fn test_habit_workflow_over_json_rpc() {
        let mut server = server();

        let (is_error, text) = call(
            &mut server,
            1,
            "habit_create",
            json!({"name": "No coffee", "type": "caffeine"}),
        );
        assert!(!is_error, "{}", text);
        let habit_id = extract_id(&text, "Habit ID:");

        let (is_error, text) = call(
            &mut server,
            2,
            "habit_mark_day",
            json!({"habit_id": habit_id, "status": "success"}),
        );
        assert!(!is_error, "{}", text);
        assert!(text.contains("Current streak: 1 day"));

        let (_, text) = call(
            &mut server,
            3,
            "habit_mark_day",
            json!({"habit_id": habit_id, "status": "failure"}),
        );
        assert!(text.contains("Current streak: 0 days"));

        let (is_error, text) = call(&mut server, 4, "habit_list", json!({}));
        assert!(!is_error);
        assert!(text.contains("No coffee"));

        let (is_error, _) = call(
            &mut server,
            5,
            "habit_delete",
            json!({"habit_id": habit_id, "permanent": true}),
        );
        assert!(!is_error);
        let habits = server.habit_tracker().tracker().habits(false);
        assert!(habits.is_empty());
    }

    #[test]
    fn test_fasting_workflow_over_json_rpc() {
        let mut server = server();

        let (is_error, text) = call(&mut server, 1, "fasting_start", json!({}));
        assert!(!is_error);
        assert!(text.contains("16-hour fast"));

        let (_, text) = call(&mut server, 2, "fasting_status", json!({}));
        assert!(text.contains("Fasting"));

        let (_, text) = call(&mut server, 3, "fasting_end", json!({}));
        assert!(text.contains("Fast complete"));

        let (_, text) = call(&mut server, 4, "fasting_end", json!({}));
        assert_eq!(text, "No fast in progress.");

        let (is_error, text) = call(
            &mut server,
            5,
            "fasting_settings",
            json!({"fasting_hours": 0}),
        );
        assert!(is_error);
        assert!(text.contains("fastingHours"));
    }

    #[test]
    fn test_errors_are_reported() {
        let mut server = server();

        let (is_error, text) = call(
            &mut server,
            1,
            "habit_mark_day",
            json!({"habit_id": HabitId::new().to_string(), "status": "success"}),
        );
        assert!(is_error);
        assert!(text.contains(&error_codes::HABIT_NOT_FOUND.to_string()));

        let (is_error, text) = call(&mut server, 2, "habit_create", json!({"name": "x"}));
        assert!(is_error);
        assert!(text.contains("Invalid arguments"));

        let (is_error, _) = call(&mut server, 3, "habit_fly", json!({}));
        assert!(is_error);

        let response = send(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"}),
        )
        .unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);

        let response = tokio_test::block_on(server.handle_line("{not json")).unwrap();
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
    }
}
