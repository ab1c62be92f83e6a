/// Integration tests: the tracker end to end, over real stores and the
/// MCP request loop
mod mcp_roundtrip;
mod persistence;
mod scenarios;
