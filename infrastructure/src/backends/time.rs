//! `get-current-time` tool: the local wall-clock time in Japanese notation.
//!
//! Output looks like `2025年6月1日 日曜日 09:05:03`.

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use toolbridge_domain::tool::{CallToolResult, NoArgs, ToolDescriptor, typed_handler};

use crate::federation::{ToolServer, error::Result};

/// Canonical tool name for the time tool.
pub const GET_CURRENT_TIME: &str = "get-current-time";

const WEEKDAYS: [&str; 7] = ["月", "火", "水", "木", "金", "土", "日"];

pub fn get_current_time_definition() -> ToolDescriptor {
    ToolDescriptor::new(GET_CURRENT_TIME, "Return the current local date and time")
}

/// Format a timestamp as `YYYY年M月D日 W曜日 HH:MM:SS`
pub fn format_japanese(time: &NaiveDateTime) -> String {
    let weekday = WEEKDAYS[time.weekday().num_days_from_monday() as usize];
    format!(
        "{}年{}月{}日 {}曜日 {:02}:{:02}:{:02}",
        time.year(),
        time.month(),
        time.day(),
        weekday,
        time.hour(),
        time.minute(),
        time.second()
    )
}

/// Build the time provider
pub fn time_server() -> Result<ToolServer> {
    ToolServer::new("time", env!("CARGO_PKG_VERSION")).with_tool(
        get_current_time_definition(),
        typed_handler(|_: NoArgs| async {
            CallToolResult::text(format_japanese(&Local::now().naive_local()))
        }),
    )
}
