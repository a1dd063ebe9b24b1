//! wxnow - status file writer driven by observation events on stdin
//!
//! Usage:
//!   wxnow -c wxnow.yaml < events.jsonl
//!   wxnow --host-version 4.10.2
//!
//! Each stdin line is one event:
//!   {"event": "loop", "data": {"dateTime": 1700000000, "usUnits": 1, "outTemp": 68.0}}

use wxnow::plugin::run_service;
use wxnow::WxNowService;

fn main() -> anyhow::Result<()> {
    run_service::<WxNowService>()
}
