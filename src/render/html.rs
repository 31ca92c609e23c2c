//! HTML adapter: materializes view-models into markup.
//!
//! Element ids are the contract with the page: `chat-list`, `chat-empty`,
//! `system-tbody`, `system-empty`, `node-tbody`, `node-empty`, `target`,
//! `filter-peer` and `send-form`.

use std::fmt::Write;

use serde::Serialize;

use super::format::escape_html as esc;
use super::{ChatView, DashboardView, NodeView, SelectOption, SystemView};
use crate::models::MAX_MESSAGE_LEN;

/// Pre-rendered fragments keyed by the element they replace.
#[derive(Debug, Clone, Serialize)]
pub struct Fragments {
    pub revision: u64,
    pub chat_list: String,
    pub chat_empty: bool,
    pub system_tbody: String,
    pub system_empty: bool,
    pub node_tbody: String,
    pub node_empty: bool,
    pub target_options: String,
    pub peer_options: String,
}

pub fn fragments(view: &DashboardView) -> Fragments {
    Fragments {
        revision: view.revision,
        chat_list: chat_list(&view.chat),
        chat_empty: view.chat.is_empty(),
        system_tbody: system_tbody(&view.system),
        system_empty: view.system.is_empty(),
        node_tbody: node_tbody(&view.nodes),
        node_empty: view.nodes.is_empty(),
        target_options: select_options(&view.nodes.target_options),
        peer_options: select_options(&view.nodes.peer_options),
    }
}

pub fn chat_list(chat: &ChatView) -> String {
    let mut out = String::new();
    for entry in &chat.entries {
        let side = if entry.from_me { "from-me" } else { "other" };
        let _ = write!(
            out,
            r#"<div class="chat-msg {side}"><div class="chat-meta"><span class="pill pill-type-{code}">{label}</span><span class="chat-route">{src} → {dst}</span></div><div class="chat-content">{content}</div><div class="chat-footer">{time}</div></div>"#,
            side = side,
            code = entry.type_code,
            label = esc(entry.type_label),
            src = esc(&entry.source),
            dst = esc(&entry.destination),
            content = esc(&entry.content),
            time = esc(&entry.time),
        );
    }
    out
}

pub fn system_tbody(system: &SystemView) -> String {
    let mut out = String::new();
    for row in &system.rows {
        let _ = write!(out, r#"<tr class="{}">"#, row.direction.css_class());
        let id = row.id.to_string();
        for cell in [
            row.time.as_str(),
            id.as_str(),
            row.type_label,
            row.origin.as_str(),
            row.source.as_str(),
            row.destination.as_str(),
            row.steps.as_str(),
            row.length.as_str(),
            row.rssi.as_str(),
            row.snr.as_str(),
            row.stage.as_str(),
            row.transfer_status.as_str(),
            row.ack_status.as_str(),
            row.ack_for.as_str(),
            row.content.as_str(),
        ] {
            let _ = write!(out, "<td>{}</td>", esc(cell));
        }
        out.push_str("</tr>");
    }
    out
}

pub fn node_tbody(nodes: &NodeView) -> String {
    let mut out = String::new();
    for row in &nodes.rows {
        let class = if row.this_node { r#" class="this-node""# } else { "" };
        let _ = write!(
            out,
            "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            class,
            esc(&row.address),
            esc(&row.name),
            row.messages,
            esc(&row.avg_rssi),
            esc(&row.avg_snr),
            esc(row.status),
            esc(&row.last_seen),
        );
    }
    out
}

pub fn select_options(options: &[SelectOption]) -> String {
    let mut out = String::new();
    for opt in options {
        let selected = if opt.selected { " selected" } else { "" };
        let _ = write!(
            out,
            r#"<option value="{}"{}>{}</option>"#,
            esc(&opt.value),
            selected,
            esc(&opt.label)
        );
    }
    out
}

fn empty_display(empty: bool) -> &'static str {
    if empty {
        "block"
    } else {
        "none"
    }
}

/// Full dashboard page. `refresh_ms` drives the fragment refresh loop.
pub fn page(view: &DashboardView, refresh_ms: u64) -> String {
    let parts = fragments(view);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Mesh Dashboard</title>
    <style>{style}</style>
</head>
<body data-refresh-ms="{refresh_ms}">
<div class="container">
    <h1>LoRa Mesh Network</h1>
    <div class="subtitle">Current node: <span id="current-node">{current}</span></div>

    <section class="card">
        <h2>Chat</h2>
        <form id="filter-form" method="post" action="/filter">
            <label for="filter-peer">Conversation with</label>
            <select id="filter-peer" name="peer" onchange="this.form.submit()">{peer_options}</select>
        </form>
        <div id="chat-list">{chat_list}</div>
        <div id="chat-empty" class="empty" style="display: {chat_empty}">No messages yet.</div>
        <form id="send-form" method="post" action="/send">
            <select id="target" name="target">{target_options}</select>
            <input id="message" name="message" type="text" maxlength="{max_len}" placeholder="Message" required>
            <button type="submit">Send</button>
        </form>
    </section>

    <section class="card">
        <h2>System messages</h2>
        <div class="table-container">
            <table>
                <thead><tr><th>Time</th><th>ID</th><th>Type</th><th>Origin</th><th>Source</th><th>Destination</th><th>Steps</th><th>Length</th><th>RSSI</th><th>SNR</th><th>Stage</th><th>Transfer</th><th>Ack</th><th>Ack for</th><th>Content</th></tr></thead>
                <tbody id="system-tbody">{system_tbody}</tbody>
            </table>
        </div>
        <div id="system-empty" class="empty" style="display: {system_empty}">No system messages.</div>
    </section>

    <section class="card">
        <h2>Nodes</h2>
        <div class="table-container">
            <table>
                <thead><tr><th>Address</th><th>Name</th><th>Messages</th><th>Avg RSSI</th><th>Avg SNR</th><th>Status</th><th>Last contact</th></tr></thead>
                <tbody id="node-tbody">{node_tbody}</tbody>
            </table>
        </div>
        <div id="node-empty" class="empty" style="display: {node_empty}">No nodes discovered.</div>
    </section>
</div>
<script>{script}</script>
</body>
</html>"#,
        style = STYLE,
        script = SCRIPT,
        refresh_ms = refresh_ms,
        current = esc(view.current_node.as_deref().unwrap_or("unknown")),
        peer_options = parts.peer_options,
        chat_list = parts.chat_list,
        chat_empty = empty_display(parts.chat_empty),
        target_options = parts.target_options,
        max_len = MAX_MESSAGE_LEN,
        system_tbody = parts.system_tbody,
        system_empty = empty_display(parts.system_empty),
        node_tbody = parts.node_tbody,
        node_empty = empty_display(parts.node_empty),
    )
}

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: system-ui, -apple-system, sans-serif; background: #0f1419; color: #fff; line-height: 1.5; }
.container { max-width: 1200px; margin: 0 auto; padding: 20px; }
h1 { color: #00d4ff; text-align: center; }
h2 { color: #00d4ff; margin-bottom: 12px; font-size: 1.1rem; }
.subtitle { text-align: center; color: #8e8e93; margin-bottom: 24px; }
.card { background: #1e1e1e; border: 1px solid #333; border-radius: 12px; padding: 20px; margin-bottom: 20px; }
.table-container { overflow-x: auto; }
table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
th, td { padding: 8px; text-align: left; border-bottom: 1px solid #333; }
th { color: #00d4ff; background: #2a2a2a; }
.empty { color: #8e8e93; padding: 12px 0; }
#chat-list { display: flex; flex-direction: column; gap: 8px; margin: 12px 0; }
.chat-msg { max-width: 70%; padding: 8px 12px; border-radius: 10px; background: #2a2a2a; }
.chat-msg.from-me { align-self: flex-end; background: #004d5f; }
.chat-meta { font-size: 0.75rem; color: #8e8e93; display: flex; gap: 8px; }
.chat-footer { font-size: 0.7rem; color: #8e8e93; text-align: right; }
.pill { padding: 0 8px; border-radius: 10px; background: #00d4ff20; color: #00d4ff; }
.pill-type-4 { background: #ff3b3020; color: #ff3b30; }
.sys-from-me { background: #00d4ff10; }
.sys-to-me { background: #34c75910; }
.this-node { font-weight: 600; color: #00d4ff; }
form { display: flex; gap: 8px; }
select, input, button { padding: 6px 10px; border-radius: 6px; border: 1px solid #333; background: #2a2a2a; color: #fff; }
input { flex: 1; }
button { background: #00d4ff; color: #0f1419; font-weight: 600; cursor: pointer; }
"#;

const SCRIPT: &str = r#"
(function () {
  var refresh = Number(document.body.dataset.refreshMs) || 1000;
  var last = {};
  function swap(id, html) {
    var el = document.getElementById(id);
    if (el && last[id] !== html) { el.innerHTML = html; last[id] = html; }
  }
  // Option lists are left alone while open and keep the user's choice.
  function swapSelect(id, html) {
    var el = document.getElementById(id);
    if (!el || last[id] === html || document.activeElement === el) return;
    var chosen = el.value;
    el.innerHTML = html;
    last[id] = html;
    for (var i = 0; i < el.options.length; i++) {
      if (el.options[i].value === chosen) { el.value = chosen; break; }
    }
  }
  function show(id, visible) {
    var el = document.getElementById(id);
    if (el) el.style.display = visible ? 'block' : 'none';
  }
  function tick() {
    fetch('/fragments', { cache: 'no-store' })
      .then(function (res) { if (!res.ok) throw new Error(res.status); return res.json(); })
      .then(function (f) {
        swap('chat-list', f.chat_list); show('chat-empty', f.chat_empty);
        swap('system-tbody', f.system_tbody); show('system-empty', f.system_empty);
        swap('node-tbody', f.node_tbody); show('node-empty', f.node_empty);
        swapSelect('target', f.target_options); swapSelect('filter-peer', f.peer_options);
      })
      .catch(function (e) { console.warn('Failed to refresh dashboard:', e); });
  }
  setInterval(tick, refresh);
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render, Direction, SystemRow};
    use crate::state::DashboardState;
    use crate::store::StoreStrategy;
    use serde_json::json;

    fn hostile_state() -> DashboardState {
        let mut state = DashboardState::new(StoreStrategy::Incremental);
        state.apply_nodes(
            serde_json::from_value(json!([
                { "address": "A", "name": "<b>me</b>", "current_node": 1 },
                { "address": "B\"><script>", "name": "bob" }
            ]))
            .unwrap(),
        );
        state.apply_messages(
            1,
            serde_json::from_value(json!([
                { "id": 1, "message_type": 2, "origin": "A", "source": "A",
                  "destination": "B", "content": "<script>alert('x')</script>", "timestamp": 10 },
                { "id": 2, "message_type": 6, "origin": "B", "source": "B",
                  "destination": "A", "content": "ping & \"pong\"", "timestamp": 20,
                  "stage": "<i>relay</i>" }
            ]))
            .unwrap(),
        );
        state
    }

    #[test]
    fn test_fragments_escape_user_content() {
        let view = render(&hostile_state(), 100);
        let parts = fragments(&view);

        assert!(!parts.chat_list.contains("<script>"));
        assert!(parts
            .chat_list
            .contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(parts.chat_list.contains(r#"class="chat-msg from-me""#));

        assert!(parts.system_tbody.contains("ping &amp; &quot;pong&quot;"));
        assert!(parts.system_tbody.contains("&lt;i&gt;relay&lt;/i&gt;"));
        assert!(parts.system_tbody.starts_with(r#"<tr class="sys-to-me">"#));

        assert!(parts.node_tbody.contains("&lt;b&gt;me&lt;/b&gt;"));
        assert!(parts.node_tbody.contains(r#"<tr class="this-node">"#));
        assert!(parts.target_options.contains(r#"value="B&quot;&gt;&lt;script&gt;""#));
        assert!(!parts.chat_empty);
        assert!(!parts.node_empty);
    }

    #[test]
    fn test_system_row_has_fifteen_cells() {
        let row = SystemRow {
            direction: Direction::Neither,
            time: "12:00:00".into(),
            id: 4,
            type_label: "Ack",
            origin: "1".into(),
            source: "1".into(),
            destination: "2".into(),
            steps: String::new(),
            length: String::new(),
            rssi: String::new(),
            snr: String::new(),
            stage: String::new(),
            transfer_status: String::new(),
            ack_status: String::new(),
            ack_for: "3".into(),
            content: String::new(),
        };
        let html = system_tbody(&SystemView { rows: vec![row] });
        assert_eq!(html.matches("<td>").count(), 15);
        assert!(html.starts_with(r#"<tr class="sys-other">"#));
    }

    #[test]
    fn test_page_carries_element_contract() {
        let html = page(&render(&DashboardState::default(), 0), 1000);
        for id in [
            "chat-list",
            "chat-empty",
            "system-tbody",
            "system-empty",
            "node-tbody",
            "node-empty",
            "target",
            "filter-peer",
            "send-form",
        ] {
            assert!(html.contains(&format!(r#"id="{}""#, id)), "missing #{}", id);
        }
        assert!(html.contains(r#"id="chat-empty" class="empty" style="display: block""#));
        assert!(html.contains(r#"<option value="0" selected>Broadcast</option>"#));
        assert!(html.contains(r#"data-refresh-ms="1000""#));
    }

    #[test]
    fn test_refresh_keeps_select_choice() {
        let html = page(&render(&DashboardState::default(), 0), 1000);
        assert!(html.contains("swapSelect('target', f.target_options)"));
        assert!(html.contains("swapSelect('filter-peer', f.peer_options)"));
        assert!(!html.contains("swap('target'"));
        assert!(html.contains("document.activeElement === el"));
    }
}
