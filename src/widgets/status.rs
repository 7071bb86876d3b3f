//! OpenClaw status widgets: auth mode, release checks, activity, cron and logs.

use serde_json::json;

use super::markup::{fetch_json, Card, Poller, CENTERED_COLUMN, CENTERED_ROW};
use super::props::WidgetProps;
use super::WidgetDescriptor;
use crate::models::WidgetCategory;

const OPENCLAW_API: &str = "OPENCLAW_API";

pub(super) fn descriptors() -> Vec<WidgetDescriptor> {
    vec![
        WidgetDescriptor::new("auth-status", "Auth Status", "🔐", WidgetCategory::Small)
            .description("Shows if OpenClaw is using Anthropic Max subscription (green) or API key fallback (yellow).")
            .size(180, 100)
            .credential(OPENCLAW_API)
            .defaults(json!({ "title": "Auth Type", "endpoint": "/api/status", "refreshInterval": 30 }))
            .render(auth_markup, auth_behavior),
        WidgetDescriptor::new("openclaw-release", "OpenClaw Release", "🦞", WidgetCategory::Small)
            .description("Auto-detects running OpenClaw version and compares to latest GitHub release.")
            .size(200, 120)
            .defaults(json!({ "title": "OpenClaw", "openclawUrl": "", "refreshInterval": 3600 }))
            .render(openclaw_release_markup, openclaw_release_behavior),
        WidgetDescriptor::new("release", "Release", "📦", WidgetCategory::Small)
            .description("Compares your current version of any software to its latest GitHub release.")
            .size(200, 120)
            .defaults(json!({
                "title": "Release",
                "repo": "openclaw/openclaw",
                "currentVersion": "",
                "refreshInterval": 3600
            }))
            .render(release_markup, release_behavior),
        WidgetDescriptor::new("activity-list", "Activity List", "📋", WidgetCategory::Large)
            .description("Shows recent OpenClaw activity from /api/activity endpoint.")
            .size(400, 300)
            .credential(OPENCLAW_API)
            .defaults(json!({
                "title": "Today",
                "endpoint": "/api/activity",
                "maxItems": 10,
                "refreshInterval": 60
            }))
            .render(activity_markup, activity_behavior),
        WidgetDescriptor::new("cron-jobs", "Cron Jobs", "⏰", WidgetCategory::Large)
            .description("Lists scheduled cron jobs from OpenClaw /api/cron endpoint.")
            .size(400, 250)
            .credential(OPENCLAW_API)
            .defaults(json!({ "title": "Cron", "endpoint": "/api/cron", "refreshInterval": 30 }))
            .render(cron_markup, cron_behavior),
        WidgetDescriptor::new("system-log", "System Log", "🔧", WidgetCategory::Large)
            .description("Shows recent system logs from OpenClaw /api/logs endpoint.")
            .size(500, 400)
            .credential(OPENCLAW_API)
            .defaults(json!({
                "title": "System Log",
                "endpoint": "/api/logs",
                "maxLines": 50,
                "refreshInterval": 10
            }))
            .render(system_log_markup, system_log_behavior),
    ]
}

fn failed_list(id: &str, suffix: &str) -> String {
    format!(
        "          document.getElementById('{}-{}').innerHTML = '<div class=\"error\">Failed to load</div>';",
        id, suffix
    )
}

fn auth_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    Card::new(*props, "🔐", "Auth Type").body_style(CENTERED_ROW).build(&format!(
        r#"          <div class="kpi-indicator" id="{id}-dot"></div>
          <div class="kpi-value" id="{id}-value">—</div>"#
    ))
}

fn auth_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/status")),
        &format!(
            r#"          const oauth = data.authMode === 'oauth';
          document.getElementById('{id}-value').textContent = oauth ? 'Subscription' : 'API';
          document.getElementById('{id}-dot').className = 'kpi-indicator ' + (oauth ? 'green' : 'yellow');"#
        ),
        &format!("          document.getElementById('{id}-value').textContent = 'Error';"),
    );
    Poller::new(*props, "Auth Status", 30.0).build(&body)
}

fn version_markup(props: &WidgetProps<'_>, icon: &'static str, fallback_title: &str) -> String {
    let id = props.dom_id();
    Card::new(*props, icon, fallback_title).body_style(CENTERED_COLUMN).build(&format!(
        r#"          <div class="kpi-value" id="{id}-version" style="font-size:16px;">—</div>
          <div class="kpi-label" id="{id}-status">Checking...</div>"#
    ))
}

fn openclaw_release_markup(props: &WidgetProps<'_>) -> String {
    version_markup(props, "🦞", "OpenClaw")
}

fn openclaw_release_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = format!(
        r#"        const versionEl = document.getElementById('{id}-version');
        const statusEl = document.getElementById('{id}-status');
        const baseUrl = '{base}'.replace(/\/$/, '');
        try {{
          const statusRes = await fetch(baseUrl + '/api/status');
          const statusData = await statusRes.json();
          const currentVersion = (statusData.version || '').replace(/^v/, '');
          const ghRes = await fetch('https://api.github.com/repos/openclaw/openclaw/releases/latest');
          const ghData = await ghRes.json();
          const latestVersion = (ghData.tag_name || '').replace(/^v/, '');
          if (!currentVersion) {{
            versionEl.textContent = 'v' + latestVersion;
            statusEl.textContent = 'Latest release';
          }} else if (currentVersion === latestVersion) {{
            versionEl.textContent = 'v' + currentVersion;
            versionEl.style.color = 'var(--accent-green)';
            statusEl.textContent = '✓ Up to date';
            statusEl.style.color = 'var(--accent-green)';
          }} else {{
            versionEl.textContent = 'v' + latestVersion + ' available';
            versionEl.style.color = 'var(--accent-blue)';
            statusEl.textContent = '⬆ Running v' + currentVersion;
            statusEl.style.color = 'var(--accent-blue)';
          }}
        }} catch (e) {{
          versionEl.textContent = '—';
          statusEl.innerHTML = '<span style="font-size:10px;">CORS error - serve from same origin</span>';
          console.error('OpenClaw Release widget: CORS error. Serve dashboard from OpenClaw or configure CORS.', e);
        }}"#,
        base = props.js("openclawUrl", ""),
    );
    Poller::new(*props, "OpenClaw Release", 3600.0).build(&body)
}

fn release_markup(props: &WidgetProps<'_>) -> String {
    version_markup(props, "📦", "Release")
}

fn release_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = format!(
        r#"        const currentVersion = '{current}'.replace(/^v/, '');
        const versionEl = document.getElementById('{id}-version');
        const statusEl = document.getElementById('{id}-status');
        try {{
          const res = await fetch('https://api.github.com/repos/{repo}/releases/latest');
          const data = await res.json();
          const latestVersion = (data.tag_name || '').replace(/^v/, '');
          versionEl.textContent = 'v' + latestVersion;
          if (!currentVersion) {{
            statusEl.textContent = 'Latest release';
            versionEl.style.color = 'var(--text-primary)';
          }} else if (currentVersion === latestVersion) {{
            versionEl.style.color = 'var(--accent-green)';
            statusEl.textContent = '✓ Up to date';
            statusEl.style.color = 'var(--accent-green)';
          }} else {{
            versionEl.style.color = 'var(--accent-blue)';
            statusEl.textContent = '⬆ Update available (v' + currentVersion + ')';
            statusEl.style.color = 'var(--accent-blue)';
          }}
        }} catch (e) {{
          versionEl.textContent = 'Error';
          statusEl.textContent = 'Failed to check';
        }}"#,
        current = props.js("currentVersion", ""),
        repo = props.js("repo", "openclaw/openclaw"),
    );
    Poller::new(*props, "Release", 3600.0).build(&body)
}

fn activity_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "📋", "Today")
        .badge()
        .body_class("compact-list")
        .body_id("list")
        .build(r#"          <div class="list-item">Loading...</div>"#)
}

fn activity_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/activity")),
        &format!(
            r#"          const items = data.items || [];
          document.getElementById('{id}-list').innerHTML = items.slice(0, {max}).map(item =>
            '<div class="list-item">' + item.text + '</div>'
          ).join('');
          document.getElementById('{id}-badge').textContent = items.length + ' items';"#,
            max = super::props::format_number(props.number("maxItems", 10.0)),
        ),
        &failed_list(&id, "list"),
    );
    Poller::new(*props, "Activity List", 60.0).build(&body)
}

fn cron_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "⏰", "Cron")
        .badge()
        .body_id("list")
        .build(r#"          <div class="cron-item"><span class="cron-name">Loading...</span></div>"#)
}

fn cron_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/cron")),
        &format!(
            r#"          const jobs = data.jobs || [];
          document.getElementById('{id}-list').innerHTML = jobs.map(job =>
            '<div class="cron-item"><span class="cron-name">' + job.name + '</span><span class="cron-next">' + job.next + '</span></div>'
          ).join('');
          document.getElementById('{id}-badge').textContent = jobs.length + ' jobs';"#
        ),
        &failed_list(&id, "list"),
    );
    Poller::new(*props, "Cron Jobs", 30.0).build(&body)
}

fn system_log_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "🔧", "System Log")
        .badge()
        .body_class("compact-list syslog-scroll")
        .body_id("log")
        .build(r#"          <div class="log-line">Waiting for log lines...</div>"#)
}

fn system_log_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/logs")),
        &format!(
            r#"          const lines = data.lines || [];
          const log = document.getElementById('{id}-log');
          log.innerHTML = lines.slice(-{max}).map(line =>
            '<div class="log-line">' + line + '</div>'
          ).join('');
          document.getElementById('{id}-badge').textContent = lines.length + ' lines';
          log.scrollTop = log.scrollHeight;"#,
            max = super::props::format_number(props.number("maxLines", 50.0)),
        ),
        &failed_list(&id, "log"),
    );
    Poller::new(*props, "System Log", 10.0).build(&body)
}
