//! Host and service monitoring widgets.

use serde_json::json;

use super::markup::{fetch_json, ring_tile, Card, Poller};
use super::props::WidgetProps;
use super::WidgetDescriptor;
use crate::models::WidgetCategory;

pub(super) fn descriptors() -> Vec<WidgetDescriptor> {
    vec![
        WidgetDescriptor::new("cpu-memory", "CPU / Memory", "💻", WidgetCategory::Small)
            .description("Shows CPU and memory usage. Requires system stats API.")
            .size(200, 120)
            .defaults(json!({ "title": "System", "endpoint": "/api/system", "refreshInterval": 5 }))
            .render(cpu_markup, cpu_behavior),
        WidgetDescriptor::new("disk-usage", "Disk Usage", "💾", WidgetCategory::Small)
            .description("Shows disk space usage. Requires system stats API.")
            .size(160, 100)
            .defaults(json!({
                "title": "Disk",
                "path": "/",
                "endpoint": "/api/disk",
                "refreshInterval": 60
            }))
            .render(disk_markup, disk_behavior),
        WidgetDescriptor::new("uptime-monitor", "Uptime Monitor", "📡", WidgetCategory::Large)
            .description("Shows service uptime. Requires uptime monitoring backend.")
            .size(350, 220)
            .defaults(json!({
                "title": "Uptime",
                "services": "Website,API,Database",
                "refreshInterval": 30
            }))
            .render(uptime_markup, uptime_behavior),
        WidgetDescriptor::new("docker-containers", "Docker Containers", "🐳", WidgetCategory::Large)
            .description("Lists Docker containers with status. Requires Docker API proxy.")
            .size(380, 250)
            .defaults(json!({ "title": "Containers", "endpoint": "/api/docker", "refreshInterval": 10 }))
            .render(docker_markup, docker_behavior),
        WidgetDescriptor::new("network-speed", "Network Speed", "🌐", WidgetCategory::Small)
            .description("Shows network upload/download speeds. Requires system stats API.")
            .size(200, 100)
            .defaults(json!({ "title": "Network", "endpoint": "/api/network", "refreshInterval": 2 }))
            .render(network_markup, network_behavior),
    ]
}

fn cpu_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    format!(
        r#"
      <div class="kpi-card kpi-sm" id="widget-{id}" style="flex-direction:column;">
        <div class="sys-row"><span>CPU</span><span class="blue" id="{id}-cpu">—</span></div>
        <div class="sys-row"><span>MEM</span><span class="green" id="{id}-mem">—</span></div>
      </div>"#
    )
}

fn cpu_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/system")),
        &format!(
            r#"          document.getElementById('{id}-cpu').textContent = (data.cpu || 0) + '%';
          document.getElementById('{id}-mem').textContent = (data.memory || 0).toFixed(1) + 'GB';"#
        ),
        "          console.error('System stats error:', e);",
    );
    Poller::new(*props, "CPU/Memory", 5.0).build(&body)
}

fn disk_markup(props: &WidgetProps<'_>) -> String {
    let label = format!(
        r#"<div class="kpi-label" id="{}-size">{}</div>"#,
        props.dom_id(),
        props.html("path", "Disk")
    );
    ring_tile(props, "var(--accent-orange)", "pct", &label)
}

fn disk_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!(
            "'{}?path=' + encodeURIComponent('{}')",
            props.js("endpoint", "/api/disk"),
            props.js("path", "/")
        ),
        &format!(
            r#"          const pct = data.percent || 0;
          const circumference = 125.66;
          document.getElementById('{id}-ring').style.strokeDashoffset = circumference - (pct / 100) * circumference;
          document.getElementById('{id}-pct').textContent = pct + '%';
          document.getElementById('{id}-size').textContent = (data.used || 0) + 'GB';"#
        ),
        "          console.error('Disk error:', e);",
    );
    Poller::new(*props, "Disk Usage", 60.0).build(&body)
}

fn uptime_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "📡", "Uptime")
        .body_id("services")
        .build(r#"          <div class="uptime-row"><span>🟡 Checking...</span></div>"#)
}

fn uptime_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let ident = props.ident();
    let preamble = format!(
        "      const services_{ident} = '{services}'.split(',').map(s => s.trim()).filter(Boolean);\n",
        services = props.js("services", "Service"),
    );
    let body = format!(
        r#"        document.getElementById('{id}-services').innerHTML = services_{ident}.map(svc =>
          '<div class="uptime-row"><span>🟢 ' + svc + '</span><span class="uptime-pct">—%</span></div>'
        ).join('');"#
    );
    Poller::new(*props, "Uptime Monitor", 30.0)
        .note("configure uptime check endpoints")
        .preamble(preamble)
        .sync()
        .build(&body)
}

fn docker_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "🐳", "Containers")
        .badge()
        .body_class("compact-list")
        .body_id("list")
        .build(r#"          <div class="docker-row">Loading...</div>"#)
}

fn docker_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/docker")),
        &format!(
            r#"          const containers = data.containers || [];
          document.getElementById('{id}-list').innerHTML = containers.map(c => {{
            const icon = c.status === 'running' ? '🟢' : '🔴';
            return '<div class="docker-row">' + icon + ' ' + c.name + '<span class="docker-status">' + c.status + '</span></div>';
          }}).join('');
          document.getElementById('{id}-badge').textContent = containers.length + ' containers';"#
        ),
        &format!(
            "          document.getElementById('{id}-list').innerHTML = '<div class=\"error\">Failed to load</div>';"
        ),
    );
    Poller::new(*props, "Docker Containers", 10.0).build(&body)
}

fn network_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    format!(
        r#"
      <div class="kpi-card kpi-sm" id="widget-{id}" style="flex-direction:column;">
        <div class="net-row">↓ <span class="green" id="{id}-down">—</span></div>
        <div class="net-row">↑ <span class="blue" id="{id}-up">—</span></div>
      </div>"#
    )
}

fn network_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/network")),
        &format!(
            r#"          document.getElementById('{id}-down').textContent = (data.download || 0) + ' Mbps';
          document.getElementById('{id}-up').textContent = (data.upload || 0) + ' Mbps';"#
        ),
        "          console.error('Network error:', e);",
    );
    Poller::new(*props, "Network Speed", 2.0).build(&body)
}
