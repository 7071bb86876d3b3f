//! Smart home and health widgets.

use serde_json::json;

use super::markup::{fetch_json, kpi_tile, ring_tile, static_behavior, Card, Poller};
use super::props::WidgetProps;
use super::WidgetDescriptor;
use crate::models::WidgetCategory;

pub(super) fn descriptors() -> Vec<WidgetDescriptor> {
    vec![
        WidgetDescriptor::new("sleep-ring", "Sleep Score", "😴", WidgetCategory::Small)
            .description("Displays sleep data from a configured health API endpoint.")
            .size(160, 100)
            .credential("GARMIN_TOKEN")
            .defaults(json!({ "title": "Sleep Score", "refreshInterval": 300 }))
            .render(sleep_markup, sleep_behavior),
        WidgetDescriptor::new("indoor-climate", "Indoor Climate", "🏠", WidgetCategory::Small)
            .description("Shows indoor temperature/humidity from smart home sensors.")
            .size(200, 100)
            .credential("HOME_API")
            .defaults(json!({ "title": "Indoor", "endpoint": "/api/home/climate", "refreshInterval": 60 }))
            .render(climate_markup, climate_behavior),
        WidgetDescriptor::new("camera-feed", "Camera Feed", "📷", WidgetCategory::Large)
            .description("Displays live camera stream from URL.")
            .size(400, 300)
            .credential("CAMERA_URL")
            .defaults(json!({
                "title": "Camera",
                "streamUrl": "http://your-camera/stream",
                "refreshInterval": 0
            }))
            .render(camera_markup, camera_behavior),
        WidgetDescriptor::new("power-usage", "Power Usage", "🔌", WidgetCategory::Small)
            .description("Shows power consumption from smart home integration.")
            .size(180, 100)
            .credential("POWER_API")
            .defaults(json!({ "title": "Power", "endpoint": "/api/home/power", "refreshInterval": 10 }))
            .render(power_markup, power_behavior),
    ]
}

fn sleep_markup(props: &WidgetProps<'_>) -> String {
    ring_tile(props, "var(--accent-green)", "value", r#"<div class="kpi-label">Sleep</div>"#)
}

fn sleep_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let ident = props.ident();
    let preamble = format!(
        r#"      function setSleepScore_{ident}(score) {{
        const circumference = 125.66;
        document.getElementById('{id}-ring').style.strokeDashoffset = circumference - (score / 100) * circumference;
        document.getElementById('{id}-value').textContent = score;
      }}
"#
    );
    let body = fetch_json(
        "'/api/health/sleep'",
        &format!("          setSleepScore_{ident}(data.score || 0);"),
        "          console.error('Sleep score error:', e);",
    );
    Poller::new(*props, "Sleep Ring", 300.0)
        .note("replace the endpoint with your health data source")
        .preamble(preamble)
        .build(&body)
}

fn climate_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    format!(
        r#"
      <div class="kpi-card kpi-sm" id="widget-{id}">
        <div class="kpi-icon">🏠</div>
        <div class="kpi-data">
          <div class="kpi-value" id="{id}-temp">—</div>
          <div class="kpi-label" id="{id}-humidity">💧 —%</div>
        </div>
      </div>"#
    )
}

fn climate_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/home/climate")),
        &format!(
            r#"          document.getElementById('{id}-temp').textContent = (data.temp || 72) + '°F';
          document.getElementById('{id}-humidity').textContent = '💧 ' + (data.humidity || 50) + '%';"#
        ),
        "          console.error('Climate error:', e);",
    );
    Poller::new(*props, "Indoor Climate", 60.0).build(&body)
}

fn camera_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    Card::new(*props, "📷", "Camera").body_class("camera-body").build(&format!(
        r#"          <img id="{id}-feed" src="{src}" alt="Camera feed" style="width:100%;height:100%;object-fit:cover;">"#,
        src = props.html("streamUrl", ""),
    ))
}

/// MJPEG streams refresh on their own; a positive `refreshInterval`
/// reloads snapshot-style feeds.
fn camera_behavior(props: &WidgetProps<'_>) -> String {
    let refresh = props.number("refreshInterval", 0.0);
    if refresh <= 0.0 {
        return static_behavior(
            props,
            "Camera Feed",
            &["Set your camera stream URL in the widget properties"],
        );
    }
    let id = props.js_id();
    let body = format!(
        r#"        const img = document.getElementById('{id}-feed');
        const base = img.src.split('#')[0].split('?t=')[0];
        img.src = base + '?t=' + Date.now();"#
    );
    Poller::new(*props, "Camera Feed", refresh).sync().build(&body)
}

fn power_markup(props: &WidgetProps<'_>) -> String {
    kpi_tile(props, "🔌", "kpi-value orange", "watts", "Current")
}

fn power_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/home/power")),
        &format!("          document.getElementById('{id}-watts').textContent = ((data.watts || 0) / 1000).toFixed(1) + 'kW';"),
        "          console.error('Power error:', e);",
    );
    Poller::new(*props, "Power Usage", 10.0).build(&body)
}

#[cfg(test)]
mod tests {
    use crate::widgets::render_for_test;
    use serde_json::json;

    #[test]
    fn camera_is_static_without_refresh() {
        let (markup, behavior) = render_for_test("camera-feed", json!({ "id": "cam1" }));
        assert!(markup.contains("src=\"http://your-camera/stream\""));
        assert!(!behavior.contains("setInterval"));
    }

    #[test]
    fn camera_reloads_snapshots_when_refresh_set() {
        let (_, behavior) = render_for_test("camera-feed", json!({ "id": "cam1", "refreshInterval": 5 }));
        assert!(behavior.contains("setInterval(update_cam1, 5000);"));
    }

    #[test]
    fn sleep_ring_declares_setter() {
        let (markup, behavior) = render_for_test("sleep-ring", json!({ "id": "s-1" }));
        assert!(markup.contains("id=\"s-1-ring\""));
        assert!(behavior.contains("function setSleepScore_s_1(score)"));
        assert!(behavior.contains("setInterval(update_s_1, 300000);"));
    }
}
