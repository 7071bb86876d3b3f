//! Weather widgets backed by wttr.in (no key required).

use serde_json::json;

use super::markup::{Card, Poller, CENTERED_ROW};
use super::props::WidgetProps;
use super::WidgetDescriptor;
use crate::models::WidgetCategory;

const CONDITION_ICON: &str = r#"          const code = parseInt(current.weatherCode);
          let icon = '🌡️';
          if (code === 113) icon = '☀️';
          else if (code === 116 || code === 119) icon = '⛅';
          else if (code >= 176 && code <= 359) icon = '🌧️';
          else if (code >= 368 && code <= 395) icon = '❄️';"#;

pub(super) fn descriptors() -> Vec<WidgetDescriptor> {
    vec![
        WidgetDescriptor::new("weather", "Local Weather", "🌡️", WidgetCategory::Small)
            .description("Shows current weather for a single location using wttr.in (no API key needed).")
            .size(200, 120)
            .defaults(json!({
                "title": "Local Weather",
                "location": "Atlanta",
                "units": "F",
                "refreshInterval": 600
            }))
            .render(local_markup, local_behavior),
        WidgetDescriptor::new("weather-multi", "World Weather", "🌍", WidgetCategory::Large)
            .description("Shows weather for multiple locations side-by-side. Separate cities with semicolons.")
            .size(350, 200)
            .defaults(json!({
                "title": "World Weather",
                "locations": "New York; London; Tokyo",
                "units": "F",
                "refreshInterval": 600
            }))
            .render(multi_markup, multi_behavior),
    ]
}

fn celsius(props: &WidgetProps<'_>) -> bool {
    props.text("units", "F") == "C"
}

fn local_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    Card::new(*props, "🌡️", "Local Weather")
        .body_style(CENTERED_ROW)
        .build(&format!(
            r#"          <span id="{id}-icon" style="font-size:24px;">🌡️</span>
          <div>
            <div class="kpi-value blue" id="{id}-value">—</div>
            <div class="kpi-label" id="{id}-label">{location}</div>
          </div>"#,
            location = props.html("location", "Location"),
        ))
}

fn local_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let (temp_field, unit) = if celsius(props) { ("temp_C", "°C") } else { ("temp_F", "°F") };
    let body = format!(
        r#"        try {{
          const location = encodeURIComponent('{location}');
          const res = await fetch('https://wttr.in/' + location + '?format=j1');
          const data = await res.json();
          const current = data.current_condition[0];
          document.getElementById('{id}-value').textContent = current.{temp_field} + '{unit}';
          document.getElementById('{id}-label').textContent = current.weatherDesc[0].value;
{icon}
          document.getElementById('{id}-icon').textContent = icon;
        }} catch (e) {{
          console.error('Weather error:', e);
          document.getElementById('{id}-value').textContent = 'N/A';
        }}"#,
        location = props.js("location", "Atlanta"),
        icon = CONDITION_ICON,
    );
    Poller::new(*props, "Weather", 600.0)
        .note("uses free wttr.in API - no key needed")
        .build(&body)
}

fn multi_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "🌍", "World Weather")
        .body_id("list")
        .build(r#"          <div class="weather-row"><span class="weather-icon">⏳</span><span class="weather-loc">Loading...</span></div>"#)
}

fn multi_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let (temp_field, unit) = if celsius(props) { ("temp_C", "°C") } else { ("temp_F", "°F") };
    let body = format!(
        r#"        const locations = '{locations}'.split(';').map(l => l.trim()).filter(Boolean);
        const container = document.getElementById('{id}-list');
        const results = await Promise.all(locations.map(async (loc) => {{
          try {{
            const res = await fetch('https://wttr.in/' + encodeURIComponent(loc) + '?format=j1');
            const data = await res.json();
            const current = data.current_condition[0];
{icon}
            return {{ loc, temp: current.{temp_field} + '{unit}', icon }};
          }} catch (e) {{
            return {{ loc, temp: 'N/A', icon: '❓' }};
          }}
        }}));
        container.innerHTML = results.map(r =>
          '<div class="weather-row"><span class="weather-icon">' + r.icon + '</span><span class="weather-loc">' + r.loc + '</span><span class="weather-temp">' + r.temp + '</span></div>'
        ).join('');"#,
        locations = props.js("locations", "New York; London; Tokyo"),
        icon = CONDITION_ICON,
    );
    Poller::new(*props, "Multi Weather", 600.0)
        .note("uses free wttr.in API - no key needed")
        .build(&body)
}

#[cfg(test)]
mod tests {
    use crate::widgets::render_for_test;
    use serde_json::json;

    #[test]
    fn local_weather_uses_units_and_escapes_location() {
        let (markup, behavior) =
            render_for_test("weather", json!({ "id": "w1", "units": "C", "location": "O'Hare <IL>" }));
        assert!(markup.contains("O&#39;Hare &lt;IL&gt;"));
        assert!(behavior.contains("current.temp_C + '°C'"));
        assert!(behavior.contains("encodeURIComponent('O\\'Hare \\x3CIL>')"));
        assert!(behavior.contains("setInterval(update_w1, 600000);"));
    }

    #[test]
    fn multi_weather_splits_locations_client_side() {
        let (markup, behavior) = render_for_test("weather-multi", json!({ "id": "w2", "refreshInterval": 60 }));
        assert!(markup.contains("id=\"w2-list\""));
        assert!(behavior.contains("'New York; London; Tokyo'.split(';')"));
        assert!(behavior.contains("current.temp_F + '°F'"));
        assert!(behavior.contains("setInterval(update_w2, 60000);"));
    }
}
