//! Clocks and timers. These run entirely client side.

use serde_json::json;

use super::markup::{Card, Poller, CENTERED_COLUMN};
use super::props::{format_number, WidgetProps};
use super::WidgetDescriptor;
use crate::models::WidgetCategory;

pub(super) fn descriptors() -> Vec<WidgetDescriptor> {
    vec![
        WidgetDescriptor::new("clock", "Clock", "🕐", WidgetCategory::Small)
            .description("Simple digital clock. Supports 12h or 24h format.")
            .size(200, 120)
            .defaults(json!({ "title": "Clock", "timezone": "local", "format24h": false }))
            .render(clock_markup, clock_behavior),
        WidgetDescriptor::new("world-clock", "World Clock", "🌍", WidgetCategory::Large)
            .description("Shows current time in multiple cities side-by-side.")
            .size(300, 180)
            .defaults(json!({
                "title": "World Clock",
                "locations": "New York; London; Tokyo",
                "format24h": false,
                "refreshInterval": 60
            }))
            .render(world_clock_markup, world_clock_behavior),
        WidgetDescriptor::new("countdown", "Countdown", "⏳", WidgetCategory::Small)
            .description("Counts down days (and optionally hours/minutes) to a target date.")
            .size(220, 120)
            .defaults(json!({
                "title": "Countdown",
                "targetDate": "2025-12-31",
                "showHours": false,
                "showMinutes": false
            }))
            .render(countdown_markup, countdown_behavior),
        WidgetDescriptor::new("pomodoro", "Pomodoro Timer", "🎯", WidgetCategory::Small)
            .description("Focus timer with configurable work/break intervals. Plays sound when done.")
            .size(200, 140)
            .defaults(json!({ "title": "Focus", "workMinutes": 25, "breakMinutes": 5 }))
            .render(pomodoro_markup, pomodoro_behavior),
    ]
}

fn clock_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    Card::new(*props, "🕐", "Clock").body_style(CENTERED_COLUMN).build(&format!(
        r#"          <div class="kpi-value" id="{id}-time">—</div>
          <div class="kpi-label" id="{id}-date">—</div>"#
    ))
}

fn clock_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let timezone = props.text("timezone", "local");
    let zone = if timezone == "local" {
        String::new()
    } else {
        format!(", timeZone: '{}'", super::props::escape_js(&timezone))
    };
    let body = format!(
        r#"        const now = new Date();
        const opts = {{ hour: 'numeric', minute: '2-digit', hour12: {hour12}{zone} }};
        document.getElementById('{id}-time').textContent = now.toLocaleTimeString('en-US', opts);
        document.getElementById('{id}-date').textContent = now.toLocaleDateString('en-US', {{ weekday: 'short', month: 'short', day: 'numeric'{zone} }});"#,
        hour12 = !props.flag("format24h"),
    );
    Poller::new(*props, "Clock", 1.0)
        .function_prefix("updateClock")
        .sync()
        .period_ms("1000")
        .build(&body)
}

fn world_clock_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "🌍", "World Clock")
        .body_id("clocks")
        .build(r#"          <div style="color:#8b949e;font-size:12px;">Loading times...</div>"#)
}

fn world_clock_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let ident = props.ident();
    let preamble = format!(
        "      const locs_{ident} = '{locations}'.split(';').map(s => s.trim()).filter(Boolean);\n      const hour12_{ident} = {hour12};\n",
        locations = props.js("locations", "New York; London; Tokyo"),
        hour12 = !props.flag("format24h"),
    );
    let body = format!(
        r#"        const container = document.getElementById('{id}-clocks');
        const results = await Promise.all(locs_{ident}.map(async (loc) => {{
          try {{
            const res = await fetch('https://wttr.in/' + encodeURIComponent(loc) + '?format=j1');
            const data = await res.json();
            const city = data.nearest_area[0].areaName[0].value;
            const timePart = data.current_condition[0].localObsDateTime.split(' ').slice(1).join(' ');
            let displayTime = timePart;
            if (!hour12_{ident}) {{
              const d = new Date('2000-01-01 ' + timePart);
              displayTime = d.toLocaleTimeString('en-GB', {{ hour: '2-digit', minute: '2-digit' }});
            }}
            return {{ city, time: displayTime }};
          }} catch (e) {{
            return {{ city: loc, time: '—' }};
          }}
        }}));
        container.innerHTML = results.map(r =>
          '<div class="tz-row"><span class="tz-city">' + r.city + '</span><span class="tz-time">' + r.time + '</span></div>'
        ).join('');"#
    );
    Poller::new(*props, "World Clock", 60.0)
        .note("uses wttr.in for timezone data")
        .preamble(preamble)
        .build(&body)
}

fn countdown_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    Card::new(*props, "⏳", "Countdown").body_style(CENTERED_COLUMN).build(&format!(
        r#"          <div class="kpi-value" id="{id}-countdown">—</div>
          <div class="kpi-label" id="{id}-date">{date}</div>"#,
        date = props.html("targetDate", ""),
    ))
}

fn countdown_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let show_minutes = props.flag("showMinutes");
    let mut parts = vec!["        parts.push(days + 'd');"];
    if props.flag("showHours") {
        parts.push("        parts.push(hours + 'h');");
    }
    if show_minutes {
        parts.push("        parts.push(minutes + 'm');");
    }
    let body = format!(
        r#"        const target = new Date('{target}T00:00:00');
        const diff = target - new Date();
        const el = document.getElementById('{id}-countdown');
        if (diff <= 0) {{
          el.textContent = 'Today!';
          return;
        }}
        const days = Math.floor(diff / (1000 * 60 * 60 * 24));
        const hours = Math.floor((diff % (1000 * 60 * 60 * 24)) / (1000 * 60 * 60));
        const minutes = Math.floor((diff % (1000 * 60 * 60)) / (1000 * 60));
        const parts = [];
{parts}
        el.textContent = parts.join(' ');"#,
        target = props.js("targetDate", "2025-12-31"),
        parts = parts.join("\n"),
    );
    Poller::new(*props, "Countdown", 60.0)
        .sync()
        .period_ms(if show_minutes { "1000" } else { "60000" })
        .build(&body)
}

fn pomodoro_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    Card::new(*props, "🎯", "Focus")
        .body_style("display:flex;flex-direction:column;align-items:center;justify-content:center;gap:8px;")
        .build(&format!(
            r#"          <div class="kpi-value" id="{id}-time">{minutes}:00</div>
          <button class="pomo-btn" id="{id}-btn" onclick="togglePomo_{ident}()">▶️ Start</button>"#,
            minutes = format_number(props.number("workMinutes", 25.0)),
            ident = props.ident(),
        ))
}

fn pomodoro_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let ident = props.ident();
    let work = format_number(props.number("workMinutes", 25.0) * 60.0);
    let rest = format_number(props.number("breakMinutes", 5.0) * 60.0);
    format!(
        r#"
      // Pomodoro Widget: {id}
      let pomoRunning_{ident} = false;
      let pomoSeconds_{ident} = {work};
      let pomoInterval_{ident};
      let pomoIsBreak_{ident} = false;
      let pomoAudioCtx_{ident} = null;

      function playPomoSound_{ident}() {{
        try {{
          if (!pomoAudioCtx_{ident}) {{
            pomoAudioCtx_{ident} = new (window.AudioContext || window.webkitAudioContext)();
          }}
          const ctx = pomoAudioCtx_{ident};
          if (ctx.state === 'suspended') ctx.resume();
          const now = ctx.currentTime;
          [0, 0.4, 0.8].forEach((delay, i) => {{
            const osc = ctx.createOscillator();
            const gain = ctx.createGain();
            osc.connect(gain);
            gain.connect(ctx.destination);
            osc.frequency.value = i === 2 ? 1000 : 800;
            osc.type = 'sine';
            gain.gain.setValueAtTime(0.3, now + delay);
            gain.gain.exponentialRampToValueAtTime(0.01, now + delay + 0.3);
            osc.start(now + delay);
            osc.stop(now + delay + 0.3);
          }});
        }} catch (e) {{ console.log('Audio not supported:', e); }}
      }}

      function togglePomo_{ident}() {{
        const btn = document.getElementById('{id}-btn');
        const timeEl = document.getElementById('{id}-time');
        if (!pomoAudioCtx_{ident}) {{
          pomoAudioCtx_{ident} = new (window.AudioContext || window.webkitAudioContext)();
        }}
        if (pomoRunning_{ident}) {{
          clearInterval(pomoInterval_{ident});
          btn.textContent = '▶️ Start';
        }} else {{
          if (timeEl.textContent === 'Done!' || timeEl.textContent === 'Break!') {{
            pomoIsBreak_{ident} = !pomoIsBreak_{ident};
            pomoSeconds_{ident} = pomoIsBreak_{ident} ? {rest} : {work};
          }}
          pomoInterval_{ident} = setInterval(() => {{
            pomoSeconds_{ident}--;
            if (pomoSeconds_{ident} <= 0) {{
              clearInterval(pomoInterval_{ident});
              playPomoSound_{ident}();
              timeEl.textContent = pomoIsBreak_{ident} ? 'Done!' : 'Break!';
              btn.textContent = pomoIsBreak_{ident} ? '🔄 Reset' : '☕ Break';
              pomoRunning_{ident} = false;
              return;
            }}
            const m = Math.floor(pomoSeconds_{ident} / 60);
            const s = pomoSeconds_{ident} % 60;
            timeEl.textContent = m + ':' + (s < 10 ? '0' : '') + s;
          }}, 1000);
          btn.textContent = '⏸️ Pause';
        }}
        pomoRunning_{ident} = !pomoRunning_{ident};
      }}
    "#
    )
}
