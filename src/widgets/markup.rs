//! Shared markup and behaviour fragments used by the built-in widgets.

use super::props::WidgetProps;

/// The standard titled card: head with icon and title, body below.
pub struct Card<'p> {
    props: WidgetProps<'p>,
    icon: &'static str,
    title: String,
    badge: bool,
    body_id: Option<&'static str>,
    body_class: &'static str,
    body_style: &'static str,
}

impl<'p> Card<'p> {
    pub fn new(props: WidgetProps<'p>, icon: &'static str, fallback_title: &str) -> Self {
        let title = props.html("title", fallback_title);
        Self::titled(props, icon, title)
    }

    /// Card whose head text is not the `title` property. `title` must be escaped.
    pub fn titled(props: WidgetProps<'p>, icon: &'static str, title: String) -> Self {
        Self {
            props,
            icon,
            title,
            badge: false,
            body_id: None,
            body_class: "",
            body_style: "",
        }
    }

    pub fn badge(mut self) -> Self {
        self.badge = true;
        self
    }

    pub fn body_id(mut self, suffix: &'static str) -> Self {
        self.body_id = Some(suffix);
        self
    }

    pub fn body_class(mut self, class: &'static str) -> Self {
        self.body_class = class;
        self
    }

    pub fn body_style(mut self, style: &'static str) -> Self {
        self.body_style = style;
        self
    }

    pub fn build(self, inner: &str) -> String {
        let id = self.props.dom_id();
        let badge = if self.badge {
            format!("\n          <span class=\"dash-card-badge\" id=\"{}-badge\">—</span>", id)
        } else {
            String::new()
        };
        let class = if self.body_class.is_empty() {
            "dash-card-body".to_string()
        } else {
            format!("dash-card-body {}", self.body_class)
        };
        let body_id = self
            .body_id
            .map(|suffix| format!(" id=\"{}-{}\"", id, suffix))
            .unwrap_or_default();
        let body_style = if self.body_style.is_empty() {
            String::new()
        } else {
            format!(" style=\"{}\"", self.body_style)
        };

        format!(
            r#"
      <div class="dash-card" id="widget-{id}" style="height:100%;">
        <div class="dash-card-head">
          <span class="dash-card-title">{icon} {title}</span>{badge}
        </div>
        <div class="{class}"{body_id}{body_style}>
{inner}
        </div>
      </div>"#,
            id = id,
            icon = self.icon,
            title = self.title,
            badge = badge,
            class = class,
            body_id = body_id,
            body_style = body_style,
            inner = inner,
        )
    }
}

pub const CENTERED_COLUMN: &str = "display:flex;flex-direction:column;align-items:center;justify-content:center;";
pub const CENTERED_ROW: &str = "display:flex;align-items:center;justify-content:center;gap:10px;";
pub const IMAGE_BODY: &str =
    "padding:0;overflow:hidden;display:flex;align-items:center;justify-content:center;background:var(--bg-tertiary);";

/// Compact KPI tile with an icon and a single value.
pub fn kpi_tile(props: &WidgetProps<'_>, icon: &str, value_class: &str, value_suffix: &str, label: &str) -> String {
    let id = props.dom_id();
    format!(
        r#"
      <div class="kpi-card kpi-sm" id="widget-{id}">
        <div class="kpi-icon">{icon}</div>
        <div class="kpi-data">
          <div class="{value_class}" id="{id}-{value_suffix}">—</div>
          <div class="kpi-label">{label}</div>
        </div>
      </div>"#,
    )
}

/// Progress ring used by the sleep and disk widgets.
pub fn ring_tile(props: &WidgetProps<'_>, stroke: &str, value_suffix: &str, label_html: &str) -> String {
    let id = props.dom_id();
    format!(
        r#"
      <div class="kpi-card kpi-sm" id="widget-{id}">
        <div class="kpi-ring-wrap kpi-ring-sm">
          <svg class="kpi-ring" viewBox="0 0 48 48">
            <circle cx="24" cy="24" r="20" fill="none" stroke="var(--bg-tertiary)" stroke-width="4"/>
            <circle id="{id}-ring" cx="24" cy="24" r="20" fill="none" stroke="{stroke}" stroke-width="4"
              stroke-dasharray="125.66" stroke-dashoffset="125.66" stroke-linecap="round"
              transform="rotate(-90 24 24)" style="transition: stroke-dashoffset 0.6s ease;"/>
          </svg>
          <div class="kpi-ring-label" id="{id}-{value_suffix}">—</div>
        </div>
        <div class="kpi-data">
          {label_html}
        </div>
      </div>"#,
    )
}

/// Scrolling ticker strip used by bar widgets.
pub fn ticker_strip(props: &WidgetProps<'_>, icon: &str, loading: &str) -> String {
    let id = props.dom_id();
    format!(
        r#"
      <section class="news-ticker-wrap" id="widget-{id}">
        <span class="ticker-label">{icon}</span>
        <div class="ticker-track">
          <div class="ticker-content" id="{id}-ticker">{loading}</div>
        </div>
      </section>"#,
    )
}

/// Behaviour that polls on a timer: an update function named after the
/// instance, one immediate call and a `setInterval`.
pub struct Poller<'p> {
    props: WidgetProps<'p>,
    label: &'static str,
    note: Option<&'static str>,
    function_prefix: &'static str,
    preamble: String,
    is_async: bool,
    period_ms: String,
}

impl<'p> Poller<'p> {
    pub fn new(props: WidgetProps<'p>, label: &'static str, fallback_secs: f64) -> Self {
        Self {
            props,
            label,
            note: None,
            function_prefix: "update",
            preamble: String::new(),
            is_async: true,
            period_ms: props.interval_ms(fallback_secs),
        }
    }

    pub fn note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    pub fn function_prefix(mut self, prefix: &'static str) -> Self {
        self.function_prefix = prefix;
        self
    }

    /// Declarations emitted before the update function.
    pub fn preamble(mut self, preamble: String) -> Self {
        self.preamble = preamble;
        self
    }

    pub fn sync(mut self) -> Self {
        self.is_async = false;
        self
    }

    pub fn period_ms(mut self, period_ms: impl Into<String>) -> Self {
        self.period_ms = period_ms.into();
        self
    }

    pub fn build(self, body: &str) -> String {
        let name = format!("{}_{}", self.function_prefix, self.props.ident());
        let note = self.note.map(|note| format!(" ({})", note)).unwrap_or_default();
        let keyword = if self.is_async { "async function" } else { "function" };
        format!(
            "\n      // {label} Widget: {id}{note}\n{preamble}      {keyword} {name}() {{\n{body}\n      }}\n      {name}();\n      setInterval({name}, {period});\n    ",
            label = self.label,
            id = self.props.js_id(),
            note = note,
            preamble = self.preamble,
            keyword = keyword,
            name = name,
            body = body.trim_end(),
            period = self.period_ms,
        )
    }

    /// Same as [`Poller::build`] without the timer: run once on mount.
    pub fn build_once(self, body: &str) -> String {
        let name = format!("{}_{}", self.function_prefix, self.props.ident());
        let keyword = if self.is_async { "async function" } else { "function" };
        format!(
            "\n      // {label} Widget: {id}\n{preamble}      {keyword} {name}() {{\n{body}\n      }}\n      {name}();\n    ",
            label = self.label,
            id = self.props.js_id(),
            preamble = self.preamble,
            keyword = keyword,
            name = name,
            body = body.trim_end(),
        )
    }
}

/// Fetch-and-update body: `fetch(url)` into `data`, then `on_data`,
/// with `on_error` in the catch arm.
pub fn fetch_json(url_expr: &str, on_data: &str, on_error: &str) -> String {
    format!(
        "        try {{\n          const res = await fetch({url_expr});\n          const data = await res.json();\n{on_data}\n        }} catch (e) {{\n{on_error}\n        }}",
        url_expr = url_expr,
        on_data = on_data.trim_end(),
        on_error = on_error.trim_end(),
    )
}

/// Behaviour for widgets with nothing to run.
pub fn static_behavior(props: &WidgetProps<'_>, label: &str, notes: &[&str]) -> String {
    let mut lines = vec![format!("      // {} Widget: {}", label, props.js_id())];
    lines.extend(notes.iter().map(|note| format!("      // {}", note)));
    format!("\n{}\n    ", lines.join("\n"))
}
