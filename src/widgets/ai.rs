//! AI provider usage, cost and OpenClaw session widgets.

use serde_json::json;

use super::markup::{fetch_json, kpi_tile, Card, Poller};
use super::props::{format_number, WidgetProps};
use super::WidgetDescriptor;
use crate::models::WidgetCategory;

struct Provider {
    type_id: &'static str,
    name: &'static str,
    icon: &'static str,
    color: &'static str,
    credential: &'static str,
    vendor: &'static str,
    endpoint: &'static str,
    toggle: &'static str,
}

const PROVIDERS: [Provider; 3] = [
    Provider {
        type_id: "ai-usage-claude",
        name: "Claude",
        icon: "🟣",
        color: "#a371f7",
        credential: "ANTHROPIC_API_KEY",
        vendor: "Anthropic Claude",
        endpoint: "/api/usage/claude",
        toggle: "showClaude",
    },
    Provider {
        type_id: "ai-usage-openai",
        name: "GPT",
        icon: "🟢",
        color: "#3fb950",
        credential: "OPENAI_API_KEY",
        vendor: "OpenAI GPT",
        endpoint: "/api/usage/openai",
        toggle: "showOpenAI",
    },
    Provider {
        type_id: "ai-usage-gemini",
        name: "Gemini",
        icon: "🔵",
        color: "#58a6ff",
        credential: "GEMINI_API_KEY",
        vendor: "Google Gemini",
        endpoint: "/api/usage/gemini",
        toggle: "showGemini",
    },
];

fn provider(type_id: &str) -> &'static Provider {
    PROVIDERS
        .iter()
        .find(|provider| provider.type_id == type_id)
        .unwrap_or(&PROVIDERS[0])
}

pub(super) fn descriptors() -> Vec<WidgetDescriptor> {
    let usage = |provider: &Provider, markup: super::RenderFn, behavior: super::RenderFn| {
        WidgetDescriptor::new(
            provider.type_id,
            format!("{} Usage", provider.name),
            provider.icon,
            WidgetCategory::Small,
        )
        .description(format!(
            "Shows {} API usage stats. Requires usage API proxy.",
            provider.vendor
        ))
        .size(220, 120)
        .credential(provider.credential)
        .defaults(json!({ "title": provider.name, "refreshInterval": 300 }))
        .render(markup, behavior)
    };

    vec![
        usage(&PROVIDERS[0], claude_markup, claude_behavior),
        usage(&PROVIDERS[1], openai_markup, openai_behavior),
        usage(&PROVIDERS[2], gemini_markup, gemini_behavior),
        WidgetDescriptor::new("ai-usage-multi", "AI Usage (All)", "🤖", WidgetCategory::Large)
            .description("Combined view of Claude, GPT, and Gemini usage in one widget.")
            .size(400, 280)
            .credential("Multiple (see below)")
            .defaults(json!({
                "title": "AI Usage",
                "showClaude": true,
                "showOpenAI": true,
                "showGemini": true,
                "refreshInterval": 300
            }))
            .render(multi_markup, multi_behavior),
        WidgetDescriptor::new("ai-cost-tracker", "AI Cost Tracker", "💰", WidgetCategory::Small)
            .description("Tracks total AI API spending across providers.")
            .size(200, 100)
            .credential("OPENCLAW_API")
            .defaults(json!({
                "title": "AI Costs",
                "period": "today",
                "endpoint": "/api/costs",
                "refreshInterval": 300
            }))
            .render(cost_markup, cost_behavior),
        WidgetDescriptor::new("api-status", "API Status", "🔄", WidgetCategory::Large)
            .description("Shows health status of multiple API endpoints with colored indicators.")
            .size(350, 200)
            .defaults(json!({
                "title": "API Status",
                "services": "OpenAI,Anthropic,Google,OpenClaw",
                "refreshInterval": 60
            }))
            .render(api_status_markup, api_status_behavior),
        WidgetDescriptor::new("session-count", "Active Sessions", "💬", WidgetCategory::Small)
            .description("Shows count of active OpenClaw sessions.")
            .size(160, 100)
            .credential("OPENCLAW_API")
            .defaults(json!({ "title": "Sessions", "endpoint": "/api/sessions", "refreshInterval": 30 }))
            .render(session_markup, session_behavior),
        WidgetDescriptor::new("token-gauge", "Token Gauge", "📊", WidgetCategory::Small)
            .description("Visual gauge showing token usage from OpenClaw.")
            .size(180, 120)
            .credential("OPENCLAW_API")
            .defaults(json!({
                "title": "Tokens",
                "maxTokens": 1000000,
                "endpoint": "/api/usage/tokens",
                "refreshInterval": 60
            }))
            .render(token_gauge_markup, token_gauge_behavior),
    ]
}

fn usage_markup(props: &WidgetProps<'_>, provider: &Provider) -> String {
    let id = props.dom_id();
    format!(
        r#"
      <div class="kpi-card kpi-sm" id="widget-{id}" style="flex-direction:column;text-align:center;">
        <div style="color:{color};font-size:12px;font-weight:600;">{icon} {title}</div>
        <div class="kpi-value" id="{id}-tokens">—</div>
        <div class="kpi-label" id="{id}-cost">tokens today</div>
      </div>"#,
        color = provider.color,
        icon = provider.icon,
        title = props.html("title", provider.name),
    )
}

fn usage_behavior(props: &WidgetProps<'_>, provider: &Provider, label: &'static str) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", provider.endpoint),
        &format!(
            r#"          document.getElementById('{id}-tokens').textContent = ((data.tokens || 0) / 1000).toFixed(1) + 'K';
          if (data.cost) {{
            document.getElementById('{id}-cost').textContent = '$' + data.cost.toFixed(2) + ' today';
          }}"#
        ),
        &format!(
            r#"          document.getElementById('{id}-tokens').textContent = '—';
          document.getElementById('{id}-cost').textContent = 'Configure endpoint';"#
        ),
    );
    Poller::new(*props, label, 300.0)
        .note("requires a backend proxy, provider APIs block browser CORS")
        .build(&body)
}

fn claude_markup(props: &WidgetProps<'_>) -> String {
    usage_markup(props, provider("ai-usage-claude"))
}

fn claude_behavior(props: &WidgetProps<'_>) -> String {
    usage_behavior(props, provider("ai-usage-claude"), "Claude Usage")
}

fn openai_markup(props: &WidgetProps<'_>) -> String {
    usage_markup(props, provider("ai-usage-openai"))
}

fn openai_behavior(props: &WidgetProps<'_>) -> String {
    usage_behavior(props, provider("ai-usage-openai"), "GPT Usage")
}

fn gemini_markup(props: &WidgetProps<'_>) -> String {
    usage_markup(props, provider("ai-usage-gemini"))
}

fn gemini_behavior(props: &WidgetProps<'_>) -> String {
    usage_behavior(props, provider("ai-usage-gemini"), "Gemini Usage")
}

fn multi_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "🤖", "AI Usage")
        .body_id("usage")
        .build(r#"          <div class="usage-row"><span>Loading...</span></div>"#)
}

fn multi_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let services: Vec<String> = PROVIDERS
        .iter()
        .filter(|provider| props.enabled(provider.toggle))
        .map(|provider| {
            format!(
                "          {{ name: '{}', icon: '{}', color: '{}', endpoint: '{}' }},",
                provider.name, provider.icon, provider.color, provider.endpoint
            )
        })
        .collect();
    let body = format!(
        r#"        const container = document.getElementById('{id}-usage');
        const services = [
{services}
        ];
        const results = await Promise.all(services.map(async (svc) => {{
          try {{
            const res = await fetch(svc.endpoint);
            const data = await res.json();
            return {{ ...svc, tokens: data.tokens || 0, cost: data.cost || 0 }};
          }} catch (e) {{
            return {{ ...svc, tokens: 0, cost: 0, error: true }};
          }}
        }}));
        container.innerHTML = results.map(r => {{
          const tokensStr = r.error ? '—' : ((r.tokens / 1000).toFixed(1) + 'K');
          const costStr = r.cost ? ' · $' + r.cost.toFixed(2) : '';
          return '<div class="usage-row"><span style="color:' + r.color + '">' + r.icon + ' ' + r.name + '</span><span class="usage-tokens">' + tokensStr + costStr + '</span></div>';
        }}).join('');"#,
        services = services.join("\n"),
    );
    Poller::new(*props, "AI Usage Multi", 300.0)
        .note("keys: ANTHROPIC_API_KEY, OPENAI_API_KEY, GEMINI_API_KEY")
        .build(&body)
}

fn cost_markup(props: &WidgetProps<'_>) -> String {
    kpi_tile(props, "💰", "kpi-value green", "cost", &props.html("period", "Today"))
}

fn cost_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!(
            "'{}?period={}'",
            props.js("endpoint", "/api/costs"),
            props.js("period", "today")
        ),
        &format!("          document.getElementById('{id}-cost').textContent = '$' + (data.cost || 0).toFixed(2);"),
        &format!("          document.getElementById('{id}-cost').textContent = '$—';"),
    );
    Poller::new(*props, "AI Cost Tracker", 300.0).build(&body)
}

fn api_status_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "🔄", "API Status")
        .body_id("status")
        .build(r#"          <div class="status-row">🟡 Checking...</div>"#)
}

fn api_status_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let ident = props.ident();
    let preamble = format!(
        r#"      const services_{ident} = '{services}'.split(',').map(s => s.trim()).filter(Boolean);
      const endpoints_{ident} = {{
        'OpenAI': 'https://status.openai.com/api/v2/status.json',
        'Anthropic': 'https://status.anthropic.com/api/v2/status.json',
        'Google': 'https://status.cloud.google.com/',
        'OpenClaw': '/api/status'
      }};
"#,
        services = props.js("services", "OpenAI,Anthropic"),
    );
    let body = format!(
        r#"        const container = document.getElementById('{id}-status');
        const results = await Promise.all(services_{ident}.map(async (name) => {{
          try {{
            const endpoint = endpoints_{ident}[name] || '/api/health/' + name.toLowerCase();
            await fetch(endpoint, {{ mode: 'no-cors' }});
            return {{ name, status: 'ok' }};
          }} catch (e) {{
            return {{ name, status: 'unknown' }};
          }}
        }}));
        container.innerHTML = results.map(r => {{
          const icon = r.status === 'ok' ? '🟢' : r.status === 'error' ? '🔴' : '🟡';
          return '<div class="status-row">' + icon + ' ' + r.name + '</div>';
        }}).join('');"#
    );
    Poller::new(*props, "API Status", 60.0).preamble(preamble).build(&body)
}

fn session_markup(props: &WidgetProps<'_>) -> String {
    kpi_tile(props, "💬", "kpi-value blue", "count", "Active")
}

fn session_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/sessions")),
        &format!("          document.getElementById('{id}-count').textContent = data.active || data.length || 0;"),
        &format!("          document.getElementById('{id}-count').textContent = '—';"),
    );
    Poller::new(*props, "Session Count", 30.0).build(&body)
}

fn token_gauge_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    let max_millions = props.number("maxTokens", 1_000_000.0) / 1_000_000.0;
    format!(
        r#"
      <div class="kpi-card kpi-sm" id="widget-{id}" style="flex-direction:column;text-align:center;">
        <div class="kpi-value" id="{id}-value">—</div>
        <div class="gauge-bar"><div class="gauge-fill" id="{id}-fill"></div></div>
        <div class="kpi-label">of {max_millions:.1}M limit</div>
      </div>"#
    )
}

fn token_gauge_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/usage/tokens")),
        &format!(
            r#"          const tokens = data.tokens || 0;
          const pct = Math.min(100, (tokens / {max}) * 100);
          document.getElementById('{id}-value').textContent = (tokens / 1000).toFixed(0) + 'K';
          document.getElementById('{id}-fill').style.width = pct + '%';"#,
            max = format_number(props.number("maxTokens", 1_000_000.0)),
        ),
        &format!("          document.getElementById('{id}-value').textContent = '—';"),
    );
    Poller::new(*props, "Token Gauge", 60.0).build(&body)
}
