//! Calendar, notes, tasks, mail, GitHub, quotes and link widgets.

use serde_json::json;

use super::markup::{fetch_json, kpi_tile, static_behavior, Card, Poller};
use super::props::{escape_js, format_number, WidgetProps};
use super::WidgetDescriptor;
use crate::models::WidgetCategory;

pub(super) fn descriptors() -> Vec<WidgetDescriptor> {
    vec![
        WidgetDescriptor::new("calendar", "Calendar", "📅", WidgetCategory::Large)
            .description("Displays upcoming calendar events. Requires calendar API endpoint.")
            .size(400, 300)
            .credential("CALENDAR_API_KEY")
            .defaults(json!({
                "title": "Calendar",
                "calendarId": "primary",
                "maxEvents": 5,
                "refreshInterval": 300
            }))
            .render(calendar_markup, calendar_behavior),
        WidgetDescriptor::new("notes", "Notes", "📝", WidgetCategory::Large)
            .description("Simple note-taking widget. Requires storage backend.")
            .size(350, 250)
            .defaults(json!({ "title": "Notes", "content": "Your notes here..." }))
            .render(notes_markup, notes_behavior),
        WidgetDescriptor::new("todo-list", "Todo List", "✅", WidgetCategory::Large)
            .description("Task list with checkboxes. Requires storage backend.")
            .size(350, 300)
            .defaults(json!({ "title": "Todo", "items": "Task 1,Task 2,Task 3" }))
            .render(todo_markup, todo_behavior),
        WidgetDescriptor::new("email-count", "Unread Emails", "📧", WidgetCategory::Small)
            .description("Shows unread email count. Requires email API proxy.")
            .size(160, 100)
            .credential("EMAIL_API")
            .defaults(json!({ "title": "Email", "endpoint": "/api/email/unread", "refreshInterval": 120 }))
            .render(email_markup, email_behavior),
        WidgetDescriptor::new("github-stats", "GitHub Stats", "🐙", WidgetCategory::Large)
            .description("Shows GitHub user/repo stats. Optional token for higher rate limits.")
            .size(380, 200)
            .credential("GITHUB_TOKEN")
            .defaults(json!({ "title": "GitHub", "username": "your-username", "refreshInterval": 300 }))
            .render(github_markup, github_behavior),
        WidgetDescriptor::new("quote-of-day", "Quote of Day", "💭", WidgetCategory::Large)
            .description("Displays daily inspirational quote from public API.")
            .size(400, 150)
            .defaults(json!({ "title": "Quote", "category": "inspire", "refreshInterval": 3600 }))
            .render(quote_markup, quote_behavior),
        WidgetDescriptor::new("quick-links", "Quick Links", "🔗", WidgetCategory::Large)
            .description("Grid of clickable links with auto-fetched favicons.")
            .size(300, 200)
            .defaults(json!({ "title": "Quick Links", "links": [] }))
            .render(links_markup, links_behavior),
    ]
}

fn calendar_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "📅", "Calendar")
        .body_id("events")
        .build(r#"          <div class="event-item">Loading events...</div>"#)
}

fn calendar_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!(
            "'/api/calendar?calendarId=' + encodeURIComponent('{}')",
            props.js("calendarId", "primary")
        ),
        &format!(
            r#"          const events = (data.events || []).slice(0, {max});
          document.getElementById('{id}-events').innerHTML = events.length
            ? events.map(ev => '<div class="event-item">📅 ' + ev.title + ' — ' + ev.time + '</div>').join('')
            : '<div class="event-item">No upcoming events</div>';"#,
            max = format_number(props.number("maxEvents", 5.0)),
        ),
        &format!(
            "          document.getElementById('{id}-events').innerHTML = '<div class=\"event-item\">Configure your calendar API</div>';"
        ),
    );
    Poller::new(*props, "Calendar", 300.0)
        .note("requires a calendar API proxy")
        .build(&body)
}

fn notes_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    Card::new(*props, "📝", "Notes").build(&format!(
        r#"          <div id="{id}-content" contenteditable="true" style="white-space:pre-wrap;height:100%;">{content}</div>"#,
        content = props.html("content", "Your notes here..."),
    ))
}

fn notes_behavior(props: &WidgetProps<'_>) -> String {
    static_behavior(props, "Notes", &["Notes are editable directly in the dashboard"])
}

fn todo_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "✅", "Todo").body_id("list").build("")
}

fn todo_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let ident = props.ident();
    let preamble = format!(
        "      const items_{ident} = '{items}'.split(',').map(s => s.trim()).filter(Boolean);\n",
        items = props.js("items", "Add tasks"),
    );
    let body = format!(
        r#"        document.getElementById('{id}-list').innerHTML = items_{ident}.map((item, i) =>
          '<div class="todo-item"><input type="checkbox" id="{id}-' + i + '"><label for="{id}-' + i + '">' + item + '</label></div>'
        ).join('');"#
    );
    Poller::new(*props, "Todo List", 0.0)
        .function_prefix("render")
        .preamble(preamble)
        .sync()
        .build_once(&body)
}

fn email_markup(props: &WidgetProps<'_>) -> String {
    kpi_tile(props, "📧", "kpi-value red", "count", "Unread")
}

fn email_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/email/unread")),
        &format!(
            r#"          const el = document.getElementById('{id}-count');
          el.textContent = data.count || 0;
          el.className = 'kpi-value ' + (data.count > 0 ? 'red' : 'green');"#
        ),
        &format!("          document.getElementById('{id}-count').textContent = '—';"),
    );
    Poller::new(*props, "Email Count", 120.0).build(&body)
}

fn github_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "🐙", "GitHub")
        .body_id("stats")
        .build(r#"          <div class="gh-stat">Loading...</div>"#)
}

fn github_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!(
            "'https://api.github.com/users/' + encodeURIComponent('{}')",
            props.js("username", "octocat")
        ),
        &format!(
            r#"          document.getElementById('{id}-stats').innerHTML =
            '<div class="gh-stat">📦 ' + data.public_repos + ' repos</div>' +
            '<div class="gh-stat">👥 ' + data.followers + ' followers</div>' +
            '<div class="gh-stat">🔗 ' + data.following + ' following</div>';"#
        ),
        &format!(
            "          document.getElementById('{id}-stats').innerHTML = '<div class=\"error\">Failed to load</div>';"
        ),
    );
    Poller::new(*props, "GitHub Stats", 300.0).build(&body)
}

fn quote_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    format!(
        r#"
      <div class="quote-card" id="widget-{id}">
        <div class="quote-text" id="{id}-text">Loading quote...</div>
        <div class="quote-author" id="{id}-author">—</div>
      </div>"#
    )
}

fn quote_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!(
            "'https://api.quotable.io/random?tags=' + encodeURIComponent('{}')",
            props.js("category", "inspire")
        ),
        &format!(
            r#"          document.getElementById('{id}-text').textContent = '"' + data.content + '"';
          document.getElementById('{id}-author').textContent = '— ' + data.author;"#
        ),
        &format!(
            r#"          document.getElementById('{id}-text').textContent = '"Stay hungry, stay foolish."';
          document.getElementById('{id}-author').textContent = '— Steve Jobs';"#
        ),
    );
    Poller::new(*props, "Quote of Day", 3600.0).build(&body)
}

const NO_LINKS: &str = r#"<span style="color:var(--text-muted);font-size:12px;">No links added</span>"#;

fn links_markup(props: &WidgetProps<'_>) -> String {
    let inner = if props.list("links").is_empty() {
        format!("          {}", NO_LINKS)
    } else {
        String::new()
    };
    Card::new(*props, "🔗", "Quick Links")
        .body_class("links-list")
        .body_id("links")
        .build(&inner)
}

fn links_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let links = serde_json::to_string(props.list("links")).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"
      // Quick Links Widget: {id}
      (function() {{
        const links = JSON.parse('{links}');
        const container = document.getElementById('{id}-links');
        if (links.length === 0) {{
          container.innerHTML = '{no_links}';
          return;
        }}
        container.innerHTML = links.map(link => {{
          let favicon = '';
          try {{
            favicon = 'https://www.google.com/s2/favicons?sz=32&domain=' + new URL(link.url).hostname;
          }} catch (e) {{}}
          return '<a href="' + link.url + '" class="quick-link" target="_blank">' +
            (favicon ? '<img src="' + favicon + '" style="width:16px;height:16px;">' : '') +
            '<span>' + link.name + '</span></a>';
        }}).join('');
      }})();
    "#,
        links = escape_js(&links),
        no_links = escape_js(NO_LINKS),
    )
}

#[cfg(test)]
mod tests {
    use crate::widgets::render_for_test;
    use serde_json::json;

    #[test]
    fn notes_escape_content_and_have_no_timer() {
        let (markup, behavior) = render_for_test("notes", json!({ "id": "n1", "content": "<script>x</script>" }));
        assert!(markup.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!behavior.contains("setInterval"));
    }

    #[test]
    fn todo_renders_once() {
        let (_, behavior) = render_for_test("todo-list", json!({ "id": "t-1", "items": "Ship,Test" }));
        assert!(behavior.contains("const items_t_1 = 'Ship,Test'.split(',')"));
        assert!(behavior.contains("render_t_1();"));
        assert!(!behavior.contains("setInterval"));
    }

    #[test]
    fn quick_links_embed_json_list() {
        let (markup, behavior) = render_for_test(
            "quick-links",
            json!({ "id": "q1", "links": [{ "name": "Docs", "url": "https://docs.rs" }] }),
        );
        assert!(!markup.contains("No links added"));
        assert!(behavior.contains(r#"JSON.parse('[{\"name\":\"Docs\",\"url\":\"https://docs.rs\"}]')"#));
    }

    #[test]
    fn empty_quick_links_show_placeholder() {
        let (markup, _) = render_for_test("quick-links", json!({ "id": "q2" }));
        assert!(markup.contains("No links added"));
    }

    #[test]
    fn email_count_uses_endpoint() {
        let (_, behavior) = render_for_test("email-count", json!({ "id": "e1" }));
        assert!(behavior.contains("await fetch('/api/email/unread')"));
        assert!(behavior.contains("setInterval(update_e1, 120000);"));
    }
}
