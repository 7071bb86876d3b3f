//! Full-width bars: navigation and scrolling tickers.

use serde_json::json;

use super::markup::{fetch_json, ticker_strip, Poller};
use super::props::{escape_html, WidgetProps};
use super::WidgetDescriptor;
use crate::models::WidgetCategory;

pub(super) fn descriptors() -> Vec<WidgetDescriptor> {
    vec![
        WidgetDescriptor::new("topbar", "Top Nav Bar", "🔝", WidgetCategory::Bar)
            .description("Navigation bar with clock, weather, and system stats.")
            .size(1920, 48)
            .defaults(json!({ "title": "OpenClaw", "links": "Dashboard,Activity,Settings" }))
            .render(topbar_markup, topbar_behavior),
        WidgetDescriptor::new("news-ticker", "News Ticker", "📰", WidgetCategory::Bar)
            .description("Scrolling news headlines. Requires NewsAPI key.")
            .size(1920, 40)
            .credential("NEWS_API_KEY")
            .defaults(json!({ "title": "News", "category": "technology", "refreshInterval": 1800 }))
            .render(news_markup, news_behavior),
        WidgetDescriptor::new("rss-ticker", "RSS Ticker", "📜", WidgetCategory::Bar)
            .description("Scrolling RSS feed headlines. May need CORS proxy.")
            .size(1920, 40)
            .defaults(json!({
                "title": "RSS",
                "feedUrl": "https://example.com/feed.xml",
                "refreshInterval": 600
            }))
            .render(rss_markup, rss_behavior),
    ]
}

fn topbar_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    let links: String = props
        .text("links", "Dashboard")
        .split(',')
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .enumerate()
        .map(|(index, link)| {
            let active = if index == 0 { " active" } else { "" };
            format!(
                r##"<a href="#" class="topbar-link{}">{}</a>"##,
                active,
                escape_html(link)
            )
        })
        .collect();
    format!(
        r#"
      <nav class="topbar" id="widget-{id}">
        <div class="topbar-left">
          <span class="topbar-brand">🤖 {title}</span>
          {links}
        </div>
        <div class="topbar-right">
          <span class="topbar-meta" id="{id}-refresh">—</span>
          <button class="topbar-refresh" onclick="location.reload()" title="Refresh">↻</button>
        </div>
      </nav>"#,
        title = props.html("title", "OpenClaw"),
    )
}

fn topbar_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    format!(
        r#"
      // Top Bar Widget: {id}
      document.getElementById('{id}-refresh').textContent =
        new Date().toLocaleTimeString('en-US', {{ hour: 'numeric', minute: '2-digit' }});
    "#
    )
}

fn news_markup(props: &WidgetProps<'_>) -> String {
    ticker_strip(props, "📰", "Loading news...")
}

fn news_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!(
            "'https://newsapi.org/v2/top-headlines?category=' + encodeURIComponent('{}') + '&apiKey=' + apiKey",
            props.js("category", "technology")
        ),
        &format!(
            "          document.getElementById('{id}-ticker').textContent = (data.articles || []).map(a => a.title).join(' ••• ');"
        ),
        &format!("          document.getElementById('{id}-ticker').textContent = 'Failed to load news';"),
    );
    Poller::new(*props, "News Ticker", 1800.0)
        .preamble("      const apiKey = 'YOUR_NEWS_API_KEY';\n".to_string())
        .build(&body)
}

fn rss_markup(props: &WidgetProps<'_>) -> String {
    ticker_strip(props, "📜", "Loading RSS feed...")
}

fn rss_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!(
            "'https://api.rss2json.com/v1/api.json?rss_url=' + encodeURIComponent('{}')",
            props.js("feedUrl", "")
        ),
        &format!(
            r#"          const headlines = (data.items || []).map(item => item.title).join(' ••• ');
          document.getElementById('{id}-ticker').textContent = headlines || 'No items found';"#
        ),
        &format!("          document.getElementById('{id}-ticker').textContent = 'Failed to load RSS feed';"),
    );
    Poller::new(*props, "RSS Ticker", 600.0).build(&body)
}

#[cfg(test)]
mod tests {
    use crate::widgets::render_for_test;
    use serde_json::json;

    #[test]
    fn topbar_marks_first_link_active() {
        let (markup, behavior) = render_for_test("topbar", json!({ "id": "b1", "links": "Home, Ops ,<Admin>" }));
        assert!(markup.contains(r##"<a href="#" class="topbar-link active">Home</a>"##));
        assert!(markup.contains(r##"<a href="#" class="topbar-link">Ops</a>"##));
        assert!(markup.contains("&lt;Admin&gt;"));
        assert!(behavior.contains("'b1-refresh'"));
    }

    #[test]
    fn tickers_share_strip_markup() {
        let (news, _) = render_for_test("news-ticker", json!({ "id": "n1" }));
        let (rss, behavior) = render_for_test("rss-ticker", json!({ "id": "r1", "feedUrl": "https://blog.rust-lang.org/feed.xml" }));
        assert!(news.contains("id=\"n1-ticker\""));
        assert!(rss.contains("id=\"r1-ticker\""));
        assert!(behavior.contains("encodeURIComponent('https://blog.rust-lang.org/feed.xml')"));
        assert!(behavior.contains("setInterval(update_r1, 600000);"));
    }
}
