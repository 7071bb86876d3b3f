//! Music, images, embeds and feed lists.

use serde_json::{json, Value};

use super::markup::{fetch_json, static_behavior, Card, Poller, IMAGE_BODY};
use super::props::{escape_js, format_number, WidgetProps};
use super::WidgetDescriptor;
use crate::models::WidgetCategory;

pub(super) fn descriptors() -> Vec<WidgetDescriptor> {
    vec![
        WidgetDescriptor::new("now-playing", "Now Playing", "🎵", WidgetCategory::Large)
            .description("Shows currently playing music from Spotify/music service API.")
            .size(350, 120)
            .credential("SPOTIFY_TOKEN")
            .defaults(json!({
                "title": "Now Playing",
                "endpoint": "/api/spotify/now-playing",
                "refreshInterval": 10
            }))
            .render(now_playing_markup, now_playing_behavior),
        WidgetDescriptor::new("image-local", "Image", "🖼️", WidgetCategory::Large)
            .description("Displays a local image file. Embedded as base64 for portable exports.")
            .size(300, 220)
            .defaults(json!({ "title": "Image", "imagePath": "" }))
            .render(image_local_markup, image_local_behavior),
        WidgetDescriptor::new("image-random", "Random Image", "🎲", WidgetCategory::Large)
            .description("Rotates through multiple images. Pick files to add to rotation.")
            .size(300, 220)
            .defaults(json!({ "title": "Random Image", "images": [], "refreshInterval": 30 }))
            .render(image_random_markup, image_random_behavior),
        WidgetDescriptor::new("image-embed", "Web Image", "🌐", WidgetCategory::Large)
            .description("Displays an image from a web URL.")
            .size(300, 220)
            .defaults(json!({ "title": "Image", "imageUrl": "" }))
            .render(image_embed_markup, image_embed_behavior),
        WidgetDescriptor::new("iframe-embed", "Iframe Embed", "🌐", WidgetCategory::Large)
            .description("Embeds any webpage in an iframe. Some sites may block embedding.")
            .size(500, 350)
            .defaults(json!({ "title": "Embed", "embedUrl": "https://example.com", "allowFullscreen": true }))
            .render(iframe_markup, iframe_behavior),
        WidgetDescriptor::new("rss-feed", "RSS Feed", "📡", WidgetCategory::Large)
            .description("Displays RSS feed items in a list. May need CORS proxy.")
            .size(400, 300)
            .defaults(json!({
                "title": "RSS Feed",
                "feedUrl": "https://example.com/feed.xml",
                "maxItems": 5,
                "refreshInterval": 600
            }))
            .render(rss_feed_markup, rss_feed_behavior),
    ]
}

fn now_playing_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    format!(
        r#"
      <div class="now-playing-card" id="widget-{id}">
        <div class="np-art" id="{id}-art"></div>
        <div class="np-info">
          <div class="np-title" id="{id}-title">Not Playing</div>
          <div class="np-artist" id="{id}-artist">—</div>
        </div>
      </div>"#
    )
}

fn now_playing_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!("'{}'", props.js("endpoint", "/api/spotify/now-playing")),
        &format!(
            r#"          if (data.is_playing) {{
            document.getElementById('{id}-title').textContent = data.item?.name || 'Unknown';
            document.getElementById('{id}-artist').textContent = data.item?.artists?.map(a => a.name).join(', ') || '';
            if (data.item?.album?.images?.[0]?.url) {{
              document.getElementById('{id}-art').style.backgroundImage = 'url(' + data.item.album.images[0].url + ')';
            }}
          }}"#
        ),
        "          console.error('Spotify error:', e);",
    );
    Poller::new(*props, "Now Playing", 10.0).build(&body)
}

fn image_or_placeholder(props: &WidgetProps<'_>, key: &str, placeholder: &str) -> String {
    let source = props.html(key, "");
    if source.is_empty() {
        format!(r#"          <span style="color:var(--text-muted);font-size:12px;">{}</span>"#, placeholder)
    } else {
        format!(
            r#"          <img src="{}" style="width:100%;height:100%;object-fit:contain;">"#,
            source
        )
    }
}

fn image_local_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "🖼️", "Image")
        .body_style(IMAGE_BODY)
        .build(&image_or_placeholder(props, "imagePath", "🖼️ No image path"))
}

fn image_local_behavior(props: &WidgetProps<'_>) -> String {
    static_behavior(props, "Local Image", &["Static image - no JS needed"])
}

fn image_embed_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "🌐", "Image")
        .body_style(IMAGE_BODY)
        .build(&image_or_placeholder(props, "imageUrl", "🌐 No image URL"))
}

fn image_embed_behavior(props: &WidgetProps<'_>) -> String {
    static_behavior(props, "Web Image", &["Static image - no JS needed"])
}

fn image_random_markup(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    Card::new(*props, "🎲", "Random Image").body_style(IMAGE_BODY).build(&format!(
        r#"          <img id="{id}-img" src="" style="width:100%;height:100%;object-fit:contain;display:none;">
          <span id="{id}-placeholder" style="color:var(--text-muted);font-size:12px;">🎲 No images added</span>"#
    ))
}

/// Images are stored as `{ data }` objects or plain source strings.
fn image_sources(props: &WidgetProps<'_>) -> Vec<String> {
    props
        .list("images")
        .iter()
        .filter_map(|image| match image {
            Value::String(source) => Some(source.clone()),
            Value::Object(entry) => entry.get("data").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .filter(|source| !source.is_empty())
        .collect()
}

fn image_random_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let images = serde_json::to_string(&image_sources(props)).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"
      // Random Image Widget: {id}
      (function() {{
        const images = JSON.parse('{images}');
        const imgEl = document.getElementById('{id}-img');
        const placeholder = document.getElementById('{id}-placeholder');
        function showRandomImage() {{
          if (images.length === 0) return;
          imgEl.src = images[Math.floor(Math.random() * images.length)];
          imgEl.style.display = 'block';
          placeholder.style.display = 'none';
        }}
        if (images.length > 0) {{
          showRandomImage();
          setInterval(showRandomImage, {period});
        }}
      }})();
    "#,
        images = escape_js(&images),
        period = props.interval_ms(30.0),
    )
}

fn iframe_markup(props: &WidgetProps<'_>) -> String {
    let fullscreen = if props.flag("allowFullscreen") { " allowfullscreen" } else { "" };
    Card::new(*props, "🌐", "Embed")
        .body_style("padding:0;overflow:hidden;")
        .build(&format!(
            r#"          <iframe src="{src}" style="width:100%;height:100%;border:none;"{fullscreen}></iframe>"#,
            src = props.html("embedUrl", "about:blank"),
        ))
}

fn iframe_behavior(props: &WidgetProps<'_>) -> String {
    static_behavior(props, "Iframe Embed", &["Configure the embed URL in widget properties"])
}

fn rss_feed_markup(props: &WidgetProps<'_>) -> String {
    Card::new(*props, "📡", "RSS Feed")
        .body_class("compact-list")
        .body_id("items")
        .build(r#"          <div class="rss-item">Loading feed...</div>"#)
}

fn rss_feed_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!(
            "'https://api.rss2json.com/v1/api.json?rss_url=' + encodeURIComponent('{}')",
            props.js("feedUrl", "")
        ),
        &format!(
            r#"          document.getElementById('{id}-items').innerHTML = (data.items || []).slice(0, {max}).map(item =>
            '<a href="' + item.link + '" class="rss-item" target="_blank">' + item.title + '</a>'
          ).join('');"#,
            max = format_number(props.number("maxItems", 5.0)),
        ),
        &format!(
            "          document.getElementById('{id}-items').innerHTML = '<div class=\"error\">Failed to load feed</div>';"
        ),
    );
    Poller::new(*props, "RSS Feed", 600.0)
        .note("feeds need a CORS proxy or server-side fetch")
        .build(&body)
}

#[cfg(test)]
mod tests {
    use crate::widgets::render_for_test;
    use serde_json::json;

    #[test]
    fn image_widgets_fall_back_to_placeholder() {
        let (empty, _) = render_for_test("image-embed", json!({ "id": "i1" }));
        assert!(empty.contains("No image URL"));
        let (set, _) = render_for_test("image-embed", json!({ "id": "i1", "imageUrl": "https://x.test/a.png?x=1&y=2" }));
        assert!(set.contains(r#"<img src="https://x.test/a.png?x=1&amp;y=2""#));
    }

    #[test]
    fn random_image_accepts_objects_and_strings() {
        let (_, behavior) = render_for_test(
            "image-random",
            json!({ "id": "r1", "images": [{ "data": "data:image/png;base64,AAA" }, "b.png", 4], "refreshInterval": 15 }),
        );
        assert!(behavior.contains(r#"JSON.parse('[\"data:image/png;base64,AAA\",\"b.png\"]')"#));
        assert!(behavior.contains("setInterval(showRandomImage, 15000);"));
    }

    #[test]
    fn iframe_fullscreen_flag() {
        let (on, _) = render_for_test("iframe-embed", json!({ "id": "f1" }));
        assert!(on.contains(" allowfullscreen>"));
        let (off, _) = render_for_test("iframe-embed", json!({ "id": "f1", "allowFullscreen": false }));
        assert!(!off.contains("allowfullscreen"));
    }

    #[test]
    fn rss_feed_limits_items() {
        let (_, behavior) = render_for_test("rss-feed", json!({ "id": "rf", "maxItems": 8 }));
        assert!(behavior.contains(".slice(0, 8)"));
    }
}
