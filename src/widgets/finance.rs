use serde_json::json;

use super::markup::{fetch_json, Card, Poller, CENTERED_COLUMN};
use super::props::{escape_html, WidgetProps};
use super::WidgetDescriptor;
use crate::models::WidgetCategory;

pub(super) fn descriptors() -> Vec<WidgetDescriptor> {
    vec![
        WidgetDescriptor::new("stock-ticker", "Stock Ticker", "📈", WidgetCategory::Small)
            .description("Shows stock prices. Requires Finnhub or similar API key.")
            .size(200, 130)
            .credential("STOCK_API_KEY")
            .defaults(json!({ "title": "Stock", "symbol": "AAPL", "refreshInterval": 60 }))
            .render(stock_markup, stock_behavior),
        WidgetDescriptor::new("crypto-price", "Crypto Price", "₿", WidgetCategory::Small)
            .description("Shows cryptocurrency prices from public APIs.")
            .size(200, 130)
            .defaults(json!({
                "title": "Crypto",
                "coin": "bitcoin",
                "currency": "usd",
                "refreshInterval": 30
            }))
            .render(crypto_markup, crypto_behavior),
    ]
}

fn price_body(props: &WidgetProps<'_>) -> String {
    let id = props.dom_id();
    format!(
        r#"          <div class="kpi-value" id="{id}-price">—</div>
          <div class="kpi-label" id="{id}-change">—</div>"#
    )
}

/// The card head shows the ticker symbol rather than the title.
fn stock_markup(props: &WidgetProps<'_>) -> String {
    Card::titled(*props, "📈", props.html("symbol", "AAPL"))
        .body_style(CENTERED_COLUMN)
        .build(&price_body(props))
}

fn stock_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let body = fetch_json(
        &format!(
            "'https://finnhub.io/api/v1/quote?symbol=' + encodeURIComponent('{}') + '&token=' + apiKey",
            props.js("symbol", "AAPL")
        ),
        &format!(
            r#"          document.getElementById('{id}-price').textContent = '$' + (data.c || 0).toFixed(2);
          const change = ((data.c - data.pc) / data.pc * 100).toFixed(2);
          const changeEl = document.getElementById('{id}-change');
          changeEl.textContent = (change >= 0 ? '+' : '') + change + '%';
          changeEl.className = 'stock-change ' + (change >= 0 ? 'green' : 'red');"#
        ),
        &format!("          document.getElementById('{id}-price').textContent = '—';"),
    );
    Poller::new(*props, "Stock Ticker", 60.0)
        .preamble("      const apiKey = 'YOUR_STOCK_API_KEY';\n".to_string())
        .build(&body)
}

fn crypto_markup(props: &WidgetProps<'_>) -> String {
    let symbol = escape_html(&props.text("coin", "btc").to_uppercase());
    Card::titled(*props, "₿", symbol)
        .body_style(CENTERED_COLUMN)
        .build(&price_body(props))
}

fn crypto_behavior(props: &WidgetProps<'_>) -> String {
    let id = props.js_id();
    let coin = props.js("coin", "bitcoin");
    let currency = props.js("currency", "usd");
    let body = fetch_json(
        &format!(
            "'https://api.coingecko.com/api/v3/simple/price?ids={coin}&vs_currencies={currency}&include_24hr_change=true'"
        ),
        &format!(
            r#"          const quote = data['{coin}'] || {{}};
          document.getElementById('{id}-price').textContent = '$' + (quote['{currency}'] || 0).toLocaleString();
          const change = Number(quote['{currency}_24h_change'] || 0).toFixed(2);
          const changeEl = document.getElementById('{id}-change');
          changeEl.textContent = (change >= 0 ? '+' : '') + change + '%';
          changeEl.className = 'crypto-change ' + (change >= 0 ? 'green' : 'red');"#
        ),
        &format!("          document.getElementById('{id}-price').textContent = '—';"),
    );
    Poller::new(*props, "Crypto Price", 30.0).build(&body)
}

#[cfg(test)]
mod tests {
    use crate::widgets::render_for_test;
    use serde_json::json;

    #[test]
    fn stock_card_is_titled_by_symbol() {
        let (markup, behavior) = render_for_test("stock-ticker", json!({ "id": "s1", "symbol": "MSFT", "title": "ignored" }));
        assert!(markup.contains("📈 MSFT"));
        assert!(!markup.contains("ignored"));
        assert!(behavior.contains("encodeURIComponent('MSFT')"));
    }

    #[test]
    fn crypto_card_uppercases_coin() {
        let (markup, behavior) = render_for_test("crypto-price", json!({ "id": "c1", "coin": "ethereum", "currency": "eur" }));
        assert!(markup.contains("₿ ETHEREUM"));
        assert!(behavior.contains("ids=ethereum&vs_currencies=eur"));
        assert!(behavior.contains("quote['eur_24h_change']"));
        assert!(behavior.contains("setInterval(update_c1, 30000);"));
    }
}
