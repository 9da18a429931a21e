use gosub_cookies::{CookieConfig, CookieOptions, CookieStore, RequestContext, SameSite};
use http::header::COOKIE;
use http::{HeaderMap, HeaderValue};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let store = CookieStore::new(CookieConfig {
        http_only: true,
        same_site: Some(SameSite::Lax),
        ..Default::default()
    });

    // First request: nothing sent by the client, we set two cookies.
    let mut first = RequestContext::from_request(&HeaderMap::new());
    store.set(&mut first, "username", "Awilum", store.options());
    store.set(
        &mut first,
        "cart",
        &json!({"items": [17, 42], "coupon": null}),
        store.options().expire(3600).path("/shop"),
    );

    let response = first
        .response_cookies_mut()
        .ok_or_else(|| anyhow::anyhow!("context is not backed by ResponseCookies"))?;
    response.finalize();

    // A late write after the response went out is refused.
    let late = store.set(&mut first, "late", &1, CookieOptions::default());
    println!("late set accepted: {}", late);

    let mut pairs = Vec::new();
    for header in first.response_cookies().map(|r| r.set_cookie_headers()).unwrap_or_default() {
        println!("Set-Cookie: {}", header);
        if let Some((pair, _)) = header.split_once(';') {
            pairs.push(pair.to_string());
        }
    }

    // Second request: the client echoes the cookies back.
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&pairs.join("; "))?);
    let mut second = RequestContext::from_request(&headers);

    println!("username = {}", store.get(&second, "username"));
    println!("cart     = {}", store.get(&second, "cart"));
    println!("missing  = {}", store.get(&second, "missing"));

    store.delete(&mut second, "username");
    println!("after delete, username = {}", store.get(&second, "username"));

    Ok(())
}
