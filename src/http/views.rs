//! Server-rendered HTML.
//!
//! Native shells draw their own navigation chrome, so the site header is
//! left out when the request comes from one.

use axum::response::Html;

use crate::http::flash::Flash;
use crate::native::NativeClient;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, client: NativeClient, flash: Option<Flash>, content: &str) -> Html<String> {
    let header = if client.is_native() {
        String::new()
    } else {
        r#"<header class="site-header"><a href="/">Home</a> <a href="/signup">Sign up</a></header>"#
            .to_string()
    };
    let flash = flash
        .map(|f| {
            format!(
                r#"<p class="flash {}" role="status">{}</p>"#,
                f.level().as_str(),
                escape_html(f.message())
            )
        })
        .unwrap_or_default();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
</head>
<body class="client-{client}">
{header}
{flash}
<main>
{content}
</main>
</body>
</html>
"#,
        title = escape_html(title),
        client = client.as_str(),
    ))
}

/// Landing page. Greets the signed-in user when there is one.
pub fn landing(client: NativeClient, flash: Option<Flash>, signed_in_as: Option<&str>) -> Html<String> {
    let content = match signed_in_as {
        Some(email) => format!(
            r#"<h1>Welcome</h1>
<p class="current-user">Signed in as {}</p>"#,
            escape_html(email)
        ),
        None => r#"<h1>Welcome</h1>
<p><a href="/signup">Create an account</a></p>"#
            .to_string(),
    };
    layout("Welcome", client, flash, &content)
}

/// Signup form. Field names match [`RegistrationForm`](crate::accounts::RegistrationForm).
pub fn signup(client: NativeClient, flash: Option<Flash>, min_password_length: usize) -> Html<String> {
    let content = format!(
        r#"<h1>Sign up</h1>
<form action="/register" method="post">
<label for="user_email_address">Email address</label>
<input type="email" id="user_email_address" name="user[email_address]" required autocomplete="username">
<label for="user_password">Password</label>
<input type="password" id="user_password" name="user[password]" required minlength="{min}" autocomplete="new-password">
<label for="user_password_confirmation">Confirm password</label>
<input type="password" id="user_password_confirmation" name="user[password_confirmation]" required minlength="{min}" autocomplete="new-password">
<button type="submit">Sign up</button>
</form>"#,
        min = min_password_length,
    );
    layout("Sign up", client, flash, &content)
}
