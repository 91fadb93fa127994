//! Inline HTML pages.

use std::fmt::Write as _;

use service::domain::user::{Session, Username};

use crate::Notice;

/// Escapes the provided `text` for embedding into HTML.
pub(crate) fn escape(text: &str) -> String {
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

/// Wraps the provided `body` into an HTML document.
fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n{body}</body>\n\
         </html>\n",
    )
}

/// Renders the index page for the provided [`Session`].
pub(crate) fn index(session: &Session, notice: Option<Notice>) -> String {
    let mut body = String::new();

    if let Some(notice) = notice {
        _ = writeln!(body, "<p class=\"notice\">{}</p>", notice.message());
    }

    if let Some(username) = session.identity() {
        let name: &str = username.as_ref();
        _ = writeln!(body, "<p>Logged in as {}</p>", escape(name));
        body.push_str(
            "<p><a href=\"/secret\">Secret</a> | \
             <a href=\"/logout\">Log out</a></p>\n",
        );
    } else {
        for (action, title) in [("register", "Register"), ("login", "Log in")] {
            _ = writeln!(
                body,
                "<form method=\"post\" action=\"/{action}\">\
                 <h2>{title}</h2>\
                 <input name=\"username\" placeholder=\"username\">\
                 <input name=\"password\" type=\"password\" \
                        placeholder=\"password\">\
                 <button type=\"submit\">{title}</button>\
                 </form>",
            );
        }
    }

    layout("Home", &body)
}

/// Renders the protected page of the provided [`Username`].
pub(crate) fn secret(username: &Username) -> String {
    let name: &str = username.as_ref();
    layout(
        "Secret",
        &format!(
            "<p>Secret page of {}</p>\n<p><a href=\"/\">Home</a></p>\n",
            escape(name),
        ),
    )
}

#[cfg(test)]
mod spec {
    use service::domain::user::{Session, Username};

    use crate::Notice;

    use super::{escape, index};

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;",
        );
        assert_eq!(escape("alice"), "alice");
    }

    #[test]
    fn index_shows_forms_to_anonymous() {
        let page = index(&Session::anonymous(), Some(Notice::LoggedOut));

        assert!(page.contains("Logged out"));
        assert!(page.contains("action=\"/register\""));
        assert!(page.contains("action=\"/login\""));
        assert!(!page.contains("/logout"));
    }

    #[test]
    fn index_names_authenticated_user() {
        let session = Session::authenticated(Username::new("<bob>").unwrap());

        let page = index(&session, None);

        assert!(page.contains("Logged in as &lt;bob&gt;"));
        assert!(page.contains("href=\"/logout\""));
        assert!(!page.contains("<form"));
    }
}
