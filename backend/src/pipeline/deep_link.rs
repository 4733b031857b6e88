//! Messaging deep links of the form `https://wa.me/<digits>?text=<message>`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const DEEP_LINK_BASE: &str = "https://wa.me/";

/// Characters left as-is by `encodeURIComponent`; everything else is escaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds the deep link for a normalized phone and an optional message.
///
/// Only the digits of `phone` end up in the path. The message is trimmed and
/// dropped entirely when nothing but whitespace remains.
pub fn build_deep_link(phone: &str, message: Option<&str>) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let mut link = format!("{}{}", DEEP_LINK_BASE, digits);

    if let Some(text) = message.map(str::trim).filter(|t| !t.is_empty()) {
        link.push_str("?text=");
        link.extend(utf8_percent_encode(text, URI_COMPONENT));
    }
    link
}

/// Substitutes every `{{name}}` in `message` with `name`.
pub fn render_message(message: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => message.replace("{{name}}", name),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_without_message() {
        assert_eq!(build_deep_link("+14155552671", None), "https://wa.me/14155552671");
        assert_eq!(build_deep_link("+14155552671", Some("   ")), "https://wa.me/14155552671");
    }

    #[test]
    fn message_is_uri_component_encoded() {
        assert_eq!(
            build_deep_link("+14155552671", Some("Hello John Doe!")),
            "https://wa.me/14155552671?text=Hello%20John%20Doe!"
        );
        assert_eq!(
            build_deep_link("+14155552671", Some(" a&b=c? (ok) ")),
            "https://wa.me/14155552671?text=a%26b%3Dc%3F%20(ok)"
        );
    }

    #[test]
    fn non_ascii_is_utf8_encoded() {
        assert_eq!(
            build_deep_link("+34600000000", Some("¡Hola!")),
            "https://wa.me/34600000000?text=%C2%A1Hola!"
        );
    }

    #[test]
    fn renders_every_name_placeholder() {
        assert_eq!(
            render_message("Hi {{name}}, bye {{name}}", Some("Ana")),
            "Hi Ana, bye Ana"
        );
        assert_eq!(render_message("Hi {{name}}", None), "Hi {{name}}");
        assert_eq!(render_message("Hi {{ name }}", Some("Ana")), "Hi {{ name }}");
    }
}
