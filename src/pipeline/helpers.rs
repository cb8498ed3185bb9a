//! String helpers available as filters in filename templates.
//!
//! These sit on top of tera's built-in filters (`upper`, `lower`, `title`,
//! `trim`, `replace`, `slugify`, `truncate`, ...) and follow the naming and
//! behaviour of the Go sprig helpers the default formats are written with,
//! so `{{.Company | snakecase}}` means the same thing it does there.

use std::collections::HashMap;
use tera::{Tera, Value};

/// `(name, transform)` for every helper registered by [`register`].
const HELPERS: &[(&str, fn(&str) -> String)] = &[
    ("snakecase", snakecase),
    ("kebabcase", kebabcase),
    ("camelcase", camelcase),
    ("swapcase", swapcase),
    ("untitle", untitle),
    ("initials", initials),
    ("nospace", nospace),
    ("filesafe", filesafe),
];

/// Register every helper on `tera`.
pub fn register(tera: &mut Tera) {
    for &(name, transform) in HELPERS {
        tera.register_filter(name, string_filter(name, transform));
    }
}

fn string_filter(
    name: &'static str,
    transform: fn(&str) -> String,
) -> impl Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync + 'static {
    move |value, _args| {
        let s = value.as_str().ok_or_else(|| {
            tera::Error::msg(format!("Filter `{name}` expects a string, got {value}"))
        })?;
        Ok(Value::String(transform(s)))
    }
}

/// Split on non-alphanumerics and on case changes.
///
/// `"HTTPServer v2"` → `["HTTP", "Server", "v2"]`, `"Q3Report"` → `["Q3", "Report"]`.
fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() {
            if let Some(prev) = current.chars().last() {
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_numeric()
                    || (prev.is_uppercase() && next_is_lower);
                if boundary {
                    words.push(std::mem::take(&mut current));
                }
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn join_lower(s: &str, sep: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(sep)
}

pub fn snakecase(s: &str) -> String {
    join_lower(s, "_")
}

pub fn kebabcase(s: &str) -> String {
    join_lower(s, "-")
}

/// Upper camel case: `"http_server"` → `"HttpServer"`.
pub fn camelcase(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect()
}

pub fn swapcase(s: &str) -> String {
    s.chars()
        .flat_map(|c| {
            if c.is_uppercase() {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                c.to_uppercase().collect::<Vec<_>>()
            }
        })
        .collect()
}

/// Lower-case the first letter of every word, keeping whitespace as is.
pub fn untitle(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// First character of every whitespace-separated word.
pub fn initials(s: &str) -> String {
    s.split_whitespace().filter_map(|w| w.chars().next()).collect()
}

pub fn nospace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Replace path separators and characters most filesystems reject with `_`.
pub fn filesafe(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_case_and_punctuation() {
        assert_eq!(split_words("Acme Corp"), vec!["Acme", "Corp"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(split_words("firstName"), vec!["first", "Name"]);
        assert_eq!(split_words("Q3Report"), vec!["Q3", "Report"]);
        assert_eq!(split_words("  --  "), Vec::<String>::new());
    }

    #[test]
    fn snake_and_kebab() {
        assert_eq!(snakecase("Acme Corp"), "acme_corp");
        assert_eq!(snakecase("FirstName"), "first_name");
        assert_eq!(kebabcase("FirstName"), "first-name");
        assert_eq!(kebabcase("Invoice 2024/01"), "invoice-2024-01");
    }

    #[test]
    fn camel() {
        assert_eq!(camelcase("http_server"), "HttpServer");
        assert_eq!(camelcase("acme corp"), "AcmeCorp");
    }

    #[test]
    fn swap_untitle_initials_nospace() {
        assert_eq!(swapcase("This Is A.Test"), "tHIS iS a.tEST");
        assert_eq!(untitle("Hello World"), "hello world");
        assert_eq!(initials("First Try"), "FT");
        assert_eq!(nospace("hello w o r l d"), "helloworld");
    }

    #[test]
    fn filesafe_replaces_separators() {
        assert_eq!(filesafe("A/B: C?"), "A_B_ C_");
        assert_eq!(filesafe("plain name"), "plain name");
    }

    #[test]
    fn filter_rejects_non_strings() {
        let f = string_filter("snakecase", snakecase);
        assert!(f(&Value::from(3), &HashMap::new()).is_err());
        assert_eq!(
            f(&Value::from("Acme Corp"), &HashMap::new()).unwrap(),
            Value::from("acme_corp")
        );
    }
}
