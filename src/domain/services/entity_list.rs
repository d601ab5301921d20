//! Textual list form of the `entities` column: `['Acme Inc. (ORG)', 'Shanghai (GPE)']`.
//!
//! Items are quoted like Python string literals: single quotes unless the
//! text holds a single quote and no double quote. Decoding accepts either
//! quote style, backslash escapes and bare items.

pub fn encode_entity_list<S: AsRef<str>>(entities: &[S]) -> String {
    let items: Vec<String> = entities.iter().map(|e| quote(e.as_ref())).collect();
    format!("[{}]", items.join(", "))
}

fn quote(item: &str) -> String {
    let delimiter = if item.contains('\'') && !item.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(item.len() + 2);
    out.push(delimiter);
    for c in item.chars() {
        if c == '\\' || c == delimiter {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(delimiter);
    out
}

pub fn decode_entity_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let inner = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ',' => {
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '\'' | '"' => {
                let delimiter = c;
                chars.next();
                let mut item = String::new();
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                item.push(escaped);
                            }
                        }
                        c if c == delimiter => break,
                        c => item.push(c),
                    }
                }
                if !item.trim().is_empty() {
                    items.push(item);
                }
            }
            _ => {
                let mut item = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ',' {
                        break;
                    }
                    item.push(c);
                    chars.next();
                }
                let item = item.trim();
                if !item.is_empty() {
                    items.push(item.to_string());
                }
            }
        }
    }

    items
}
