//! Quoted literal helpers shared by the built-in quote rule and the
//! `unquote` transform.
//!
//! Double- and single-quoted literals understand the usual backslash escapes
//! (`\a \b \f \n \r \t \v \\ \' \"`, `\xHH`, `\uHHHH`, `\UHHHHHHHH` and
//! three-digit octal `\ooo`). Backtick literals are raw: only the delimiters
//! are removed.

/// Returns the number of bytes taken by the escape body that follows a
/// backslash at the start of `rest` (the backslash itself excluded).
pub(crate) fn escape_len(rest: &str) -> Result<usize, String> {
    let mut chars = rest.chars();
    let first = chars
        .next()
        .ok_or_else(|| "escape sequence at end of literal".to_string())?;
    let digits = match first {
        'a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\' | '\'' | '"' => return Ok(1),
        'x' => 2,
        'u' => 4,
        'U' => 8,
        '0'..='7' => {
            let body: String = rest.chars().take(3).collect();
            if body.len() != 3 || !body.chars().all(|c| ('0'..='7').contains(&c)) {
                return Err(format!("invalid octal escape \\{body}"));
            }
            if u32::from_str_radix(&body, 8).map_or(true, |v| v > 255) {
                return Err(format!("octal escape \\{body} out of range"));
            }
            return Ok(3);
        }
        other => return Err(format!("unknown escape \\{other}")),
    };
    let body: String = chars.take(digits).collect();
    if body.len() != digits || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("expected {digits} hex digits after \\{first}"));
    }
    if first != 'x' {
        let code = u32::from_str_radix(&body, 16).map_err(|e| e.to_string())?;
        if char::from_u32(code).is_none() {
            return Err(format!("\\{first}{body} is not a valid character"));
        }
    }
    Ok(1 + digits)
}

fn decode_escape(body: &str) -> Result<char, String> {
    let (kind, digits) = body.split_at(1);
    let radix_value = |radix| u32::from_str_radix(digits, radix).map_err(|e| e.to_string());
    let code = match kind {
        "a" => return Ok('\u{07}'),
        "b" => return Ok('\u{08}'),
        "f" => return Ok('\u{0c}'),
        "n" => return Ok('\n'),
        "r" => return Ok('\r'),
        "t" => return Ok('\t'),
        "v" => return Ok('\u{0b}'),
        "\\" => return Ok('\\'),
        "'" => return Ok('\''),
        "\"" => return Ok('"'),
        "x" | "u" | "U" => radix_value(16)?,
        _ => u32::from_str_radix(body, 8).map_err(|e| e.to_string())?,
    };
    char::from_u32(code).ok_or_else(|| format!("\\{body} is not a valid character"))
}

/// Removes the delimiters of a quoted literal and resolves its escapes.
///
/// Accepts `"..."`, `'...'` and `` `...` `` literals. The error is a
/// human-readable reason; callers attach the token position.
pub fn unquote(literal: &str) -> Result<String, String> {
    let quote = literal
        .chars()
        .next()
        .ok_or_else(|| "empty literal".to_string())?;
    if !matches!(quote, '"' | '\'' | '`') {
        return Err(format!("literal does not start with a quote: {literal}"));
    }
    if literal.len() < 2 || !literal.ends_with(quote) {
        return Err(format!("unterminated literal {literal}"));
    }
    let inner = &literal[1..literal.len() - 1];
    if quote == '`' {
        return Ok(inner.to_string());
    }

    let mut out = String::with_capacity(inner.len());
    let mut rest = inner;
    while let Some(index) = rest.find('\\') {
        out.push_str(&rest[..index]);
        let after = &rest[index + 1..];
        let len = escape_len(after)?;
        out.push(decode_escape(&after[..len])?);
        rest = &after[len..];
    }
    out.push_str(rest);
    Ok(out)
}
