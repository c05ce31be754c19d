//! Cadence transaction parameters and JSON-Cadence argument encoding.
//!
//! Requests carry every argument as a string. The declared parameter types
//! of the transaction decide how each one is encoded for submission.

use serde_json::{json, Value};

use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
}

/// Parse the parameter list of a `transaction(...)` declaration.
pub fn transaction_parameters(tx: &str, code: &str) -> Result<Vec<Parameter>> {
    let malformed = |reason: &str| Error::MalformedTransaction {
        name: tx.to_string(),
        reason: reason.to_string(),
    };

    let code = strip_comments(code);
    let start = find_transaction_keyword(&code)
        .ok_or_else(|| malformed("no `transaction` declaration"))?;
    let rest = code[start..].trim_start();
    if rest.starts_with('{') {
        return Ok(Vec::new());
    }

    let mut depth = 0usize;
    let mut end = None;
    for (i, c) in rest.char_indices() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("unbalanced parameter list"))?;
                if depth == 0 {
                    end = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let end = end.ok_or_else(|| malformed("unterminated parameter list"))?;

    split_top_level(&rest[1..end])
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let (name, ty) = p
                .split_once(':')
                .ok_or_else(|| malformed(&format!("parameter `{p}` has no type")))?;
            let (name, ty) = (name.trim(), ty.trim());
            if name.is_empty() || ty.is_empty() {
                return Err(malformed(&format!("parameter `{p}` is incomplete")));
            }
            Ok(Parameter {
                name: name.to_string(),
                ty: ty.to_string(),
            })
        })
        .collect()
}

/// Match named string arguments to `params` and encode them in declaration
/// order. `resolve_address` maps an account name to its address.
pub fn encode_arguments(
    tx: &str,
    params: &[Parameter],
    args: &[(String, String)],
    resolve_address: impl Fn(&str) -> Option<String>,
) -> Result<Vec<Value>> {
    let missing: Vec<String> = params
        .iter()
        .filter(|p| !args.iter().any(|(n, _)| *n == p.name))
        .map(|p| p.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingArguments {
            name: tx.to_string(),
            missing,
        });
    }

    let extra: Vec<String> = args
        .iter()
        .filter(|(n, _)| !params.iter().any(|p| p.name == *n))
        .map(|(n, _)| n.clone())
        .collect();
    if !extra.is_empty() {
        return Err(Error::ExtraArguments {
            name: tx.to_string(),
            extra,
        });
    }

    params
        .iter()
        .map(|p| {
            let raw = args
                .iter()
                .find(|(n, _)| *n == p.name)
                .map(|(_, v)| v.as_str())
                .unwrap_or_default();
            encode_value(&p.name, &p.ty, raw, &resolve_address)
        })
        .collect()
}

fn encode_value(
    arg: &str,
    ty: &str,
    raw: &str,
    resolve_address: &dyn Fn(&str) -> Option<String>,
) -> Result<Value> {
    let invalid = || Error::InvalidArgument {
        arg: arg.to_string(),
        ty: ty.to_string(),
        value: raw.to_string(),
    };

    if let Some(inner) = ty.strip_suffix('?') {
        if raw.is_empty() {
            return Ok(json!({ "type": "Optional", "value": null }));
        }
        let value = encode_value(arg, inner.trim(), raw, resolve_address)?;
        return Ok(json!({ "type": "Optional", "value": value }));
    }

    let (kind, value) = match ty {
        "String" => (ty, Value::from(raw.to_string())),
        "Character" if raw.chars().count() == 1 => (ty, Value::from(raw.to_string())),
        "Character" => return Err(invalid()),
        // no static type to check against, so it goes over as a string
        "AnyStruct" => ("String", Value::from(raw.to_string())),
        "Bool" => match raw {
            "true" | "false" => (ty, Value::Bool(raw == "true")),
            _ => return Err(invalid()),
        },
        "UFix64" => (ty, Value::from(fixed_point(raw, false).ok_or_else(invalid)?)),
        "Fix64" => (ty, Value::from(fixed_point(raw, true).ok_or_else(invalid)?)),
        "Address" => (ty, Value::from(address(raw, resolve_address).ok_or_else(invalid)?)),
        _ => match integer_kind(ty) {
            Some((signed, bits)) if integer_fits(raw, signed, bits) => {
                (ty, Value::from(raw.to_string()))
            }
            Some(_) => return Err(invalid()),
            None => {
                return Err(Error::UnsupportedArgumentType {
                    arg: arg.to_string(),
                    ty: ty.to_string(),
                })
            }
        },
    };

    Ok(json!({ "type": kind, "value": value }))
}

/// Fix64/UFix64 values must carry exactly eight fractional digits.
fn fixed_point(raw: &str, signed: bool) -> Option<String> {
    let (neg, body) = match raw.strip_prefix('-') {
        Some(body) => (true, body),
        None => (false, raw),
    };
    if neg && !signed {
        return None;
    }
    let (int, frac) = body.split_once('.').unwrap_or((body, ""));
    if int.is_empty() || !all_digits(int) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > 8 || int.len() > 20 {
        return None;
    }

    // scaled by 10^8, bounded like the u64/i64 they are stored in
    let frac = format!("{frac:0<8}");
    let scaled = int.parse::<u128>().ok()? * 100_000_000 + frac.parse::<u128>().ok()?;
    let max = match (signed, neg) {
        (false, _) => u64::MAX as u128,
        (true, false) => i64::MAX as u128,
        (true, true) => i64::MAX as u128 + 1,
    };
    if scaled > max {
        return None;
    }
    Some(format!("{}{int}.{frac}", if neg { "-" } else { "" }))
}

fn address(raw: &str, resolve_address: &dyn Fn(&str) -> Option<String>) -> Option<String> {
    let hex = match raw.strip_prefix("0x") {
        Some(hex) => hex.to_string(),
        // without the prefix it has to be a known account
        None => resolve_address(raw)?.trim_start_matches("0x").to_string(),
    };
    if hex.is_empty() || hex.len() > 16 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{:0>16}", hex.to_ascii_lowercase()))
}

/// `(signed, bits)`; `bits` is `None` for the unbounded `Int`/`UInt`.
fn integer_kind(ty: &str) -> Option<(bool, Option<u32>)> {
    let (signed, width) = if let Some(w) = ty.strip_prefix("UInt") {
        (false, w)
    } else if let Some(w) = ty.strip_prefix("Word") {
        if w.is_empty() {
            return None;
        }
        (false, w)
    } else if let Some(w) = ty.strip_prefix("Int") {
        (true, w)
    } else {
        return None;
    };

    match width {
        "" => Some((signed, None)),
        "8" | "16" | "32" | "64" | "128" | "256" => width.parse().ok().map(|b| (signed, Some(b))),
        _ => None,
    }
}

fn integer_fits(raw: &str, signed: bool, bits: Option<u32>) -> bool {
    let digits = match raw.strip_prefix('-') {
        Some(_) if !signed => return false,
        Some(d) => d,
        None => raw,
    };
    if !all_digits(digits) {
        return false;
    }

    match bits {
        Some(bits) if bits <= 128 && signed => match raw.parse::<i128>() {
            Ok(_) if bits == 128 => true,
            Ok(v) => {
                let max = (1i128 << (bits - 1)) - 1;
                v >= -max - 1 && v <= max
            }
            Err(_) => false,
        },
        Some(bits) if bits <= 128 => match raw.parse::<u128>() {
            Ok(_) if bits == 128 => true,
            Ok(v) => v < (1u128 << bits),
            Err(_) => false,
        },
        _ => true,
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn find_transaction_keyword(code: &str) -> Option<usize> {
    const KEYWORD: &str = "transaction";
    let bytes = code.as_bytes();
    let mut from = 0;
    while let Some(pos) = code[from..].find(KEYWORD) {
        let at = from + pos;
        let end = at + KEYWORD.len();
        let standalone = at == 0 || !is_ident(bytes[at - 1]);
        let opens = code[end..]
            .trim_start()
            .starts_with(|c: char| c == '(' || c == '{');
        if standalone && opens {
            return Some(end);
        }
        from = end;
    }
    None
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);
    parts
}

/// Drop `//` and `/* */` comments, leaving string literals alone.
fn strip_comments(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut chars = code.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}
