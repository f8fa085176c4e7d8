//! Double to ASCII conversion
//!
//! Number/string conversions with JavaScript semantics, used by the
//! expression evaluator when it stringifies results and coerces operands.

/// Convert a number to its JavaScript `String(n)` form
///
/// Integral values print without a fractional part, magnitudes outside
/// `[1e-7, 1e21)` switch to exponent notation.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        // Covers -0 as well
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let sign = if n < 0.0 { "-" } else { "" };

    // `{:e}` yields the shortest round-tripping digits, e.g. "1.2345e3"
    let formatted = format!("{:e}", n.abs());
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let k = digits.len() as i32;
    // Position of the decimal point relative to the first digit
    let point = exponent + 1;

    let body = if k <= point && point <= 21 {
        let mut s = digits;
        s.extend(std::iter::repeat_n('0', (point - k) as usize));
        s
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        let mut s = String::from("0.");
        s.extend(std::iter::repeat_n('0', (-point) as usize));
        s.push_str(&digits);
        s
    } else {
        let e = point - 1;
        let e_sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, e_sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, e_sign, e.abs())
        }
    };

    format!("{}{}", sign, body)
}

/// Convert a string to a number with JavaScript `Number(s)` semantics
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return f64::NAN;
        }
        return u64::from_str_radix(hex, 16)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // Rust's parser also accepts "inf" and "nan", which JavaScript does not
    let well_formed = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !well_formed {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// `parseFloat`: the longest numeric prefix, ignoring leading whitespace
pub fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        return if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let digits_start = end;
    while bytes.get(end).is_some_and(|b| b.is_ascii_digit()) {
        end += 1;
    }
    let mut has_digits = end > digits_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(|b| b.is_ascii_digit()) {
            frac_end += 1;
        }
        if frac_end > frac_start || has_digits {
            has_digits |= frac_end > frac_start;
            end = frac_end;
        }
    }

    if !has_digits {
        return f64::NAN;
    }

    // Exponent only counts when at least one digit follows it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while bytes.get(exp_end).is_some_and(|b| b.is_ascii_digit()) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// `parseInt` with an implied radix of 10 (or 16 for a `0x` prefix)
pub fn parse_int_prefix(s: &str) -> f64 {
    let mut s = s.trim_start();
    let mut negative = false;

    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    let mut radix = 10;
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        radix = 16;
        s = rest;
    }

    let mut value = 0.0f64;
    let mut any = false;
    for c in s.chars() {
        let Some(d) = c.to_digit(radix) else {
            break;
        };
        value = value * radix as f64 + d as f64;
        any = true;
    }

    if !any {
        return f64::NAN;
    }
    if negative { -value } else { value }
}
