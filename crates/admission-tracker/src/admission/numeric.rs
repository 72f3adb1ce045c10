//! Lenient number readers for spreadsheet exports.
//!
//! Both readers take the longest numeric prefix of the cell and ignore whatever
//! follows, so `"285 (olymp.)"` reads as 285. A cell without a numeric prefix
//! yields `None` and the caller picks the fallback.

pub(crate) fn leading_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, digits) = split_sign(trimmed);

    let mut result: i64 = 0;
    let mut seen_digit = false;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(10) else {
            break;
        };
        seen_digit = true;
        result = result.saturating_mul(10).saturating_add(i64::from(digit));
    }

    if !seen_digit {
        return None;
    }

    Some(if negative { -result } else { result })
}

pub(crate) fn leading_decimal(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let (negative, rest) = split_sign(trimmed);

    let mut literal = String::with_capacity(rest.len() + 1);
    let mut seen_digit = false;
    let mut seen_separator = false;
    let mut chars = rest.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            '0'..='9' => {
                seen_digit = true;
                literal.push(ch);
            }
            '.' | ',' if !seen_separator => {
                seen_separator = true;
                literal.push('.');
            }
            _ => break,
        }
        chars.next();
    }

    if !seen_digit {
        return None;
    }

    if matches!(chars.peek(), Some('e') | Some('E')) {
        let mut exponent = String::from("e");
        let mut lookahead = chars.clone();
        lookahead.next();
        if let Some(&sign) = lookahead.peek() {
            if sign == '+' || sign == '-' {
                exponent.push(sign);
                lookahead.next();
            }
        }
        let exponent_digits: String = lookahead.take_while(char::is_ascii_digit).collect();
        if !exponent_digits.is_empty() {
            literal.push_str(&exponent);
            literal.push_str(&exponent_digits);
        }
    }

    let parsed = literal
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())?;

    Some(if negative { -parsed } else { parsed })
}

fn split_sign(value: &str) -> (bool, &str) {
    if let Some(rest) = value.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = value.strip_prefix('+') {
        (false, rest)
    } else {
        (false, value)
    }
}
