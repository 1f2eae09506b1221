/// Misspellings of the LaserSTEP prefix seen in hand-written rule files.
const PREFIX_MISSPELLINGS: &[(&str, &str)] = &[("lasterstep", "laserstep"), ("laststep", "laserstep")];

/// Normalize the key part of a rule line: lowercase, single-spaced, with
/// known prefix misspellings canonicalized.
pub fn normalize_rule_key(raw: &str) -> String {
    let mut key = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    for (wrong, right) in PREFIX_MISSPELLINGS {
        key = key.replace(wrong, right);
    }
    key
}

/// Title-case a label: the first letter after any non-letter is uppercased,
/// every other letter lowercased ("advanced nano" -> "Advanced Nano").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Remove whitespace around hyphens ("1 - 2" -> "1-2").
pub fn collapse_hyphen_spacing(s: &str) -> String {
    let parts: Vec<&str> = s.split('-').collect();
    let last = parts.len().saturating_sub(1);
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let mut p = *part;
            if i > 0 {
                p = p.trim_start();
            }
            if i < last {
                p = p.trim_end();
            }
            p
        })
        .collect::<Vec<_>>()
        .join("-")
}
