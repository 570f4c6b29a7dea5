use std::borrow::Cow;

/// Converts a declared attribute name into its exposed GraphQL name.
///
/// Leading underscores are dropped (`_private` exposes as `private`), every
/// following `_`-separated part starts with an upper case letter.
pub fn to_camel_case(s: &str) -> Cow<'_, str> {
    let stripped = s.strip_prefix('_').unwrap_or(s);
    if !stripped.contains('_') {
        return Cow::Borrowed(stripped);
    }

    let mut dest = String::with_capacity(stripped.len());
    for (i, part) in stripped.split('_').enumerate() {
        if i == 0 {
            dest.push_str(part);
            continue;
        }
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            dest.extend(first.to_uppercase());
            dest.push_str(chars.as_str());
        }
    }
    Cow::Owned(dest)
}

/// Picks the exposed name of a field mounted under `attname`.
pub(crate) fn exposed_name(attname: &str, auto_camelcase: bool) -> Cow<'_, str> {
    if auto_camelcase {
        to_camel_case(attname)
    } else {
        Cow::Borrowed(attname)
    }
}
