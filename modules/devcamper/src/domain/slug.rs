/// Lowercase URL slug: alphanumerics kept, whitespace, `-` and `_` runs
/// collapse to one `-`, everything else is dropped.
///
/// `"Devworks Bootcamp"` → `"devworks-bootcamp"`, `"UI/UX Camp"` → `"uiux-camp"`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_dash = true;
        }
    }
    out
}
