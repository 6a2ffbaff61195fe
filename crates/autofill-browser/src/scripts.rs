//! Page-context functions invoked on elements via `Runtime.callFunctionOn`.
//!
//! Each function runs with `this` bound to the target element. Values are
//! embedded as JSON literals so quotes and newlines survive intact.

pub(crate) const IS_VISIBLE: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
}"#;

pub(crate) const CLEAR: &str = r#"function() {
    if ('value' in this) {
        this.value = '';
        this.dispatchEvent(new Event('input', { bubbles: true }));
    } else {
        this.textContent = '';
    }
}"#;

pub(crate) const INPUT_VALUE: &str = r#"function() {
    return 'value' in this ? String(this.value) : this.innerText;
}"#;

/// Select the option of a `<select>` whose label equals `label`.
pub(crate) fn select_option_by_label(label: &str) -> String {
    format!(
        r#"function() {{
    const wanted = {label};
    const option = Array.from(this.options || [])
        .find(o => o.label === wanted || o.text === wanted);
    if (!option) {{
        return false;
    }}
    this.value = option.value;
    this.dispatchEvent(new Event('input', {{ bubbles: true }}));
    this.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return true;
}}"#,
        label = js_string(label)
    )
}

/// Assign `value` and dispatch bubbling `input` and `change` events.
pub(crate) fn set_value(value: &str) -> String {
    format!(
        r#"function() {{
    this.value = {value};
    this.dispatchEvent(new Event('input', {{ bubbles: true }}));
    this.dispatchEvent(new Event('change', {{ bubbles: true }}));
}}"#,
        value = js_string(value)
    )
}

fn js_string(value: &str) -> String {
    // Serializing a str cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}
