//! Page-side JavaScript snippets

/// Bound to an element: true when it has a box and is not hidden by style.
pub const IS_VISIBLE: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden'
        && style.display !== 'none';
}"#;

/// Bound to an input: drop its current value before typing.
pub const CLEAR_VALUE: &str = r#"function() {
    if ('value' in this) {
        this.value = '';
        this.dispatchEvent(new Event('input', { bubbles: true }));
    }
}"#;

/// Document readiness plus the time since the last resource finished loading.
pub const PAGE_ACTIVITY: &str = r#"(() => {
    let lastEnd = 0;
    for (const entry of performance.getEntriesByType('resource')) {
        lastEnd = Math.max(lastEnd, entry.responseEnd);
    }
    return {
        ready_state: document.readyState,
        quiet_for_ms: performance.now() - lastEnd,
    };
})()"#;
