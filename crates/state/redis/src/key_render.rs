use vanish_state::MetaKey;

/// Render a [`MetaKey`] into a Redis key string with the given prefix.
///
/// The format is `prefix:kind:id`.
pub fn render_key(prefix: &str, key: &MetaKey) -> String {
    format!("{}:{}", prefix, key.canonical())
}
