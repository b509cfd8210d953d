/// Lua script for the atomic decrement-if-exists counter primitive.
///
/// KEYS\[1\] = the counter key
///
/// Returns the new value after decrementing, or `false` (nil to the client)
/// when the key does not exist. A bare `DECR` would create the key at 0 and
/// hand out -1, which would make an expired share indistinguishable from an
/// exhausted one and resurrect the key; the existence check and the
/// decrement must happen in one atomic step.
pub const DECREMENT_IF_EXISTS: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return false
end
return redis.call('DECR', KEYS[1])
";
