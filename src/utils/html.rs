/// Sanitize user-supplied forum content before storage.
///
/// Whitelist-based: safe formatting tags survive, script/iframe tags and
/// event-handler attributes are stripped. Fail-safe against stored XSS when
/// topics and replies are rendered by the frontend.
pub fn sanitize_content(input: &str) -> String {
    ammonia::clean(input)
}
