//! Bot detection and user-agent classification
//!
//! Pure substring matching over the raw user-agent string. Every input,
//! including the empty string, yields a definite classification; nothing
//! here can fail.

/// Substring signatures of known crawlers and automated clients,
/// matched case-insensitively.
const BOT_MARKERS: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "slurp",
    "headless",
    "phantomjs",
    "facebookexternalhit",
    "bingpreview",
    "whatsapp",
    "lighthouse",
    "pingdom",
];

/// Returns true when the user-agent matches a known crawler signature.
/// An empty user-agent is not treated as a bot.
pub fn is_bot(user_agent: &str) -> bool {
    if user_agent.is_empty() {
        return false;
    }
    let ua = user_agent.to_lowercase();
    BOT_MARKERS.iter().any(|marker| ua.contains(marker))
}

/// Classify the device class. Tablet tokens are checked before mobile ones
/// so an iPad or Android tablet never falls through to "mobile".
pub fn classify_device(user_agent: &str) -> &'static str {
    let ua = user_agent.to_lowercase();
    if ua.contains("ipad")
        || ua.contains("tablet")
        || (ua.contains("android") && !ua.contains("mobile"))
    {
        "tablet"
    } else if ua.contains("mobi") || ua.contains("iphone") || ua.contains("android") {
        "mobile"
    } else {
        "desktop"
    }
}

/// Classify the browser. Most distinctive token first: Edge, Opera and
/// Samsung Internet UAs all contain "Chrome", and Chrome UAs contain
/// "Safari", so order matters.
pub fn classify_browser(user_agent: &str) -> &'static str {
    let ua = user_agent.to_lowercase();
    if ua.contains("edg") {
        "Edge"
    } else if ua.contains("opr") || ua.contains("opera") {
        "Opera"
    } else if ua.contains("samsungbrowser") {
        "Samsung Internet"
    } else if ua.contains("firefox") || ua.contains("fxios") {
        "Firefox"
    } else if ua.contains("chrome") || ua.contains("crios") {
        "Chrome"
    } else if ua.contains("safari") {
        "Safari"
    } else {
        "Other"
    }
}

/// Classify the operating system. iOS is checked before macOS (iPad UAs
/// contain "Mac OS") and Android before Linux (Android UAs contain "Linux").
pub fn classify_os(user_agent: &str) -> &'static str {
    let ua = user_agent.to_lowercase();
    if ua.contains("windows") {
        "Windows"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        "iOS"
    } else if ua.contains("mac os") || ua.contains("macintosh") {
        "macOS"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        "Other"
    }
}
