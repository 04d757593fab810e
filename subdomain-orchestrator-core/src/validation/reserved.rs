//! Names that can never be claimed.
//!
//! Infrastructure and protocol labels, account/auth paths, well-known brands
//! (phishing), typosquats of the service's own brand, and a few values that
//! read as errors or nulls in URLs.

/// Sorted, lowercase. Membership is checked with a binary search.
static RESERVED_NAMES: &[&str] = &[
    "404", "500", "about", "abuse", "account", "accounts", "acme", "activate", "admin",
    "administrator", "airbnb", "alpha", "amazon", "analytics", "api", "api1", "api2", "api3",
    "app", "apple", "assets", "auth", "authenticate", "authentication", "aws", "azure",
    "backup", "backups", "bank", "banking", "barclays", "beta", "billing", "binance",
    "bitbucket", "bitcoin", "blog", "bofa", "booking", "buy", "caddy", "callback", "callbacks",
    "canary", "cart", "cas", "cashapp", "cdn", "cert", "certificate", "certificates", "certs",
    "chase", "checkout", "citi", "cluster", "coinbase", "community", "confirm", "console",
    "contact", "container", "containers", "control", "controlpanel", "copyright", "cpanel",
    "crypto", "dashboard", "demo", "dev", "develop", "development", "discord", "dmca", "dns",
    "doc", "docker", "docs", "documentation", "download", "downloads", "dropbox", "envoy",
    "error", "ethereum", "expedia", "facebook", "false", "faq", "feedback", "files", "forum",
    "forums", "ftp", "gateway", "git", "github", "gitlab", "gmail", "google", "graphql",
    "haproxy", "help", "hsbc", "icloud", "images", "imap", "img", "info", "instagram",
    "invoice", "invoices", "k8s", "kb", "kraken", "kubernetes", "lb", "ldap", "legal",
    "letsencrypt", "linkedin", "loadbalancer", "local", "localhost", "logging", "login",
    "logout", "logs", "lyft", "madew1thprisme", "madewithpris", "madewithprisme",
    "madewithprlsme", "madewlthprisme", "mail", "manage", "manager", "media", "meta",
    "metrics", "microsoft", "monitor", "monitoring", "mx", "mx1", "mx2", "netflix", "news",
    "nginx", "node", "nodes", "none", "ns", "ns1", "ns2", "ns3", "null", "oauth", "oauth2",
    "office", "oidc", "order", "orders", "outlook", "panel", "password", "payment", "payments",
    "paypal", "pinterest", "policy", "pop", "pop3", "portal", "pr1sm", "pr1sme", "preview",
    "primsme", "prisem", "prism", "prism3", "prisme", "prismee", "privacy", "prlsm", "prlsme",
    "profile", "profiles", "proxy", "prsime", "reddit", "register", "registry", "repo",
    "report", "repos", "repository", "reset", "rest", "root", "saml", "sandbox", "secure",
    "security", "server", "servers", "sftp", "shop", "shopify", "signal", "signin", "signout",
    "signup", "slack", "smtp", "snapchat", "socket", "spam", "spotify", "square", "ssh", "ssl",
    "sso", "stage", "staging", "static", "status", "store", "stripe", "sudo", "superuser",
    "support", "survey", "teams", "telegram", "terms", "test", "testing", "tiktok", "tls",
    "tos", "track", "tracking", "traefik", "true", "twitch", "twitter", "uber", "undefined",
    "upload", "uploads", "user", "users", "v1", "v2", "v3", "venmo", "verify", "void",
    "wallet", "webhook", "webhooks", "webmail", "websocket", "wellsfargo", "whatsapp", "wiki",
    "windows", "wordpress", "ws", "wss", "www", "x", "youtube", "zoom",
];

/// Case-insensitive deny-list membership.
pub fn is_reserved(name: &str) -> bool {
    let lowered = name.trim().to_ascii_lowercase();
    RESERVED_NAMES.binary_search(&lowered.as_str()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_is_sorted_and_unique() {
        assert!(RESERVED_NAMES.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn list_is_lowercase() {
        assert!(RESERVED_NAMES
            .iter()
            .all(|n| n.chars().all(|c| !c.is_ascii_uppercase())));
    }

    #[test]
    fn infrastructure_and_brands_are_reserved() {
        for name in ["www", "api", "admin", "traefik", "letsencrypt", "paypal", "google"] {
            assert!(is_reserved(name), "{name} should be reserved");
        }
    }

    #[test]
    fn typosquats_are_reserved() {
        for name in ["pr1sme", "prlsm", "madew1thprisme"] {
            assert!(is_reserved(name), "{name} should be reserved");
        }
    }

    #[test]
    fn membership_ignores_case() {
        assert!(is_reserved("WWW"));
        assert!(is_reserved("GitHub"));
    }

    #[test]
    fn ordinary_names_are_free() {
        assert!(!is_reserved("myapp"));
        assert!(!is_reserved("cool-project-42"));
    }
}
